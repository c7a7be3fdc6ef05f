use std::time::Duration;

use tracing::info;

use cohort_signal::SignalStore;

use crate::cli::SignalCommand;

pub async fn run(store: SignalStore, cmd: SignalCommand) -> anyhow::Result<i32> {
    match cmd {
        SignalCommand::Raise { name } => {
            store.raise(&name)?;
            Ok(0)
        }
        SignalCommand::Test { name } => Ok(if store.is_raised(&name)? { 0 } else { 1 }),
        SignalCommand::Wait {
            name,
            timeout_ms: None,
        } => {
            store.wait(&name).await?;
            Ok(0)
        }
        SignalCommand::Wait {
            name,
            timeout_ms: Some(ms),
        } => {
            let seen = store.wait_timeout(&name, Duration::from_millis(ms)).await?;
            Ok(if seen { 0 } else { 1 })
        }
        SignalCommand::Clear => {
            let removed = store.clear_all()?;
            info!(removed, root = %store.root().display(), "signals cleared");
            Ok(0)
        }
        SignalCommand::List => {
            for name in store.list()? {
                println!("{name}");
            }
            Ok(0)
        }
    }
}
