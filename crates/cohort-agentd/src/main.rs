mod cli;
mod cmd;

use clap::Parser;
use tracing::error;

use cohort_observe::logger_init;
use cohort_signal::SignalStore;

use crate::cli::{Cli, Command};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logger_init(&cli.logger_config())?;

    let store = SignalStore::new(cli.store_config()?);
    let res = match cli.command {
        Command::Supervise(args) => cmd::supervise::run(store, args).await,
        Command::Signal(sub) => cmd::signal::run(store, sub).await,
        Command::RunScript(args) => cmd::run_script::run(store, args).await,
    };

    match res {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("{e:#}");
            Err(e)
        }
    }
}
