use tracing::{info, warn};

use cohort_exec::run_attached;
use cohort_model::{ERROR, WorkerSpec};
use cohort_signal::SignalStore;

use crate::cli::RunScriptArgs;

/// Run one program as a worker.
///
/// Waits for `--wait-for` first, then runs the program with this process's standard streams.
/// On success `--signal` is raised; on failure the shared error signal is raised.
/// The program's exit status is passed on.
pub async fn run(store: SignalStore, args: RunScriptArgs) -> anyhow::Result<i32> {
    let mut command = args.command.into_iter();
    let program = command.next().unwrap_or_default();
    let mut spec = WorkerSpec::new(program).args(command);
    spec.arg_string = args.arg_string;

    if let Some(name) = &args.wait_for {
        info!(signal = %name, "waiting for signal");
        store.wait(name).await?;
    }

    let outcome = run_attached(&spec).await?;
    if outcome.is_success() {
        if let Some(name) = &args.signal {
            store.raise(name)?;
        }
        info!(worker = %spec.label(), "script finished");
    } else {
        warn!(worker = %spec.label(), %outcome, "script failed");
        store.raise(&ERROR)?;
    }
    Ok(outcome.as_exit_code())
}
