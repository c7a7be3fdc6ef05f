use tokio::process::{Child, Command};
use tracing::{debug, trace};

use cohort_model::{ExitOutcome, WorkerSpec};

use crate::{
    args::worker_argv,
    error::{ExecError, ExecResult},
    util::{cmd_program, detach, exit_outcome},
};

/// One running attempt of a worker.
#[derive(Debug)]
pub struct Worker {
    program: String,
    child: Child,
}

/// Launch one attempt of `spec` as a detached child process.
///
/// Fails only when the OS refuses to create the process; no exit code exists in that case.
pub fn launch(spec: &WorkerSpec) -> ExecResult<Worker> {
    let mut cmd = build(spec)?;
    detach(&mut cmd);

    let child = cmd.spawn().map_err(|source| ExecError::Spawn {
        program: spec.program.clone(),
        source,
    })?;
    debug!(target: "cohort.exec", program = %spec.program, pid = ?child.id(), "worker launched");

    Ok(Worker {
        program: spec.program.clone(),
        child,
    })
}

/// Run `spec` in the foreground, sharing this process's standard streams, and wait for it.
pub async fn run_attached(spec: &WorkerSpec) -> ExecResult<ExitOutcome> {
    let mut cmd = build(spec)?;
    let child = cmd.spawn().map_err(|source| ExecError::Spawn {
        program: spec.program.clone(),
        source,
    })?;
    Worker {
        program: spec.program.clone(),
        child,
    }
    .wait()
    .await
}

fn build(spec: &WorkerSpec) -> ExecResult<Command> {
    if spec.program.trim().is_empty() {
        return Err(ExecError::MissingProgram);
    }
    let argv = worker_argv(spec)?;

    let mut cmd = cmd_program(&spec.program, &argv);
    if let Some(cwd) = &spec.cwd {
        cmd.current_dir(cwd);
    }
    for (k, v) in &spec.env {
        cmd.env(k, v);
    }
    trace!(target: "cohort.exec", program = %spec.program, args = ?argv, "spawn");
    Ok(cmd)
}

impl Worker {
    /// OS process id, `None` once the process has been reaped.
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Wait for the process to end.
    pub async fn wait(mut self) -> ExecResult<ExitOutcome> {
        let status = self.child.wait().await.map_err(|source| ExecError::Wait {
            program: self.program.clone(),
            source,
        })?;
        let outcome = exit_outcome(status);
        debug!(target: "cohort.exec", program = %self.program, %outcome, "worker exited");
        Ok(outcome)
    }
}
