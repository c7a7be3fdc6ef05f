use thiserror::Error;

use cohort_exec::ExecError;
use cohort_signal::SignalError;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("worker spawn failed: {0}")]
    Spawn(#[from] ExecError),
    #[error("signal store error: {0}")]
    Signal(#[from] SignalError),
}
