use cohort_model::{CLUSTER_DONE, CLUSTER_RUNNING, ERROR, ONBOARD_DONE, ONBOARD_RUNNING, SignalName};
use tracing::info;

use crate::{SignalError, SignalStore};

/// How a long-running workflow ended, as seen by someone waiting on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowEnd {
    Done,
    /// The shared error signal was raised before the workflow finished.
    Error,
}

/// "running"/"done" signal pair of one long-running workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowSignals {
    pub running: SignalName,
    pub done: SignalName,
}

impl WorkflowSignals {
    pub const fn new(running: SignalName, done: SignalName) -> Self {
        Self { running, done }
    }

    pub const fn onboard() -> Self {
        Self::new(ONBOARD_RUNNING, ONBOARD_DONE)
    }

    pub const fn cluster() -> Self {
        Self::new(CLUSTER_RUNNING, CLUSTER_DONE)
    }

    pub fn begin(&self, store: &SignalStore) -> Result<(), SignalError> {
        store.raise(&self.running)?;
        info!(target: "cohort.signal", signal = %self.running, "workflow running");
        Ok(())
    }

    pub fn finish(&self, store: &SignalStore) -> Result<(), SignalError> {
        store.raise(&self.done)?;
        info!(target: "cohort.signal", signal = %self.done, "workflow done");
        Ok(())
    }

    /// Started in this or an earlier boot but not finished yet.
    pub fn is_in_progress(&self, store: &SignalStore) -> Result<bool, SignalError> {
        Ok(store.is_raised(&self.running)? && !store.is_raised(&self.done)?)
    }

    pub fn is_done(&self, store: &SignalStore) -> Result<bool, SignalError> {
        store.is_raised(&self.done)
    }

    /// Wait for the workflow to finish or for any worker to raise the error signal.
    pub async fn wait_end(&self, store: &SignalStore) -> Result<WorkflowEnd, SignalError> {
        let seen = store.wait_any(&[self.done.clone(), ERROR]).await?;
        Ok(if seen == ERROR {
            WorkflowEnd::Error
        } else {
            WorkflowEnd::Done
        })
    }
}
