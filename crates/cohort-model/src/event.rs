use serde::{Deserialize, Serialize};

/// Kind of a supervisor lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    /// Worker process launched (first attempt or retry).
    WorkerSpawned,
    /// Worker exited with code 0.
    WorkerSucceeded,
    /// Worker attempt ended abnormally.
    WorkerFailed,
    /// Worker will be launched again.
    RetryScheduled,
    /// Worker used up its attempts; the cohort continues without it.
    WorkerExhausted,
    /// Re-spawn of a failed worker was refused by the OS.
    WorkerLost,
    /// No outstanding workers left.
    CohortDrained,
    /// Reboot signal observed; supervision abandoned.
    RebootObserved,
}

/// Event emitted by the cohort supervisor to its subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CohortEvent {
    pub kind: EventKind,
    /// Worker label, absent for cohort-wide events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempt: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Outstanding workers right after the event.
    pub outstanding: usize,
}

impl CohortEvent {
    pub fn new(kind: EventKind, outstanding: usize) -> Self {
        Self {
            kind,
            worker: None,
            attempt: None,
            reason: None,
            outstanding,
        }
    }

    pub fn with_worker(mut self, worker: impl Into<String>, attempt: u32) -> Self {
        self.worker = Some(worker.into());
        self.attempt = Some(attempt);
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}
