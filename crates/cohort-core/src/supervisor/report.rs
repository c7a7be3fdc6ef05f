use cohort_model::{ExitOutcome, WorkerSpec};

/// Final state of one worker slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerResolution {
    Succeeded {
        attempts: u32,
    },
    /// Every attempt failed; `last_exit` is how the final one ended.
    Exhausted {
        attempts: u32,
        last_exit: ExitOutcome,
    },
    /// A retry could not be launched, or the exit status of an attempt could not be read.
    Lost {
        attempts: u32,
        reason: String,
    },
}

impl WorkerResolution {
    pub fn is_success(&self) -> bool {
        matches!(self, WorkerResolution::Succeeded { .. })
    }

    pub fn attempts(&self) -> u32 {
        match self {
            WorkerResolution::Succeeded { attempts }
            | WorkerResolution::Exhausted { attempts, .. }
            | WorkerResolution::Lost { attempts, .. } => *attempts,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerReport {
    /// Position of the worker in spawn order.
    pub id: usize,
    pub spec: WorkerSpec,
    pub resolution: WorkerResolution,
}

/// Resolved workers of a cohort, in resolution order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CohortReport {
    pub workers: Vec<WorkerReport>,
}

impl CohortReport {
    pub fn failed(&self) -> impl Iterator<Item = &WorkerReport> {
        self.workers.iter().filter(|w| !w.resolution.is_success())
    }

    pub fn is_success(&self) -> bool {
        self.failed().next().is_none()
    }

    pub fn get(&self, id: usize) -> Option<&WorkerReport> {
        self.workers.iter().find(|w| w.id == id)
    }
}

/// How a supervision run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CohortOutcome {
    /// Every worker resolved.
    Drained(CohortReport),
    /// The reboot signal was seen while `outstanding` workers were still unresolved.
    Reboot {
        outstanding: usize,
        report: CohortReport,
    },
}

impl CohortOutcome {
    pub fn report(&self) -> &CohortReport {
        match self {
            CohortOutcome::Drained(report) | CohortOutcome::Reboot { report, .. } => report,
        }
    }

    /// Exit status for the supervising process: non-zero only if a worker gave up.
    pub fn exit_code(&self) -> i32 {
        match self {
            CohortOutcome::Drained(report) if !report.is_success() => 1,
            _ => 0,
        }
    }
}
