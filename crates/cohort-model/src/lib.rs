mod error;
pub use error::ModelError;

mod signal;
pub use signal::{
    CLUSTER_DONE, CLUSTER_RUNNING, ERROR, ONBOARD_DONE, ONBOARD_RUNNING, REBOOT, RESERVED,
    SignalName,
};

mod worker;
pub use worker::{Manifest, WorkerSpec};

mod exit;
pub use exit::ExitOutcome;

mod event;
pub use event::{CohortEvent, EventKind};

/// Default number of attempts (the first one included) made for a worker before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Token in a worker argument string whose value is passed through unsplit.
pub const CL_ARGS_TOKEN: &str = "--cl-args";
