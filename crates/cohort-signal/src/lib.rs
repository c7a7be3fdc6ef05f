//! Durable, filesystem-backed signals shared between unrelated processes on one host.
//!
//! A signal is a zero-byte marker file named after the signal inside one base directory.
//! Markers survive process exit and host reboot, and are only removed by [`SignalStore::clear_all`].

mod config;
pub use config::{
    DEFAULT_POLL_INTERVAL_MS, DEFAULT_SIGNAL_DIR, ENV_POLL_INTERVAL_MS, ENV_SIGNAL_DIR,
    SignalStoreConfig,
};

mod error;
pub use error::SignalError;

mod store;
pub use store::SignalStore;

mod workflow;
pub use workflow::{WorkflowEnd, WorkflowSignals};

pub use cohort_model::SignalName;
