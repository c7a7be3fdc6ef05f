pub mod error;
pub use error::CoreError;

mod subscriber;
pub use subscriber::Subscribe;

pub mod supervisor;
pub use supervisor::{
    CohortOutcome, CohortReport, CohortSupervisor, Step, SupervisorConfig, WorkerReport,
    WorkerResolution,
};
