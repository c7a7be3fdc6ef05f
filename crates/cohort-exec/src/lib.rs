//! Launching supervised worker processes.
//!
//! Workers run detached from the supervisor: standard streams go to `/dev/null`
//! and, on unix, each worker leads its own session so it does not share the supervisor's terminal.

mod error;
pub use error::{ExecError, ExecResult};

mod args;
pub use args::{split_arg_string, worker_argv};

mod util;
pub use util::{cmd_program, exit_outcome};

pub mod proc;
pub use proc::{Worker, launch, run_attached};
