pub mod run_script;
pub mod signal;
pub mod supervise;
