use std::{path::PathBuf, time::Duration};

use clap::{Args, Parser, Subcommand};

use cohort_model::{DEFAULT_MAX_ATTEMPTS, SignalName};
use cohort_observe::{LoggerConfig, LoggerFormat};
use cohort_signal::{SignalError, SignalStoreConfig};

#[derive(Parser, Debug)]
#[command(name = "cohortd", version)]
#[command(about = "Supervise onboarding workers and share durable signals between them", long_about = None)]
pub struct Cli {
    /// Directory holding one marker file per raised signal [env: COHORT_SIGNAL_DIR, default: /tmp/cohort-signals]
    #[arg(long, global = true)]
    pub signal_dir: Option<PathBuf>,

    /// Poll interval of signal waits, in milliseconds [env: COHORT_SIGNAL_POLL_MS, default: 100]
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    pub poll_ms: Option<u64>,

    /// Log output: text, json or journald
    #[arg(long, global = true, env = "COHORT_LOG_FORMAT", default_value = "text")]
    pub log_format: LoggerFormat,

    /// Log filter, e.g. "info" or "info,cohort.signal=debug"
    #[arg(long, global = true, env = "COHORT_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Store settings from the environment, overridden by explicit flags.
    pub fn store_config(&self) -> Result<SignalStoreConfig, SignalError> {
        let mut cfg = SignalStoreConfig::from_env()?;
        if let Some(dir) = &self.signal_dir {
            cfg = cfg.with_root(dir);
        }
        if let Some(ms) = self.poll_ms {
            cfg = cfg.with_poll_interval(Duration::from_millis(ms));
        }
        Ok(cfg)
    }

    pub fn logger_config(&self) -> LoggerConfig {
        LoggerConfig {
            format: self.log_format,
            level: self.log_level.clone(),
            ..Default::default()
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Launch the workers of a manifest and supervise them until they resolve or a reboot is signaled
    Supervise(SuperviseArgs),
    /// Inspect or change signals
    #[command(subcommand)]
    Signal(SignalCommand),
    /// Run one program as a worker, reporting through signals
    RunScript(RunScriptArgs),
}

#[derive(Args, Debug)]
pub struct SuperviseArgs {
    /// JSON manifest listing the workers
    #[arg(long)]
    pub manifest: PathBuf,

    /// Remove every signal before launching (fresh top-level invocation only)
    #[arg(long)]
    pub clear: bool,

    /// Attempts per worker, the first one included
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_attempts: u32,
}

#[derive(Subcommand, Debug)]
pub enum SignalCommand {
    /// Raise a signal (no-op if already raised)
    Raise { name: SignalName },
    /// Exit 0 if the signal is raised, 1 otherwise
    Test { name: SignalName },
    /// Block until the signal is raised; exit 1 if the timeout passes first
    Wait {
        name: SignalName,
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
    /// Remove every signal
    Clear,
    /// Print raised signals, one per line
    List,
}

#[derive(Args, Debug)]
pub struct RunScriptArgs {
    /// Signal to wait for before running
    #[arg(long)]
    pub wait_for: Option<SignalName>,

    /// Signal to raise once the program exits successfully
    #[arg(long)]
    pub signal: Option<SignalName>,

    /// Extra argument string; the value after --cl-args is passed whole
    #[arg(long)]
    pub arg_string: Option<String>,

    /// Program and its arguments
    #[arg(required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}
