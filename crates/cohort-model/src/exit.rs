use std::fmt;

use serde::{Deserialize, Serialize};

/// How one worker attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExitOutcome {
    /// Process exited on its own with this code.
    Code(i32),
    /// Process was killed; the signal number is `None` when the platform cannot tell.
    Signal(Option<i32>),
}

impl ExitOutcome {
    /// Only a clean `0` exit counts as success; everything else is retryable.
    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, ExitOutcome::Code(0))
    }

    /// Status a wrapper process should exit with to pass this outcome on (`128 + n` for signal `n`).
    pub fn as_exit_code(&self) -> i32 {
        match self {
            ExitOutcome::Code(code) => *code,
            ExitOutcome::Signal(Some(sig)) => 128 + sig,
            ExitOutcome::Signal(None) => 1,
        }
    }
}

impl fmt::Display for ExitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitOutcome::Code(code) => write!(f, "exit code {code}"),
            ExitOutcome::Signal(Some(sig)) => write!(f, "killed by signal {sig}"),
            ExitOutcome::Signal(None) => f.write_str("terminated without exit code"),
        }
    }
}
