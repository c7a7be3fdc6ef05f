use thiserror::Error;

/// Failures while installing the global `tracing` subscriber.
#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("unknown log format {0:?}, expected text, json or journald")]
    InvalidFormat(String),
    /// Journald output needs Linux and the `journald` feature.
    #[error("journald logging is unavailable in this build")]
    JournaldNotSupported,
    /// A global subscriber is already installed; only the first install wins.
    #[error("a global log subscriber is already installed")]
    AlreadyInitialized,
    #[error("log subscriber setup failed: {0}")]
    InitializationFailed(String),
    #[error("invalid log filter {0:?}")]
    InvalidLogLevel(String),
}
