use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("invalid signal name {0:?}: expected a non-empty ASCII token of [A-Za-z0-9_.-] not starting with '.'")]
    InvalidSignalName(String),
    #[error("invalid worker spec: {0}")]
    InvalidWorker(String),
    #[error("invalid manifest: {0}")]
    InvalidManifest(String),
}
