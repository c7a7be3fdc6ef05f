use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SignalError {
    #[error("failed to create signal directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to raise signal {name} at {path}: {source}")]
    Raise {
        name: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to check signal marker {path}: {source}")]
    Check {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to clear signal directory {path}: {source}")]
    Clear {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid signal store config: {0}")]
    Config(String),
}
