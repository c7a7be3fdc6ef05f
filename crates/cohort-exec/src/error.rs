use std::io;

use thiserror::Error;

pub type ExecResult<T> = Result<T, ExecError>;

#[derive(Error, Debug)]
pub enum ExecError {
    #[error("missing program")]
    MissingProgram,
    #[error("spawn {program} failed: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("wait for {program} failed: {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("unterminated quote in argument string: {0}")]
    UnterminatedQuote(String),
}
