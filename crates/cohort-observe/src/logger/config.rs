use std::io::IsTerminal;

use serde::{Deserialize, Serialize};
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::logger::format::LoggerFormat;

/// Stream the text and json formats write to.
///
/// Detached workers run with both streams on `/dev/null`, so stdout stays free for command output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStream {
    #[default]
    Stderr,
    Stdout,
}

impl LogStream {
    pub(crate) fn make_writer(self) -> BoxMakeWriter {
        match self {
            LogStream::Stderr => BoxMakeWriter::new(std::io::stderr),
            LogStream::Stdout => BoxMakeWriter::new(std::io::stdout),
        }
    }

    pub(crate) fn is_terminal(self) -> bool {
        match self {
            LogStream::Stderr => std::io::stderr().is_terminal(),
            LogStream::Stdout => std::io::stdout().is_terminal(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggerConfig {
    pub format: LoggerFormat,
    /// `EnvFilter` directive, e.g. `"info"` or `"info,cohort.signal=debug"`.
    pub level: String,
    pub with_targets: bool,
    /// Allow ANSI colors; they are still only emitted when `stream` is a terminal.
    pub use_color: bool,
    #[serde(default)]
    pub stream: LogStream,
}

impl LoggerConfig {
    pub(crate) fn ansi(&self) -> bool {
        self.use_color && self.format == LoggerFormat::Text && self.stream.is_terminal()
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            format: LoggerFormat::Text,
            level: "info".to_string(),
            with_targets: true,
            use_color: true,
            stream: LogStream::Stderr,
        }
    }
}
