//! Error types for mangareel

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for mangareel operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for mangareel operations
///
/// Every error is fatal to a pipeline run; there is no local recovery.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid configuration, caught before any processing begins
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Image folder/archive or narration script is missing or unusable
    #[error("Source error at {}: {message}", .path.display())]
    Source { path: PathBuf, message: String },

    /// An individual image cannot be decoded or re-encoded
    #[error("Cannot decode {}: {message}", .path.display())]
    Decode { path: PathBuf, message: String },

    /// An external process exited unsuccessfully
    #[error("Command failed ({}): {command}\n{output}", status_label(.status))]
    ExternalTool {
        /// The full command line that was run
        command: String,
        /// Exit code, `None` when terminated by a signal
        status: Option<i32>,
        /// Captured stdout and stderr of the process
        output: String,
    },

    /// A required external tool could not be located or started
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    pub(crate) fn source_at(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Error::Source {
            path: path.into(),
            message: msg.into(),
        }
    }

    pub(crate) fn decode(path: impl Into<PathBuf>, msg: impl ToString) -> Self {
        Error::Decode {
            path: path.into(),
            message: msg.to_string(),
        }
    }
}

fn status_label(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

/// Process exit status reported for each error class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ErrorCode {
    /// Unexpected failure outside the taxonomy
    Other = 1,
    /// Invalid configuration
    Config = 2,
    /// Missing or empty source
    Source = 3,
    /// Image decode/encode failure
    Decode = 4,
    /// External tool failed or is missing
    ExternalTool = 5,
    /// I/O error
    IoError = 6,
}

impl From<&Error> for ErrorCode {
    fn from(err: &Error) -> Self {
        match err {
            Error::Config(_) => ErrorCode::Config,
            Error::Source { .. } => ErrorCode::Source,
            Error::Decode { .. } => ErrorCode::Decode,
            Error::ExternalTool { .. } => ErrorCode::ExternalTool,
            Error::ToolNotFound(_) => ErrorCode::ExternalTool,
            Error::Io(_) => ErrorCode::IoError,
        }
    }
}
