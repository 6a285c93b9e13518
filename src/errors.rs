// src/errors.rs

//! Crate-wide error types.
//!
//! - [`CodexecError`] covers startup concerns (config, IO, TOML).
//! - [`ProtocolError`] is the terminal failure of one server-side request and
//!   is what gets written back on the wire.
//! - [`RunError`] is what a [`crate::exec::ScriptRunner`] can fail with.
//! - [`ClientError`] is everything a caller of [`crate::client`] can see.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodexecError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

/// Failure outcome of a single request, mutually exclusive with a result.
///
/// The `Display` output is the message that follows the `ERROR:` /
/// `SERVER ERROR:` prefix on the wire.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Script size exceeds limit.")]
    SizeLimitExceeded,

    #[error("Invalid UTF-8 data received.")]
    DecodeError,

    #[error("Execution timed out")]
    TimeoutExpired,

    #[error("An internal error occurred.")]
    InternalError,
}

impl ProtocolError {
    /// Whether this failure is the server's fault rather than the caller's.
    pub fn is_server_fault(&self) -> bool {
        matches!(self, ProtocolError::InternalError)
    }
}

#[derive(Error, Debug)]
pub enum RunError {
    #[error("script did not finish within {0:?}")]
    TimedOut(Duration),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<RunError> for ProtocolError {
    fn from(err: RunError) -> Self {
        match err {
            RunError::TimedOut(_) => ProtocolError::TimeoutExpired,
            RunError::Internal(_) => ProtocolError::InternalError,
        }
    }
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("failed to connect to {addr}: {reason}")]
    Connection { addr: String, reason: String },

    #[error("timed out after {0:?} while talking to the server")]
    Timeout(Duration),

    #[error("server returned an error: {0}")]
    Server(String),

    #[error("failed to parse server response: {0}")]
    MalformedResponse(String),

    #[error("failed to read script file {path:?}: {source}")]
    ScriptFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("network error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CodexecError>;
