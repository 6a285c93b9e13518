// src/protocol/mod.rs

//! Request/response wire format.
//!
//! A request is the raw UTF-8 script, terminated by the client half-closing
//! its write side. A response is plain text terminated by the server closing
//! the connection, and is exactly one of:
//!
//! ```text
//! --- Execution Result ---
//! Return Code: 0
//!
//! --- STDOUT ---
//! ok
//!
//! --- STDERR ---
//! ```
//!
//! or a single `ERROR: ...` / `SERVER ERROR: ...` line.
//!
//! There is no length prefix and no escaping: output that itself contains
//! the section markers cannot be told apart from the framing. The decoder
//! refuses such responses instead of guessing (see [`codec::decode_response`]).

pub mod codec;

pub use codec::{decode_response, encode_error, encode_result};

use crate::errors::ProtocolError;
use crate::types::ExecutionResult;

pub const RESULT_HEADER: &str = "--- Execution Result ---";
pub const RETURN_CODE_PREFIX: &str = "Return Code:";
pub const STDOUT_MARKER: &str = "--- STDOUT ---";
pub const STDERR_MARKER: &str = "--- STDERR ---";
pub const ERROR_PREFIX: &str = "ERROR:";
pub const SERVER_ERROR_PREFIX: &str = "SERVER ERROR:";

/// The single terminal outcome written back for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Completed(ExecutionResult),
    Failed(ProtocolError),
}

impl Response {
    pub fn encode(&self) -> String {
        match self {
            Response::Completed(result) => encode_result(result),
            Response::Failed(err) => encode_error(err),
        }
    }
}

impl From<std::result::Result<ExecutionResult, ProtocolError>> for Response {
    fn from(outcome: std::result::Result<ExecutionResult, ProtocolError>) -> Self {
        match outcome {
            Ok(result) => Response::Completed(result),
            Err(err) => Response::Failed(err),
        }
    }
}
