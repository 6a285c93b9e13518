// src/protocol/codec.rs

use crate::errors::{ClientError, ProtocolError};
use crate::types::ExecutionResult;

use super::{
    ERROR_PREFIX, RESULT_HEADER, RETURN_CODE_PREFIX, SERVER_ERROR_PREFIX, STDERR_MARKER,
    STDOUT_MARKER,
};

/// Encode a completed execution.
///
/// `stdout` is always followed by a newline before the stderr marker; the
/// decoder strips exactly that newline again.
pub fn encode_result(result: &ExecutionResult) -> String {
    format!(
        "{RESULT_HEADER}\n{RETURN_CODE_PREFIX} {}\n\n{STDOUT_MARKER}\n{}\n{STDERR_MARKER}\n{}",
        result.return_code(),
        result.stdout(),
        result.stderr(),
    )
}

/// Encode a failed request as a single error line.
pub fn encode_error(err: &ProtocolError) -> String {
    let prefix = if err.is_server_fault() {
        SERVER_ERROR_PREFIX
    } else {
        ERROR_PREFIX
    };
    format!("{prefix} {err}")
}

/// Decode a full response as received by the client.
///
/// - Error lines become [`ClientError::Server`] with the text verbatim.
/// - Anything that does not match the result layout becomes
///   [`ClientError::MalformedResponse`] carrying the raw text.
///
/// The stderr separator must occur exactly once; a response whose output
/// contains it is rejected rather than split at an arbitrary occurrence.
pub fn decode_response(text: &str) -> Result<ExecutionResult, ClientError> {
    if text.starts_with(ERROR_PREFIX) || text.starts_with(SERVER_ERROR_PREFIX) {
        return Err(ClientError::Server(text.to_string()));
    }

    parse_result(text).ok_or_else(|| ClientError::MalformedResponse(text.to_string()))
}

fn parse_result(text: &str) -> Option<ExecutionResult> {
    let (header, rest) = text.split_once("\n\n")?;

    let mut header_lines = header.lines();
    if header_lines.next()? != RESULT_HEADER {
        return None;
    }
    let return_code = header_lines
        .next()?
        .strip_prefix(RETURN_CODE_PREFIX)?
        .trim()
        .parse::<i32>()
        .ok()?;
    if header_lines.next().is_some() {
        return None;
    }

    let body = rest.strip_prefix(STDOUT_MARKER)?.strip_prefix('\n')?;

    let separator = format!("\n{STDERR_MARKER}\n");
    let mut sections = body.split(separator.as_str());
    let stdout = sections.next()?;
    let stderr = sections.next()?;
    if sections.next().is_some() {
        return None;
    }

    Some(ExecutionResult::new(return_code, stdout, stderr))
}
