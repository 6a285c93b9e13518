// src/server/handler.rs

//! One accepted connection, end to end.
//!
//! ```text
//! Reading ──> SizeExceeded | DecodeFailed ─────────────────┐
//!    │                                                    v
//!    └──> Executing ──> Completed | TimedOut | Internal ──> Responding ──> Closed
//! ```
//!
//! An empty request (EOF before any byte) and a read error both end the
//! connection without a response.

use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{Instrument, debug, error, info, warn};

use crate::config::ServerConfig;
use crate::errors::{ProtocolError, RunError};
use crate::exec::ScriptRunner;
use crate::protocol::Response;
use crate::types::ExecutionResult;

/// Size of each socket read while accumulating a request.
pub const READ_CHUNK_SIZE: usize = 4096;

/// Result of the Reading phase.
#[derive(Debug, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Peer half-closed without sending anything.
    Empty,
    /// More than the allowed number of bytes arrived; reading stopped.
    TooLarge,
    Complete(Vec<u8>),
}

/// Accumulate a request until EOF, giving up as soon as more than
/// `max_size` bytes have been seen.
pub async fn read_request<R>(reader: &mut R, max_size: usize) -> std::io::Result<ReadOutcome>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    let mut chunk = [0u8; READ_CHUNK_SIZE];

    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if buf.len() > max_size {
            return Ok(ReadOutcome::TooLarge);
        }
    }

    if buf.is_empty() {
        Ok(ReadOutcome::Empty)
    } else {
        Ok(ReadOutcome::Complete(buf))
    }
}

/// Shared, read-only handler state. One instance serves every connection.
pub struct ConnectionHandler {
    config: Arc<ServerConfig>,
    runner: Arc<dyn ScriptRunner>,
}

impl ConnectionHandler {
    pub fn new(config: Arc<ServerConfig>, runner: Arc<dyn ScriptRunner>) -> Self {
        Self { config, runner }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Drive one connection to completion.
    ///
    /// Returns the response that was produced, or `None` when the connection
    /// ended without one. The stream is dropped (closed) before returning.
    pub async fn handle<S>(&self, mut stream: S) -> Option<Response>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let response = self.process(&mut stream).await?;

        let encoded = response.encode();
        if let Err(e) = write_response(&mut stream, encoded.as_bytes()).await {
            warn!(error = %e, "failed to send response; dropping connection");
        } else {
            debug!(bytes = encoded.len(), "response sent");
        }

        Some(response)
    }

    async fn process<S>(&self, stream: &mut S) -> Option<Response>
    where
        S: AsyncRead + Unpin,
    {
        let max_size = self.config.max_script_size;
        let bytes = match read_request(stream, max_size).await {
            Ok(ReadOutcome::Complete(bytes)) => bytes,
            Ok(ReadOutcome::Empty) => {
                warn!("no data received from client");
                return None;
            }
            Ok(ReadOutcome::TooLarge) => {
                error!(max_size, "exceeded max script size limit");
                return Some(Response::Failed(ProtocolError::SizeLimitExceeded));
            }
            Err(e) => {
                warn!(error = %e, "failed to read request");
                return None;
            }
        };

        let script = match String::from_utf8(bytes) {
            Ok(script) => script,
            Err(e) => {
                error!(error = %e, "failed to decode received data as UTF-8");
                return Some(Response::Failed(ProtocolError::DecodeError));
            }
        };

        info!(bytes = script.len(), "received script");
        Some(self.execute(script).await.into())
    }

    /// Run the script in its own task so that a panicking runner is reported
    /// as an internal error instead of tearing down the connection silently.
    async fn execute(&self, script: String) -> Result<ExecutionResult, ProtocolError> {
        let runner = Arc::clone(&self.runner);
        let timeout = self.config.execution_timeout;

        let task = async move { runner.run(script, timeout).await };
        let joined = tokio::spawn(task.in_current_span()).await;

        match joined {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(err)) => {
                match &err {
                    RunError::TimedOut(limit) => {
                        warn!(timeout_secs = limit.as_secs_f64(), "script timed out");
                    }
                    RunError::Internal(e) => {
                        error!(error = ?e, "unexpected error while executing script");
                    }
                }
                Err(err.into())
            }
            Err(e) => {
                error!(error = %e, "script runner task failed");
                Err(ProtocolError::InternalError)
            }
        }
    }
}

async fn write_response<W>(writer: &mut W, bytes: &[u8]) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(bytes).await?;
    writer.flush().await?;
    writer.shutdown().await
}
