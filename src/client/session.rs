// src/client/session.rs

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::errors::ClientError;
use crate::protocol::decode_response;
use crate::types::ExecutionResult;

const RECV_CHUNK_SIZE: usize = 4096;

/// One connection to the execution service, good for exactly one request.
///
/// [`ClientSession::execute`] consumes the session, so a second request on
/// the same connection cannot be expressed.
pub struct ClientSession {
    stream: TcpStream,
    addr: String,
    timeout: Duration,
}

impl ClientSession {
    /// Connect to `config.host:config.port`, bounded by `config.timeout`.
    pub async fn connect(config: &ClientConfig) -> Result<Self, ClientError> {
        let addr = config.addr();
        info!(server = %addr, "connecting to server");

        let connect = TcpStream::connect((config.host.as_str(), config.port));
        let stream = match tokio::time::timeout(config.timeout, connect).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                return Err(ClientError::Connection {
                    addr,
                    reason: e.to_string(),
                });
            }
            Err(_) => {
                return Err(ClientError::Connection {
                    addr,
                    reason: format!("connect timed out after {:?}", config.timeout),
                });
            }
        };

        debug!(server = %addr, "connection established");
        Ok(Self {
            stream,
            addr,
            timeout: config.timeout,
        })
    }

    /// Send `script`, half-close, read the full response and decode it.
    pub async fn execute(mut self, script: &str) -> Result<ExecutionResult, ClientError> {
        info!(server = %self.addr, bytes = script.len(), "sending script for execution");
        self.send(script.as_bytes()).await?;

        let raw = self.receive_all().await?;
        debug!(server = %self.addr, bytes = raw.len(), "received full response");

        let text = String::from_utf8(raw).map_err(|e| {
            ClientError::MalformedResponse(String::from_utf8_lossy(e.as_bytes()).into_owned())
        })?;

        decode_response(&text)
    }

    /// Write the request and half-close, bounded by the session timeout as a
    /// whole. A server that stops reading cannot stall the caller.
    async fn send(&mut self, request: &[u8]) -> Result<(), ClientError> {
        let stream = &mut self.stream;
        let sent = tokio::time::timeout(self.timeout, async move {
            stream.write_all(request).await?;
            stream.shutdown().await
        })
        .await;

        match sent {
            Ok(result) => Ok(result?),
            Err(_) => {
                warn!(server = %self.addr, timeout = ?self.timeout, "timed out sending script");
                Err(ClientError::Timeout(self.timeout))
            }
        }
    }

    /// Read until the server closes the connection. Each wait for data is
    /// bounded by the session timeout.
    async fn receive_all(&mut self) -> Result<Vec<u8>, ClientError> {
        let mut buf = Vec::new();
        let mut chunk = [0u8; RECV_CHUNK_SIZE];

        loop {
            let n = tokio::time::timeout(self.timeout, self.stream.read(&mut chunk))
                .await
                .map_err(|_| ClientError::Timeout(self.timeout))??;
            if n == 0 {
                return Ok(buf);
            }
            buf.extend_from_slice(&chunk[..n]);
        }
    }
}
