// src/client/mod.rs

//! Caller side of the protocol.
//!
//! - [`ClientSession`] is one connection carrying one request.
//! - [`Client`] holds a [`ClientConfig`] and opens a fresh session per call.
//!
//! Nothing is retried; connection, timeout and response failures surface as
//! distinct [`ClientError`] variants.

pub mod session;

pub use session::ClientSession;

use std::path::Path;

use crate::config::ClientConfig;
use crate::errors::ClientError;
use crate::types::ExecutionResult;

#[derive(Debug, Clone, Default)]
pub struct Client {
    config: ClientConfig,
}

impl Client {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    pub async fn execute(&self, script: &str) -> Result<ExecutionResult, ClientError> {
        ClientSession::connect(&self.config)
            .await?
            .execute(script)
            .await
    }

    /// Read a script from disk and execute it.
    pub async fn execute_file(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<ExecutionResult, ClientError> {
        let path = path.as_ref();
        let script = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ClientError::ScriptFile {
                path: path.to_path_buf(),
                source,
            })?;
        self.execute(&script).await
    }
}
