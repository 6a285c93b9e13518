// src/server/mod.rs

//! TCP acceptor.
//!
//! The accept loop only dispatches: every accepted socket gets its own Tokio
//! task running [`ConnectionHandler::handle`]. Handlers share nothing but the
//! read-only config and runner, so a failing or panicking connection never
//! affects the others.

pub mod handler;

pub use handler::{ConnectionHandler, ReadOutcome, read_request};

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};
use tracing::{Instrument, debug, info, info_span, warn};

use crate::config::ServerConfig;
use crate::errors::Result;
use crate::exec::{InterpreterRunner, ScriptRunner};

/// Pause after a failed `accept` so a persistent error (e.g. fd exhaustion)
/// does not spin the loop.
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

pub struct Server {
    listener: TcpListener,
    handler: Arc<ConnectionHandler>,
}

impl Server {
    /// Bind using the production interpreter runner.
    pub async fn bind(config: ServerConfig) -> Result<Self> {
        let runner = Arc::new(InterpreterRunner::from_config(&config));
        Self::bind_with_runner(config, runner).await
    }

    pub async fn bind_with_runner(
        config: ServerConfig,
        runner: Arc<dyn ScriptRunner>,
    ) -> Result<Self> {
        let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
        let handler = Arc::new(ConnectionHandler::new(Arc::new(config), runner));
        Ok(Self { listener, handler })
    }

    /// Actual bound address (useful when binding port 0).
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections forever.
    pub async fn serve(self) -> Result<()> {
        self.serve_until(std::future::pending()).await
    }

    /// Accept connections until `shutdown` resolves.
    ///
    /// Connections already dispatched keep running to completion on their own
    /// tasks; only the accept loop stops.
    pub async fn serve_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let cfg = self.handler.config();
        info!(
            addr = %self.local_addr()?,
            max_script_size = cfg.max_script_size,
            timeout_secs = cfg.execution_timeout.as_secs_f64(),
            interpreter = ?cfg.interpreter,
            "server listening"
        );

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("shutdown requested; no longer accepting connections");
                    return Ok(());
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => self.dispatch(stream, peer),
                    Err(e) => {
                        warn!(error = %e, "failed to accept connection");
                        tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                    }
                },
            }
        }
    }

    fn dispatch(&self, stream: TcpStream, peer: SocketAddr) {
        let handler = Arc::clone(&self.handler);
        let span = info_span!("connection", peer = %peer);

        tokio::spawn(
            async move {
                info!("accepted connection");
                let responded = handler.handle(stream).await.is_some();
                debug!(responded, "connection closed");
            }
            .instrument(span),
        );
    }
}
