pub mod builders;
pub mod fake_runner;

use std::net::SocketAddr;
use std::sync::{Arc, Once};

use codexec::config::{ClientConfig, ServerConfig};
use codexec::exec::ScriptRunner;
use codexec::server::Server;
use tokio::task::JoinHandle;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer() // print only for failing tests unless --nocapture
            .with_target(true)
            .init();
    });
}

/// Run a future with a 10-second timeout.
#[allow(dead_code)]
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(std::time::Duration::from_secs(10), f)
        .await
        .expect("Test timed out after 10 seconds")
}

/// Bind `config` on an ephemeral localhost port with the given runner and
/// serve in the background.
///
/// The `host`/`port` of `config` are ignored.
pub async fn spawn_server(
    config: ServerConfig,
    runner: Arc<dyn ScriptRunner>,
) -> (SocketAddr, JoinHandle<()>) {
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        ..config
    };
    let server = Server::bind_with_runner(config, runner)
        .await
        .expect("failed to bind test server");
    let addr = server.local_addr().expect("test server has no local address");

    let handle = tokio::spawn(async move {
        server.serve().await.expect("test server failed");
    });

    (addr, handle)
}

/// Client config pointing at a test server.
pub fn client_config_for(addr: SocketAddr) -> ClientConfig {
    ClientConfig {
        host: addr.ip().to_string(),
        port: addr.port(),
        timeout: std::time::Duration::from_secs(10),
    }
}
