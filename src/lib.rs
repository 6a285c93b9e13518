// src/lib.rs

pub mod cli;
pub mod client;
pub mod config;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod protocol;
pub mod server;
pub mod types;

use anyhow::{Context, Result};
use tokio::io::AsyncReadExt;
use tracing::{debug, warn};

use crate::cli::{CliArgs, Command, ExecArgs, ServeArgs};
use crate::client::Client;
use crate::config::{
    ClientConfig, RawClientSection, RawServerSection, ServerConfig, default_config_path,
    load_or_default,
};
use crate::server::Server;
use crate::types::ExecutionResult;

/// High-level entry point used by `main.rs`.
///
/// Loads config, applies CLI overrides, then either runs the server until
/// Ctrl-C or executes one script as a client. Returns the process exit code.
pub async fn run(args: CliArgs) -> Result<i32> {
    let config_path = args.config.clone().or_else(|| {
        let candidate = default_config_path();
        candidate.is_file().then_some(candidate)
    });
    debug!(?config_path, "loading configuration");
    let raw = load_or_default(config_path.as_deref())?;

    match args.command {
        Command::Serve(serve) => {
            run_server(raw.server, &serve).await?;
            Ok(0)
        }
        Command::Exec(exec) => run_client(raw.client, &exec).await,
    }
}

async fn run_server(mut raw: RawServerSection, args: &ServeArgs) -> Result<()> {
    apply_serve_overrides(&mut raw, args);
    let config = ServerConfig::try_from(raw)?;

    let server = Server::bind(config)
        .await
        .context("binding server socket")?;

    server.serve_until(shutdown_signal()).await?;
    Ok(())
}

async fn run_client(mut raw: RawClientSection, args: &ExecArgs) -> Result<i32> {
    apply_exec_overrides(&mut raw, args);
    let client = Client::new(ClientConfig::try_from(raw)?);

    let result = if args.script.as_os_str() == "-" {
        let mut script = String::new();
        tokio::io::stdin()
            .read_to_string(&mut script)
            .await
            .context("reading script from stdin")?;
        client.execute(&script).await?
    } else {
        client.execute_file(&args.script).await?
    };

    print_result(&result);
    Ok(result.return_code())
}

fn apply_serve_overrides(raw: &mut RawServerSection, args: &ServeArgs) {
    if let Some(host) = &args.host {
        raw.host = host.clone();
    }
    if let Some(port) = args.port {
        raw.port = port;
    }
    if let Some(size) = args.max_script_size {
        raw.max_script_size = size;
    }
    if let Some(secs) = args.timeout_secs {
        raw.execution_timeout_secs = secs;
    }
    if !args.interpreter.is_empty() {
        raw.interpreter = args.interpreter.clone();
    }
    if let Some(name) = &args.script_filename {
        raw.script_filename = name.clone();
    }
}

fn apply_exec_overrides(raw: &mut RawClientSection, args: &ExecArgs) {
    if let Some(host) = &args.host {
        raw.host = host.clone();
    }
    if let Some(port) = args.port {
        raw.port = port;
    }
    if let Some(secs) = args.timeout_secs {
        raw.timeout_secs = secs;
    }
}

/// Resolves on Ctrl-C. If the signal handler cannot be installed the server
/// keeps running until killed.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}

fn print_result(result: &ExecutionResult) {
    let banner = "=".repeat(20);
    println!("{banner} Execution Result {banner}");
    println!("Return Code: {}", result.return_code());
    println!("--- STDOUT ---");
    println!("{}", placeholder_if_empty(result.stdout(), "[No stdout]"));
    println!("--- STDERR ---");
    println!("{}", placeholder_if_empty(result.stderr(), "[No stderr]"));
    println!("{}", "=".repeat(58));
}

fn placeholder_if_empty<'a>(text: &'a str, placeholder: &'a str) -> &'a str {
    if text.is_empty() { placeholder } else { text }
}
