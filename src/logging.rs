// src/logging.rs

//! Logging setup for `codexec` using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining what gets logged:
//! 1. `--log-level` CLI flag (if provided), applied to every target
//! 2. `CODEXEC_LOG` environment variable, in `EnvFilter` syntax
//!    (e.g. `debug`, or `info,codexec::exec=debug`)
//! 3. default to `info`
//!
//! Logs are sent to STDERR so that `codexec exec` can print results on
//! stdout.
//!
//! Server events carry their span context: `connection{peer=..}` for each
//! accepted socket and `execution{exec_dir=..}` inside it for the run
//! itself. Closing either span logs its busy/idle time, which is how long a
//! request or a run took.

use anyhow::Result;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::{self, format::FmtSpan};

use crate::cli::LogLevel;

pub const LOG_ENV_VAR: &str = "CODEXEC_LOG";

/// Initialise global logging subscriber.
///
/// Safe to call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    fmt::fmt()
        .with_env_filter(build_filter(cli_level))
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))?;

    Ok(())
}

/// Filter for the given CLI level, falling back to `CODEXEC_LOG` and then
/// `info`. An unparsable `CODEXEC_LOG` counts as unset.
pub fn build_filter(cli_level: Option<LogLevel>) -> EnvFilter {
    match cli_level {
        Some(lvl) => EnvFilter::new(level_from_log_level(lvl).to_string()),
        None => EnvFilter::try_from_env(LOG_ENV_VAR)
            .unwrap_or_else(|_| EnvFilter::new(tracing::Level::INFO.to_string())),
    }
}

fn level_from_log_level(lvl: LogLevel) -> tracing::Level {
    match lvl {
        LogLevel::Error => tracing::Level::ERROR,
        LogLevel::Warn => tracing::Level::WARN,
        LogLevel::Info => tracing::Level::INFO,
        LogLevel::Debug => tracing::Level::DEBUG,
        LogLevel::Trace => tracing::Level::TRACE,
    }
}
