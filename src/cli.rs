// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! Every flag that maps onto a config key overrides the value from
//! `--config` (or the built-in default when no file is given).

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Command-line arguments for `codexec`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "codexec",
    version,
    about = "Execute scripts on a remote host over a plain TCP protocol.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// If omitted, `Codexec.toml` in the current directory is used when it
    /// exists, otherwise built-in defaults.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `CODEXEC_LOG` or a default level will be used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run the execution server.
    Serve(ServeArgs),

    /// Send a script to a server and print the result.
    ///
    /// Exits with the script's return code.
    Exec(ExecArgs),
}

#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    /// Address to bind.
    #[arg(long)]
    pub host: Option<String>,

    #[arg(long)]
    pub port: Option<u16>,

    /// Largest accepted request, in bytes.
    #[arg(long, value_name = "BYTES")]
    pub max_script_size: Option<usize>,

    /// Wall-clock execution limit per script.
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Interpreter program and leading arguments; repeat for each word,
    /// e.g. `--interpreter uv --interpreter run`.
    #[arg(long, value_name = "WORD")]
    pub interpreter: Vec<String>,

    /// File name the script is saved under in the scratch directory.
    #[arg(long, value_name = "NAME")]
    pub script_filename: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct ExecArgs {
    /// Script to send; `-` reads it from stdin.
    #[arg(value_name = "SCRIPT")]
    pub script: PathBuf,

    #[arg(long)]
    pub host: Option<String>,

    #[arg(long)]
    pub port: Option<u16>,

    /// Socket timeout for connecting and for each wait on the response.
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
