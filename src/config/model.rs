// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";
pub const DEFAULT_CLIENT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 8080;
/// 60 KiB.
pub const DEFAULT_MAX_SCRIPT_SIZE: usize = 1024 * 60;
pub const DEFAULT_EXECUTION_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CLIENT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_SCRIPT_FILENAME: &str = "main.py";

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [server]
/// host = "0.0.0.0"
/// port = 8080
/// max_script_size = 61440
/// execution_timeout_secs = 30
/// interpreter = ["uv", "run"]
/// script_filename = "main.py"
///
/// [client]
/// host = "localhost"
/// port = 8080
/// timeout_secs = 60
/// ```
///
/// All sections and keys are optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub server: RawServerSection,

    #[serde(default)]
    pub client: RawClientSection,
}

/// `[server]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawServerSection {
    #[serde(default = "default_server_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Largest accepted request in bytes.
    #[serde(default = "default_max_script_size")]
    pub max_script_size: usize,

    #[serde(default = "default_execution_timeout_secs")]
    pub execution_timeout_secs: u64,

    /// Interpreter command and leading arguments. The script filename is
    /// appended as the final argument.
    #[serde(default = "default_interpreter")]
    pub interpreter: Vec<String>,

    /// Name of the file the script is written to inside the scratch dir.
    #[serde(default = "default_script_filename")]
    pub script_filename: String,
}

impl Default for RawServerSection {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_port(),
            max_script_size: default_max_script_size(),
            execution_timeout_secs: default_execution_timeout_secs(),
            interpreter: default_interpreter(),
            script_filename: default_script_filename(),
        }
    }
}

/// `[client]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawClientSection {
    #[serde(default = "default_client_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Bound on connecting and on each wait for response data.
    #[serde(default = "default_client_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RawClientSection {
    fn default() -> Self {
        Self {
            host: default_client_host(),
            port: default_port(),
            timeout_secs: default_client_timeout_secs(),
        }
    }
}

fn default_server_host() -> String {
    DEFAULT_SERVER_HOST.to_string()
}

fn default_client_host() -> String {
    DEFAULT_CLIENT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_max_script_size() -> usize {
    DEFAULT_MAX_SCRIPT_SIZE
}

fn default_execution_timeout_secs() -> u64 {
    DEFAULT_EXECUTION_TIMEOUT_SECS
}

fn default_client_timeout_secs() -> u64 {
    DEFAULT_CLIENT_TIMEOUT_SECS
}

fn default_interpreter() -> Vec<String> {
    vec!["uv".to_string(), "run".to_string()]
}

fn default_script_filename() -> String {
    DEFAULT_SCRIPT_FILENAME.to_string()
}

/// Validated configuration. Only constructible through
/// `ConfigFile::try_from(RawConfigFile)` (see `validate.rs`).
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub server: ServerConfig,
    pub client: ClientConfig,
}

/// Immutable server settings, built once at startup and shared read-only by
/// the acceptor and every connection handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_script_size: usize,
    pub execution_timeout: Duration,
    pub interpreter: Vec<String>,
    pub script_filename: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let raw = RawServerSection::default();
        Self {
            host: raw.host,
            port: raw.port,
            max_script_size: raw.max_script_size,
            execution_timeout: Duration::from_secs(raw.execution_timeout_secs),
            interpreter: raw.interpreter,
            script_filename: raw.script_filename,
        }
    }
}

impl ServerConfig {
    /// `host:port` as handed to the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let raw = RawClientSection::default();
        Self {
            host: raw.host,
            port: raw.port,
            timeout: Duration::from_secs(raw.timeout_secs),
        }
    }
}

impl ClientConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
