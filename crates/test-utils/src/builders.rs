#![allow(dead_code)]

use std::time::Duration;

use codexec::config::ServerConfig;

/// Builder for `ServerConfig` to simplify test setup.
///
/// Defaults to `sh` as the interpreter with `main.sh` as the script file, so
/// real-process tests do not depend on any particular language runtime.
pub struct ServerConfigBuilder {
    config: ServerConfig,
}

impl ServerConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                interpreter: vec!["sh".to_string()],
                script_filename: "main.sh".to_string(),
                execution_timeout: Duration::from_secs(10),
                ..ServerConfig::default()
            },
        }
    }

    pub fn max_script_size(mut self, bytes: usize) -> Self {
        self.config.max_script_size = bytes;
        self
    }

    pub fn execution_timeout(mut self, timeout: Duration) -> Self {
        self.config.execution_timeout = timeout;
        self
    }

    pub fn interpreter(mut self, words: &[&str]) -> Self {
        self.config.interpreter = words.iter().map(|w| w.to_string()).collect();
        self
    }

    pub fn script_filename(mut self, name: &str) -> Self {
        self.config.script_filename = name.to_string();
        self
    }

    pub fn build(self) -> ServerConfig {
        self.config
    }
}

impl Default for ServerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
