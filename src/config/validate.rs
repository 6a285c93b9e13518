// src/config/validate.rs

use std::path::{Component, Path};
use std::time::Duration;

use crate::config::model::{
    ClientConfig, ConfigFile, RawClientSection, RawConfigFile, RawServerSection, ServerConfig,
};
use crate::errors::{CodexecError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = CodexecError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        Ok(ConfigFile {
            server: ServerConfig::try_from(raw.server)?,
            client: ClientConfig::try_from(raw.client)?,
        })
    }
}

impl TryFrom<RawServerSection> for ServerConfig {
    type Error = CodexecError;

    fn try_from(raw: RawServerSection) -> std::result::Result<Self, Self::Error> {
        validate_server_section(&raw)?;
        Ok(ServerConfig {
            host: raw.host,
            port: raw.port,
            max_script_size: raw.max_script_size,
            execution_timeout: Duration::from_secs(raw.execution_timeout_secs),
            interpreter: raw.interpreter,
            script_filename: raw.script_filename,
        })
    }
}

impl TryFrom<RawClientSection> for ClientConfig {
    type Error = CodexecError;

    fn try_from(raw: RawClientSection) -> std::result::Result<Self, Self::Error> {
        validate_client_section(&raw)?;
        Ok(ClientConfig {
            host: raw.host,
            port: raw.port,
            timeout: Duration::from_secs(raw.timeout_secs),
        })
    }
}

fn validate_server_section(raw: &RawServerSection) -> Result<()> {
    ensure_host("server", &raw.host)?;

    if raw.max_script_size == 0 {
        return Err(CodexecError::ConfigError(
            "[server].max_script_size must be >= 1 (got 0)".to_string(),
        ));
    }

    if raw.execution_timeout_secs == 0 {
        return Err(CodexecError::ConfigError(
            "[server].execution_timeout_secs must be >= 1 (got 0)".to_string(),
        ));
    }

    match raw.interpreter.first() {
        Some(program) if !program.trim().is_empty() => {}
        _ => {
            return Err(CodexecError::ConfigError(
                "[server].interpreter must name a program to run".to_string(),
            ));
        }
    }

    validate_script_filename(&raw.script_filename)
}

fn validate_client_section(raw: &RawClientSection) -> Result<()> {
    ensure_host("client", &raw.host)?;

    if raw.timeout_secs == 0 {
        return Err(CodexecError::ConfigError(
            "[client].timeout_secs must be >= 1 (got 0)".to_string(),
        ));
    }

    Ok(())
}

fn ensure_host(section: &str, host: &str) -> Result<()> {
    if host.trim().is_empty() {
        return Err(CodexecError::ConfigError(format!(
            "[{section}].host must not be empty"
        )));
    }
    Ok(())
}

/// The script file must land directly inside the scratch directory.
fn validate_script_filename(name: &str) -> Result<()> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(CodexecError::ConfigError(format!(
            "[server].script_filename must be a plain file name (got {name:?})"
        ))),
    }
}
