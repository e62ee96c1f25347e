//! Server configuration parsed from environment variables.

use std::path::PathBuf;

use crate::error::ErrorCode;

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid PORT: {0}")]
    InvalidPort(String),
    #[error("STATIC_DIR is not a directory: {0}")]
    StaticDirMissing(String),
}

impl ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidPort(_) => "E_INVALID_PORT",
            Self::StaticDirMissing(_) => "E_STATIC_DIR_MISSING",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// Built web client (HTML plus the wasm visualizer bundle), if served.
    pub static_dir: Option<PathBuf>,
}

impl ServerConfig {
    /// Read `PORT` (default 3000) and `STATIC_DIR` (optional).
    ///
    /// # Errors
    ///
    /// Returns an error for a non-numeric port or a `STATIC_DIR` that is not
    /// an existing directory.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match std::env::var("PORT") {
            Ok(raw) => parse_port(&raw)?,
            Err(_) => DEFAULT_PORT,
        };
        let static_dir = match std::env::var("STATIC_DIR") {
            Ok(raw) if !raw.trim().is_empty() => Some(existing_dir(raw.trim())?),
            _ => None,
        };
        Ok(Self { port, static_dir })
    }
}

fn parse_port(raw: &str) -> Result<u16, ConfigError> {
    raw.trim()
        .parse::<u16>()
        .map_err(|_| ConfigError::InvalidPort(raw.to_owned()))
}

fn existing_dir(raw: &str) -> Result<PathBuf, ConfigError> {
    let path = PathBuf::from(raw);
    if path.is_dir() { Ok(path) } else { Err(ConfigError::StaticDirMissing(raw.to_owned())) }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
