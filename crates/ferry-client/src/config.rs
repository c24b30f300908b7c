//! Configuration for the Ferry client core.
//!
//! Settings live in a TOML file, by default `~/.config/ferry/config.toml`.
//! A missing file means defaults; environment variables override whatever
//! the file says.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("log_level must be one of: trace, debug, info, warn, error; got {0}")]
    InvalidLogLevel(String),

    #[error("request_timeout_secs must be greater than 0 when set")]
    ZeroRequestTimeout,

    #[error("socket_path must be absolute, got {0}")]
    RelativeSocketPath(String),
}

/// Valid log level values for tracing configuration.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Client core configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    /// Unix socket the native backend listens on.
    pub socket_path: PathBuf,

    /// Directory downloads land in. When unset the desktop directory is
    /// resolved at the start of every connection attempt.
    pub download_dir: Option<PathBuf>,

    /// Upper bound for a single bridge request. Unset means wait for the
    /// backend however long it takes.
    pub request_timeout_secs: Option<u64>,

    /// Logging level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            socket_path: protocol::default_socket_path(),
            download_dir: None,
            request_timeout_secs: None,
            log_level: "info".to_string(),
        }
    }
}

/// Returns the default configuration file path.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ferry")
        .join("config.toml")
}

impl ClientConfig {
    /// Per-request bridge timeout, if one is configured.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Apply environment variable overrides.
    ///
    /// Supported variables:
    /// - FERRY_SOCKET_PATH: backend socket
    /// - FERRY_DOWNLOAD_DIR: download directory
    /// - FERRY_LOG_LEVEL: log level
    ///
    /// Empty values are ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Some(path) = non_empty_env("FERRY_SOCKET_PATH") {
            tracing::info!("Overriding socket_path from environment: {}", path);
            self.socket_path = PathBuf::from(path);
        }

        if let Some(dir) = non_empty_env("FERRY_DOWNLOAD_DIR") {
            tracing::info!("Overriding download_dir from environment: {}", dir);
            self.download_dir = Some(PathBuf::from(dir));
        }

        if let Some(level) = non_empty_env("FERRY_LOG_LEVEL") {
            tracing::info!("Overriding log_level from environment: {}", level);
            self.log_level = level;
        }
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let level = self.log_level.to_lowercase();
        if !VALID_LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(self.log_level.clone()));
        }

        if self.request_timeout_secs == Some(0) {
            return Err(ConfigError::ZeroRequestTimeout);
        }

        if !self.socket_path.is_absolute() {
            return Err(ConfigError::RelativeSocketPath(
                self.socket_path.display().to_string(),
            ));
        }

        Ok(())
    }

    /// Load configuration from a file, or defaults if it does not exist.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::debug!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Load configuration from the default path.
    pub fn load_default() -> Result<Self> {
        Self::load(default_config_path())
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str)
            .map_err(|e| anyhow::anyhow!("Invalid TOML configuration: {}", format_toml_error(&e)))
    }

    /// Save configuration to a file, creating parent directories.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = self.to_toml()?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::debug!("Configuration saved to {:?}", path);
        Ok(())
    }

    /// Serialize configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn format_toml_error(error: &toml::de::Error) -> String {
    let mut msg = error.message().to_string();

    if let Some(span) = error.span() {
        msg.push_str(&format!(" (at position {}..{})", span.start, span.end));
    }

    msg
}
