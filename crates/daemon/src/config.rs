//! Configuration management for the PassView daemon.
//!
//! This module provides TOML-based configuration file loading and saving.
//! The default configuration path is `~/.config/passview/config.toml`.

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default address the HTTP API listens on.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";

/// Configuration validation errors.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("bind_addr must be a socket address like 127.0.0.1:5000, got {0}")]
    InvalidBindAddr(String),

    #[error("timeout_secs must be between 1 and 600 seconds, got {0}")]
    InvalidTimeout(u64),

    #[error("max_depth must be between 1 and 1024, got {0}")]
    InvalidMaxDepth(usize),

    #[error("gpg program must not be empty")]
    EmptyGpgProgram,

    #[error("log_level must be one of: trace, debug, info, warn, error; got {0}")]
    InvalidLogLevel(String),
}

/// Valid log level values for tracing configuration.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Main configuration structure for the PassView daemon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    /// General daemon configuration.
    pub daemon: DaemonConfig,

    /// Password store location and traversal limits.
    pub store: StoreConfig,

    /// HTTP server configuration.
    pub server: ServerConfig,

    /// Decryption tool settings.
    pub gpg: GpgConfig,
}

/// General daemon configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DaemonConfig {
    /// Logging level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Directory for a daily rolling log file. Logs go to stderr only when unset.
    pub log_dir: Option<PathBuf>,
}

/// Password store configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    /// Root directory of the password store.
    pub root: PathBuf,

    /// Maximum directory nesting the tree builder descends into.
    pub max_depth: usize,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to listen on.
    pub bind_addr: String,
}

/// Decryption tool configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GpgConfig {
    /// Decryption executable, looked up on PATH when not absolute.
    pub program: String,

    /// Agent control executable used to reset cached credentials.
    pub agent_program: String,

    /// Kill the credential agent before each decryption so a cached
    /// passphrase can never satisfy a request.
    pub reset_agent: bool,

    /// Alternative GnuPG home directory.
    pub homedir: Option<PathBuf>,

    /// Seconds to wait for the decryption process before killing it.
    pub timeout_secs: u64,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_dir: None,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: default_store_root(),
            max_depth: 64,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

impl Default for GpgConfig {
    fn default() -> Self {
        Self {
            program: "gpg".to_string(),
            agent_program: "gpgconf".to_string(),
            reset_agent: true,
            homedir: None,
            timeout_secs: 30,
        }
    }
}

impl GpgConfig {
    /// Subprocess timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Returns the default configuration file path.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("passview")
        .join("config.toml")
}

/// Returns the conventional password store location.
fn default_store_root() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".local")
        .join("share")
        .join("password-store")
}

impl Config {
    /// Apply environment variable overrides to the configuration.
    ///
    /// Environment variables take precedence over config file values.
    /// Supported variables:
    /// - PASSWORD_STORE_DIR: Override the store root
    /// - PASSVIEW_BIND_ADDR: Override the listen address
    /// - PASSVIEW_LOG_LEVEL: Override log level (trace, debug, info, warn, error)
    pub fn apply_env_overrides(&mut self) {
        if let Ok(root) = std::env::var("PASSWORD_STORE_DIR") {
            if !root.is_empty() {
                tracing::info!("Overriding store root from environment: {}", root);
                self.store.root = PathBuf::from(root);
            }
        }

        if let Ok(addr) = std::env::var("PASSVIEW_BIND_ADDR") {
            if !addr.is_empty() {
                tracing::info!("Overriding bind_addr from environment: {}", addr);
                self.server.bind_addr = addr;
            }
        }

        if let Ok(level) = std::env::var("PASSVIEW_LOG_LEVEL") {
            if !level.is_empty() {
                tracing::info!("Overriding log_level from environment: {}", level);
                self.daemon.log_level = level;
            }
        }
    }

    /// Validate the configuration values.
    ///
    /// Returns an error if any configuration value is outside the valid range.
    /// The store root is checked separately when it is opened.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bind_addr()?;

        if self.gpg.timeout_secs < 1 || self.gpg.timeout_secs > 600 {
            return Err(ConfigError::InvalidTimeout(self.gpg.timeout_secs));
        }

        if self.store.max_depth < 1 || self.store.max_depth > 1024 {
            return Err(ConfigError::InvalidMaxDepth(self.store.max_depth));
        }

        if self.gpg.program.trim().is_empty() {
            return Err(ConfigError::EmptyGpgProgram);
        }

        let level = self.daemon.log_level.to_lowercase();
        if !VALID_LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(self.daemon.log_level.clone()));
        }

        Ok(())
    }

    /// Parse the configured listen address.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server
            .bind_addr
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddr(self.server.bind_addr.clone()))
    }

    /// Load configuration from a file.
    ///
    /// If the file does not exist, returns the default configuration.
    /// If the file exists but is invalid TOML, returns an error with
    /// a helpful message.
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

    /// Save configuration to a file.
    ///
    /// Creates parent directories if they don't exist.
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

/// Format a TOML deserialization error for user-friendly display.
fn format_toml_error(error: &toml::de::Error) -> String {
    let mut msg = error.message().to_string();

    if let Some(span) = error.span() {
        msg.push_str(&format!(" (at position {}..{})", span.start, span.end));
    }

    msg
}
