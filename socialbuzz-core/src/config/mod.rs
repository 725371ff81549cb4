//! Configuration management for the SocialBuzz client
//!
//! Layered: built-in defaults, then an optional TOML file, then
//! `SOCIALBUZZ_*` environment overrides.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

mod error;

pub use error::ConfigError;

/// Main client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Remote backend configuration
    pub remote: RemoteConfig,

    /// Session slot configuration
    pub session: SessionConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Remote backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the backend REST surface
    pub base_url: String,

    /// Per-request timeout; expiry surfaces as a network error
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

/// Session slot configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Directory holding the durable session slot
    pub slot_dir: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Enable JSON formatting
    pub json_format: bool,

    /// Include target module
    pub with_target: bool,
}

impl Default for Config {
    fn default() -> Self {
        let slot_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("socialbuzz");

        Config {
            remote: RemoteConfig {
                base_url: "http://127.0.0.1:8080".to_string(),
                request_timeout: Duration::from_secs(10),
            },
            session: SessionConfig { slot_dir },
            logging: LoggingConfig {
                level: "info".to_string(),
                json_format: false,
                with_target: true,
            },
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, then apply environment
    /// overrides
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&data)?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus environment overrides
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Config::default();
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(url) = env::var("SOCIALBUZZ_REMOTE_URL") {
            self.remote.base_url = url;
        }
        if let Ok(dir) = env::var("SOCIALBUZZ_SESSION_DIR") {
            self.session.slot_dir = PathBuf::from(dir);
        }
        if let Ok(level) = env::var("SOCIALBUZZ_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(timeout) = env::var("SOCIALBUZZ_REQUEST_TIMEOUT_SECS") {
            if let Ok(secs) = timeout.parse::<u64>() {
                self.remote.request_timeout = Duration::from_secs(secs);
            }
        }
    }

    /// Check the configuration for values that cannot work
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.remote.base_url.is_empty() {
            return Err(ConfigError::Invalid(
                "remote.base_url must not be empty".to_string(),
            ));
        }
        if self.remote.request_timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "remote.request_timeout must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
