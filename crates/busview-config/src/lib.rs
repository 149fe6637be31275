//! Busview Configuration Management
//!
//! Provides configuration loading with support for:
//! - Global config: `~/.busview/config.toml`
//! - Local config: `.busview/config.toml` (in the working directory)
//! - CLI overrides via `ConfigOverrides`
//!
//! Configuration is merged in order: global → local → CLI overrides.

mod error;
mod loader;

pub use error::ConfigError;
pub use loader::ConfigLoader;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Accepted values for `logging.level`
pub const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

/// Root configuration for busview.
///
/// Represents the fully merged configuration from all sources.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct BusviewConfig {
    /// Bus connection settings
    pub connection: ConnectionConfig,

    /// Tree cache behaviour
    pub cache: CacheConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Bus connection configuration.
///
/// # Example TOML
///
/// ```toml
/// [connection]
/// bus = "system"
/// service = "org.freedesktop.login1"
/// timeout_secs = 10
/// busctl_path = "/usr/bin/busctl"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Which bus to connect to
    pub bus: BusType,

    /// Default service to introspect when none is given on the command line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,

    /// Timeout of a single introspection call, in seconds
    pub timeout_secs: u64,

    /// busctl executable used for live introspection
    pub busctl_path: PathBuf,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            bus: BusType::default(),
            service: None,
            timeout_secs: 25,
            busctl_path: PathBuf::from("busctl"),
        }
    }
}

/// Bus selection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BusType {
    /// Per-user session bus (default)
    #[default]
    Session,
    /// System-wide bus
    System,
}

impl std::fmt::Display for BusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Session => write!(f, "session"),
            Self::System => write!(f, "system"),
        }
    }
}

impl std::str::FromStr for BusType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "session" | "user" => Ok(Self::Session),
            "system" => Ok(Self::System),
            _ => Err(ConfigError::invalid_value(
                "connection.bus",
                format!("unknown bus '{}'. Valid values: session, system", s),
            )),
        }
    }
}

/// Tree cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CacheConfig {
    /// Fetch again objects whose last introspection failed
    pub retry_failed: bool,

    /// Default depth limit for tree dumps
    pub max_depth: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            retry_failed: false,
            max_depth: 16,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Colorize log output
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            ansi: true,
        }
    }
}

/// CLI overrides for configuration values.
///
/// Used to apply command-line arguments over file-based config.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Override the bus
    pub bus: Option<BusType>,

    /// Override the service name
    pub service: Option<String>,

    /// Override the call timeout
    pub timeout_secs: Option<u64>,

    /// Override the busctl executable
    pub busctl_path: Option<PathBuf>,

    /// Override failed-object retry
    pub retry_failed: Option<bool>,

    /// Override log level
    pub log_level: Option<String>,
}

impl BusviewConfig {
    /// Apply CLI overrides to this configuration.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(bus) = overrides.bus {
            self.connection.bus = bus;
        }

        if let Some(ref service) = overrides.service {
            self.connection.service = Some(service.clone());
        }

        if let Some(timeout) = overrides.timeout_secs {
            self.connection.timeout_secs = timeout;
        }

        if let Some(ref path) = overrides.busctl_path {
            self.connection.busctl_path = path.clone();
        }

        if let Some(retry) = overrides.retry_failed {
            self.cache.retry_failed = retry;
        }

        if let Some(ref level) = overrides.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.connection.timeout_secs == 0 {
            return Err(ConfigError::invalid_value(
                "connection.timeout_secs",
                "must be at least 1",
            ));
        }
        if self.connection.busctl_path.as_os_str().is_empty() {
            return Err(ConfigError::invalid_value(
                "connection.busctl_path",
                "must not be empty",
            ));
        }
        if let Some(service) = &self.connection.service {
            if service.trim().is_empty() {
                return Err(ConfigError::invalid_value(
                    "connection.service",
                    "must not be empty",
                ));
            }
        }
        let level = self.logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::invalid_value(
                "logging.level",
                format!(
                    "unknown level '{}'. Valid values: {}",
                    self.logging.level,
                    LOG_LEVELS.join(", ")
                ),
            ));
        }
        Ok(())
    }

    /// Introspection call timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.connection.timeout_secs)
    }
}
