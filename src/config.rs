//! Configuration module for blogo.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{BlogoError, Result};

/// Environment variable holding the config file path.
pub const CONFIG_PATH_ENV: &str = "BLOGO_CONFIG";

/// Config file used when `BLOGO_CONFIG` is not set.
pub const DEFAULT_CONFIG_FILE: &str = "blogo.toml";

/// Database configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "blogo.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Optional log file; logs always go to stderr as well.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Feed aggregation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AggregatorConfig {
    /// User-Agent header sent with every feed request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Total request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Number of posts shown by `browse` when no limit is given.
    #[serde(default = "default_browse_limit")]
    pub browse_limit: i64,
}

fn default_user_agent() -> String {
    concat!("blogo/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_browse_limit() -> i64 {
    2
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout(),
            browse_limit: default_browse_limit(),
        }
    }
}

/// Login session, persisted with the rest of the config.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Name of the logged-in user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_user: Option<String>,
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Feed aggregation configuration.
    #[serde(default)]
    pub aggregator: AggregatorConfig,
    /// Login session.
    #[serde(default)]
    pub session: SessionConfig,
}

impl Config {
    /// Path of the config file: `$BLOGO_CONFIG` or `blogo.toml`.
    pub fn default_path() -> PathBuf {
        std::env::var(CONFIG_PATH_ENV)
            .ok()
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(BlogoError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration, falling back to defaults when the file does not exist.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        match std::fs::read_to_string(path.as_ref()) {
            Ok(content) => Self::parse(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(BlogoError::Io(e)),
        }
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| BlogoError::Config(format!("config parse error: {e}")))
    }

    /// Write the configuration back to a TOML file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| BlogoError::Config(format!("config serialize error: {e}")))?;
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }

    /// Persist the `[session]` section to `path`.
    ///
    /// Every other section is taken from the file as it is on disk, so
    /// runtime overrides (see [`Config::apply_env_overrides`]) never leak
    /// into it.
    pub fn save_session<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut on_disk = Self::load_or_default(path.as_ref())?;
        on_disk.session = self.session.clone();
        on_disk.save(path)
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `BLOGO_DATABASE_PATH`: Override the database file path
    pub fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("BLOGO_DATABASE_PATH") {
            if !path.is_empty() {
                self.database.path = path;
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.database.path.trim().is_empty() {
            return Err(BlogoError::Config("database.path must not be empty".into()));
        }
        if self.aggregator.request_timeout_secs == 0 {
            return Err(BlogoError::Config(
                "aggregator.request_timeout_secs must be positive".into(),
            ));
        }
        if self.aggregator.browse_limit <= 0 {
            return Err(BlogoError::Config(
                "aggregator.browse_limit must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Name of the logged-in user, if any.
    pub fn current_user(&self) -> Option<&str> {
        self.session.current_user.as_deref()
    }

    /// Set the logged-in user.
    pub fn set_current_user(&mut self, name: impl Into<String>) {
        self.session.current_user = Some(name.into());
    }
}
