//! Server configuration loading from file and environment variables.
//!
//! The deployment environment (`development`, `testing`, `production`)
//! picks the default database file; everything else has plain defaults
//! that a TOML file or `BARBUDDY_*` variables can override.

use barbuddy_db::DbSettings;
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Deployment environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Testing,
    Production,
}

impl Environment {
    /// Database file used when `database.path` is not set.
    pub fn default_db_path(self) -> &'static str {
        match self {
            Environment::Development => "barbuddy-dev.db",
            Environment::Testing => "barbuddy-test.db",
            Environment::Production => "barbuddy.db",
        }
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "testing" | "test" => Ok(Environment::Testing),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(ConfigError::UnknownEnvironment(other.to_string())),
        }
    }
}

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Deployment environment.
    #[serde(default)]
    pub environment: Environment,

    /// Server network settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Database settings.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Network configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file. Falls back to the environment's
    /// default when unset.
    #[serde(default)]
    pub path: Option<String>,

    /// SQLite busy timeout, in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Maximum number of pooled connections.
    #[serde(default = "default_pool_max_size")]
    pub pool_max_size: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "barbuddy_server=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

impl Config {
    /// The database file this configuration resolves to.
    pub fn database_path(&self) -> &str {
        self.database
            .path
            .as_deref()
            .unwrap_or_else(|| self.environment.default_db_path())
    }

    /// Pool settings for the resolved database.
    pub fn db_settings(&self) -> DbSettings {
        DbSettings {
            path: self.database_path().to_string(),
            busy_timeout: Duration::from_millis(self.database.busy_timeout_ms),
            pool_max_size: self.database.pool_max_size,
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
}

fn default_port() -> u16 {
    5000
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

fn default_pool_max_size() -> u32 {
    8
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout_ms: default_busy_timeout_ms(),
            pool_max_size: default_pool_max_size(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// `BARBUDDY_ENV` named an environment that does not exist.
    #[error("unknown environment '{0}' (expected development, testing or production)")]
    UnknownEnvironment(String),
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `BARBUDDY_ENV` overrides `environment`
/// - `BARBUDDY_HOST` overrides `server.host`
/// - `BARBUDDY_PORT` overrides `server.port`
/// - `BARBUDDY_DB_PATH` overrides `database.path`
/// - `BARBUDDY_LOG_LEVEL` overrides `logging.level`
/// - `BARBUDDY_LOG_JSON` overrides `logging.json` (set to "true" to enable)
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed,
/// or if `BARBUDDY_ENV` is not a known environment.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    apply_overrides(config, |key| std::env::var(key).ok())
}

fn apply_overrides(
    mut config: Config,
    var: impl Fn(&str) -> Option<String>,
) -> Result<Config, ConfigError> {
    if let Some(env) = var("BARBUDDY_ENV") {
        config.environment = env.parse()?;
    }
    if let Some(host) = var("BARBUDDY_HOST") {
        if let Ok(parsed) = host.parse() {
            config.server.host = parsed;
        }
    }
    if let Some(port) = var("BARBUDDY_PORT") {
        if let Ok(parsed) = port.parse() {
            config.server.port = parsed;
        }
    }
    if let Some(db_path) = var("BARBUDDY_DB_PATH") {
        config.database.path = Some(db_path);
    }
    if let Some(level) = var("BARBUDDY_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = var("BARBUDDY_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }

    Ok(config)
}
