//! Configuration management.
//!
//! This module handles:
//! - Environment variable loading (with `.env` support)
//! - Configuration validation
//! - Default value handling
//! - Resolving the connection URI to a concrete database location
//!
//! # Example
//!
//! ```
//! use bodymeasure_store::config::{DatabaseConfig, DatabaseLocation};
//!
//! // Create a config directly (use DatabaseConfig::from_env() in production)
//! let config = DatabaseConfig {
//!     database_uri: "sqlite://./data".to_string(),
//!     database_name: "body_measurements".to_string(),
//!     connect_timeout_ms: 5000,
//!     max_connections: 5,
//!     log_level: "info".to_string(),
//! };
//!
//! let location = config.location().expect("valid uri");
//! assert_eq!(
//!     location,
//!     DatabaseLocation::File("./data/body_measurements.db".into())
//! );
//! ```

mod validation;

pub use validation::{
    validate_config, MAX_CONNECTIONS, MAX_CONNECT_TIMEOUT_MS, MIN_CONNECT_TIMEOUT_MS,
};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Default connection URI: a `data` directory next to the working directory.
pub const DEFAULT_DATABASE_URI: &str = "sqlite://./data";

/// Default database name.
pub const DEFAULT_DATABASE_NAME: &str = "body_measurements";

/// Default time allowed to obtain a connection, in milliseconds.
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5_000;

/// Default connection pool size.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// URI selecting a private in-memory database.
pub const MEMORY_URI: &str = "sqlite::memory:";

const SQLITE_SCHEME: &str = "sqlite://";

/// Database connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Connection string: `sqlite://<directory>` or `sqlite::memory:`.
    pub database_uri: String,
    /// Logical database name; the file is `<directory>/<name>.db`.
    pub database_name: String,
    /// Upper bound on waiting for a connection, in milliseconds.
    pub connect_timeout_ms: u64,
    /// Connection pool size.
    pub max_connections: u32,
    /// Log level (error, warn, info, debug, trace).
    pub log_level: String,
}

/// Where the database lives once the URI is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    /// Private in-memory database, gone when the pool closes.
    Memory,
    /// On-disk database file.
    File(PathBuf),
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_uri: DEFAULT_DATABASE_URI.to_string(),
            database_name: DEFAULT_DATABASE_NAME.to_string(),
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl DatabaseConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional environment variables (with defaults):
    /// - `DATABASE_URI`: Connection string (default: `sqlite://./data`)
    /// - `DATABASE_NAME`: Database name (default: `body_measurements`)
    /// - `DATABASE_CONNECT_TIMEOUT_MS`: Connection timeout (default: `5000`)
    /// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: `5`)
    /// - `LOG_LEVEL`: Logging level (default: `info`)
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a numeric variable does not parse or any
    /// value fails validation (see [`validate_config`]).
    #[must_use = "configuration should be used"]
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors)
        let _ = dotenvy::dotenv();

        let database_uri =
            std::env::var("DATABASE_URI").unwrap_or_else(|_| DEFAULT_DATABASE_URI.into());
        let database_name =
            std::env::var("DATABASE_NAME").unwrap_or_else(|_| DEFAULT_DATABASE_NAME.into());
        let connect_timeout_ms =
            parse_env_u64("DATABASE_CONNECT_TIMEOUT_MS", DEFAULT_CONNECT_TIMEOUT_MS)?;
        let max_connections = parse_env_u32("DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?;
        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.into());

        let config = Self {
            database_uri,
            database_name,
            connect_timeout_ms,
            max_connections,
            log_level,
        };

        validate_config(&config)?;
        Ok(config)
    }

    /// Configuration for a private in-memory database.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            database_uri: MEMORY_URI.to_string(),
            max_connections: 1,
            ..Self::default()
        }
    }

    /// Resolve the URI and database name to a concrete location.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for an unsupported scheme or an
    /// empty directory.
    pub fn location(&self) -> Result<DatabaseLocation, ConfigError> {
        let uri = self.database_uri.trim();
        if uri == MEMORY_URI {
            return Ok(DatabaseLocation::Memory);
        }

        let dir = uri
            .strip_prefix(SQLITE_SCHEME)
            .ok_or_else(|| ConfigError::InvalidValue {
                var: "DATABASE_URI".into(),
                reason: format!("expected `{SQLITE_SCHEME}<directory>` or `{MEMORY_URI}`"),
            })?;
        if dir.is_empty() {
            return Err(ConfigError::InvalidValue {
                var: "DATABASE_URI".into(),
                reason: "directory must not be empty".into(),
            });
        }

        Ok(DatabaseLocation::File(
            PathBuf::from(dir).join(format!("{}.db", self.database_name)),
        ))
    }
}

/// Parse an environment variable as u64, using a default if not set.
fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    std::env::var(name).map_or(Ok(default), |val| {
        val.parse().map_err(|_| ConfigError::InvalidValue {
            var: name.into(),
            reason: "must be a positive integer".into(),
        })
    })
}

/// Parse an environment variable as u32, using a default if not set.
fn parse_env_u32(name: &str, default: u32) -> Result<u32, ConfigError> {
    std::env::var(name).map_or(Ok(default), |val| {
        val.parse().map_err(|_| ConfigError::InvalidValue {
            var: name.into(),
            reason: "must be a positive integer".into(),
        })
    })
}
