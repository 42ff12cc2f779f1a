//! Configuration validation.
//!
//! This module provides validation logic for configuration values,
//! ensuring they are within acceptable ranges.

use super::DatabaseConfig;
use crate::error::ConfigError;

/// Minimum allowed connection timeout in milliseconds.
pub const MIN_CONNECT_TIMEOUT_MS: u64 = 100;

/// Maximum allowed connection timeout in milliseconds (1 minute).
pub const MAX_CONNECT_TIMEOUT_MS: u64 = 60_000;

/// Maximum allowed pool size.
pub const MAX_CONNECTIONS: u32 = 64;

/// Validate configuration values.
///
/// # Errors
///
/// Returns [`ConfigError::MissingRequired`] if `DATABASE_URI` is blank, and
/// [`ConfigError::InvalidValue`] if any value is out of range:
/// - `DATABASE_NAME` must not be empty or contain path separators
/// - `DATABASE_CONNECT_TIMEOUT_MS` must be between 100 and 60000
/// - `DATABASE_MAX_CONNECTIONS` must be between 1 and 64
#[must_use = "validation result should be checked"]
pub fn validate_config(config: &DatabaseConfig) -> Result<(), ConfigError> {
    if config.database_uri.trim().is_empty() {
        return Err(ConfigError::MissingRequired {
            var: "DATABASE_URI".into(),
        });
    }

    let name = config.database_name.trim();
    if name.is_empty() {
        return Err(ConfigError::InvalidValue {
            var: "DATABASE_NAME".into(),
            reason: "must not be empty".into(),
        });
    }
    if name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(ConfigError::InvalidValue {
            var: "DATABASE_NAME".into(),
            reason: "must be a plain name, not a path".into(),
        });
    }

    if config.connect_timeout_ms < MIN_CONNECT_TIMEOUT_MS
        || config.connect_timeout_ms > MAX_CONNECT_TIMEOUT_MS
    {
        return Err(ConfigError::InvalidValue {
            var: "DATABASE_CONNECT_TIMEOUT_MS".into(),
            reason: format!(
                "must be between {MIN_CONNECT_TIMEOUT_MS} and {MAX_CONNECT_TIMEOUT_MS} ms"
            ),
        });
    }

    if config.max_connections == 0 || config.max_connections > MAX_CONNECTIONS {
        return Err(ConfigError::InvalidValue {
            var: "DATABASE_MAX_CONNECTIONS".into(),
            reason: format!("must be between 1 and {MAX_CONNECTIONS}"),
        });
    }

    Ok(())
}
