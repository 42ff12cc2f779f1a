//! Error types for the measurement store.
//!
//! This module defines a hierarchical error system:
//! - [`AppError`]: Top-level errors returned to callers
//! - [`StorageError`]: Database and blob-store errors
//! - [`ConfigError`]: Configuration errors
//!
//! All errors implement `Send + Sync` for async compatibility.

use thiserror::Error;

/// Top-level application error.
///
/// Wraps all subsystem errors so callers embedding the store (an HTTP
/// backend, a batch job) can handle them uniformly.
#[derive(Debug, Error, Clone)]
pub enum AppError {
    /// Storage error.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Storage errors.
///
/// `ConnectionFailed` and `InitializationFailed` come only from setting up a
/// [`Database`](crate::storage::Database). Everything else is an operation
/// failure; "not found" is never an error and is reported through `Option`
/// or `bool` results instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The database could not be reached or failed its liveness check.
    #[error("Database connection failed: {message}")]
    ConnectionFailed {
        /// Description of the connection failure.
        message: String,
    },

    /// Schema or index setup failed after connecting.
    #[error("Database initialization failed: {stage} - {message}")]
    InitializationFailed {
        /// The setup stage that failed (e.g. a migration version).
        stage: String,
        /// Description of the failure.
        message: String,
    },

    /// A database query failed.
    #[error("Query failed: {query} - {message}")]
    QueryFailed {
        /// The query that failed (may be truncated).
        query: String,
        /// Description of the failure.
        message: String,
    },

    /// A stored document could not be decoded or a new one could not be encoded.
    #[error("Invalid document {id}: {message}")]
    InvalidDocument {
        /// Identifier of the offending document.
        id: String,
        /// What was wrong with it.
        message: String,
    },

    /// Internal storage error.
    #[error("Internal storage error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl StorageError {
    /// Returns true for errors raised while bringing the database up.
    ///
    /// These are fatal: a process should not keep serving without a database.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. } | Self::InitializationFailed { .. }
        )
    }
}

/// Configuration errors.
///
/// These errors represent failures in configuration loading and validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Required configuration is missing.
    #[error("Missing required: {var}")]
    MissingRequired {
        /// The missing variable name.
        var: String,
    },

    /// Configuration value is invalid.
    #[error("Invalid value for {var}: {reason}")]
    InvalidValue {
        /// The variable name.
        var: String,
        /// Why the value is invalid.
        reason: String,
    },
}
