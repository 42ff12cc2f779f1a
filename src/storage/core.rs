//! Core `SQLite` storage implementation.
//!
//! This module provides the [`Database`] handle: connection setup, the
//! liveness check, schema and index migrations, and the helpers shared by
//! the repositories.

#![allow(clippy::missing_errors_doc)]

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use uuid::Uuid;

use crate::config::{validate_config, DatabaseConfig, DatabaseLocation, MEMORY_URI};
use crate::error::StorageError;
use crate::traits::{RealTimeProvider, TimeProvider};

use super::client::ClientAggregator;
use super::image::ImageStore;
use super::measurement::MeasurementRepository;

const MIGRATIONS: [(&str, &str); 2] = [
    (
        "001",
        include_str!("../../migrations/001_initial_schema.sql"),
    ),
    ("002", include_str!("../../migrations/002_image_store.sql")),
];

/// Shared database handle.
///
/// Construct once at startup with [`Database::init`] and hand clones to
/// whatever needs storage; clones share the connection pool. The pool is
/// safe for concurrent use and this layer adds no locking of its own.
#[derive(Clone)]
pub struct Database {
    pub(crate) pool: SqlitePool,
    pub(crate) clock: Arc<dyn TimeProvider>,
    name: String,
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("name", &self.name)
            .field("closed", &self.pool.is_closed())
            .finish_non_exhaustive()
    }
}

impl Database {
    /// Connect, verify liveness and apply the schema.
    ///
    /// Uses `config` when given, otherwise [`DatabaseConfig::from_env`].
    /// Safe to call repeatedly against the same database: every schema and
    /// index statement is idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::ConnectionFailed`] if the database cannot be
    /// opened or fails the liveness check, and
    /// [`StorageError::InitializationFailed`] for configuration or schema
    /// failures.
    pub async fn init(config: Option<&DatabaseConfig>) -> Result<Self, StorageError> {
        let config = match config {
            Some(config) => config.clone(),
            None => DatabaseConfig::from_env().map_err(|e| {
                tracing::error!(error = %e, "Error loading database configuration");
                StorageError::InitializationFailed {
                    stage: "config".to_string(),
                    message: e.to_string(),
                }
            })?,
        };
        validate_config(&config).map_err(|e| {
            tracing::error!(error = %e, "Invalid database configuration");
            StorageError::InitializationFailed {
                stage: "config".to_string(),
                message: e.to_string(),
            }
        })?;

        let db = Self::connect(&config).await?;
        db.ping().await?;
        db.run_migrations().await?;

        tracing::info!(database = %db.name, "Connected to database");
        Ok(db)
    }

    /// Create a new in-memory database for testing.
    pub async fn new_in_memory() -> Result<Self, StorageError> {
        Self::init(Some(&DatabaseConfig::in_memory())).await
    }

    /// Replace the clock used to stamp timestamps.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn TimeProvider>) -> Self {
        self.clock = clock;
        self
    }

    async fn connect(config: &DatabaseConfig) -> Result<Self, StorageError> {
        let location = config
            .location()
            .map_err(|e| StorageError::InitializationFailed {
                stage: "config".to_string(),
                message: e.to_string(),
            })?;

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_millis(config.connect_timeout_ms));

        let options = match &location {
            DatabaseLocation::Memory => {
                // An in-memory database lives exactly as long as its one connection.
                pool_options = pool_options
                    .max_connections(1)
                    .idle_timeout(None::<Duration>)
                    .max_lifetime(None::<Duration>);
                SqliteConnectOptions::from_str(MEMORY_URI).map_err(|e| {
                    StorageError::ConnectionFailed {
                        message: format!("Invalid memory database options: {e}"),
                    }
                })?
            }
            DatabaseLocation::File(path) => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        tracing::error!(path = %parent.display(), error = %e, "Failed to create database directory");
                        StorageError::ConnectionFailed {
                            message: format!("Failed to create database directory: {e}"),
                        }
                    })?;
                }
                SqliteConnectOptions::new()
                    .filename(path)
                    .create_if_missing(true)
                    .journal_mode(SqliteJournalMode::Wal)
            }
        };

        let pool = pool_options
            .connect_with(options.foreign_keys(true))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to connect to database");
                StorageError::ConnectionFailed {
                    message: format!("Failed to connect to database: {e}"),
                }
            })?;

        Ok(Self {
            pool,
            clock: Arc::new(RealTimeProvider),
            name: config.database_name.clone(),
        })
    }

    /// Liveness check.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::ConnectionFailed`] if the round trip fails.
    pub async fn ping(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Database liveness check failed");
                StorageError::ConnectionFailed {
                    message: format!("Liveness check failed: {e}"),
                }
            })?;
        Ok(())
    }

    /// Run database migrations.
    ///
    /// Migrations are run in order. Each one is idempotent (IF NOT EXISTS).
    pub(crate) async fn run_migrations(&self) -> Result<(), StorageError> {
        for (version, sql) in MIGRATIONS {
            sqlx::query(sql).execute(&self.pool).await.map_err(|e| {
                tracing::error!(version, error = %e, "Error creating schema and indexes");
                StorageError::InitializationFailed {
                    stage: format!("migration {version}"),
                    message: format!("{e}"),
                }
            })?;
        }

        tracing::debug!("Database schema and indexes are up to date");
        Ok(())
    }

    /// Close the connection pool.
    ///
    /// Idempotent; later operations on any clone fail with a query error.
    pub async fn close(&self) {
        if self.pool.is_closed() {
            return;
        }
        self.pool.close().await;
        tracing::info!(database = %self.name, "Closed database connection");
    }

    /// Returns true once [`close`](Self::close) has run.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }

    /// The logical database name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Measurement document operations.
    #[must_use]
    pub fn measurements(&self) -> MeasurementRepository {
        MeasurementRepository::new(self.clone())
    }

    /// Derived client views and statistics.
    #[must_use]
    pub fn clients(&self) -> ClientAggregator {
        ClientAggregator::new(self.clone())
    }

    /// The chunked image store bound to this database.
    #[must_use]
    pub fn file_store(&self) -> ImageStore {
        ImageStore::new(self.clone())
    }

    /// Current time from the injected clock, at storage precision.
    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.clock.now().trunc_subsecs(6)
    }

    /// Generate a new document identifier.
    pub(crate) fn generate_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// Canonical form of a caller-supplied identifier, `None` if malformed.
    pub(crate) fn normalize_id(id: &str) -> Option<String> {
        match Uuid::parse_str(id.trim()) {
            Ok(uuid) => Some(uuid.to_string()),
            Err(_) => {
                tracing::debug!(id, "Malformed identifier");
                None
            }
        }
    }

    /// Format a timestamp for storage.
    ///
    /// Fixed width with microseconds and `Z`, so text order is time order.
    pub(crate) fn format_datetime(dt: &DateTime<Utc>) -> String {
        dt.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    /// Parse a datetime string from the database.
    pub(crate) fn parse_datetime(s: &str) -> Result<DateTime<Utc>, StorageError> {
        s.parse::<DateTime<Utc>>()
            .map_err(|e| StorageError::Internal {
                message: format!("Failed to parse datetime '{s}': {e}"),
            })
    }

    /// Log and wrap a failed query.
    pub(crate) fn query_error(query: &str, err: impl fmt::Display) -> StorageError {
        tracing::error!(query, error = %err, "Query failed");
        StorageError::QueryFailed {
            query: query.to_string(),
            message: err.to_string(),
        }
    }
}
