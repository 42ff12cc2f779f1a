//! Lazily initialised database handle.
//!
//! [`DatabaseManager`] is constructed once at startup and passed to whatever
//! needs storage. The first call to [`get_database`](DatabaseManager::get_database)
//! or [`get_file_store`](DatabaseManager::get_file_store) connects; later
//! calls share that connection.

#![allow(clippy::missing_errors_doc)]

use tokio::sync::OnceCell;

use crate::config::DatabaseConfig;
use crate::error::StorageError;

use super::core::Database;
use super::image::ImageStore;

/// Owner of the single shared [`Database`].
#[derive(Debug, Default)]
pub struct DatabaseManager {
    config: Option<DatabaseConfig>,
    db: OnceCell<Database>,
}

impl DatabaseManager {
    /// Manager that will connect with `config`, or with
    /// [`DatabaseConfig::from_env`] when `None`.
    #[must_use]
    pub fn new(config: Option<DatabaseConfig>) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Connect now instead of on first use.
    pub async fn init(&self) -> Result<&Database, StorageError> {
        self.get_database().await
    }

    /// The shared database, connecting on first call.
    ///
    /// Concurrent first callers wait on a single initialisation. A failed
    /// initialisation is not cached; the next call tries again.
    pub async fn get_database(&self) -> Result<&Database, StorageError> {
        self.db
            .get_or_try_init(|| Database::init(self.config.as_ref()))
            .await
    }

    /// The image store bound to the shared database.
    pub async fn get_file_store(&self) -> Result<ImageStore, StorageError> {
        Ok(self.get_database().await?.file_store())
    }

    /// Returns true once a connection has been established.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.db.initialized()
    }

    /// Close the shared connection if one was opened.
    pub async fn close(&self) {
        if let Some(db) = self.db.get() {
            db.close().await;
        }
    }
}
