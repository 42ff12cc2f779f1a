//! Trait definitions for mockable dependencies.
//!
//! This module defines traits for:
//! - [`MeasurementStore`]: Measurement document operations
//! - [`ClientDirectory`]: Derived client views and statistics
//! - [`ImageStorage`]: Image blob operations
//! - [`TimeProvider`]: Time abstraction for testing
//!
//! Callers (an HTTP layer, a report generator) should depend on these traits
//! rather than on the concrete repositories.
//!
//! # Mocking
//!
//! All traits are annotated with `#[cfg_attr(test, mockall::automock)]`
//! which generates mock implementations automatically for testing.
//!
//! # Example
//!
//! ```
//! use bodymeasure_store::traits::{TimeProvider, RealTimeProvider};
//!
//! let time_provider = RealTimeProvider;
//! let now = time_provider.now();
//! println!("Current time: {now}");
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StorageError;
use crate::storage::{
    ClientInfo, ClientStatistics, ClientView, ImageRecord, MeasurementDocument, MeasurementUpdate,
    Measurements, Metadata,
};

/// Measurement document operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MeasurementStore: Send + Sync {
    /// Insert a document and return its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the document cannot be encoded or stored.
    async fn create(
        &self,
        client_info: &ClientInfo,
        measurements: &Measurements,
        metadata: Option<Metadata>,
    ) -> Result<String, StorageError>;

    /// Get a document by ID; `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the database operation fails.
    async fn get_by_id(&self, id: &str) -> Result<Option<MeasurementDocument>, StorageError>;

    /// A client's documents, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the database operation fails.
    async fn get_by_client_email(
        &self,
        email: &str,
        limit: u32,
    ) -> Result<Vec<MeasurementDocument>, StorageError>;

    /// Shallow-merge `updates`; `false` if the document doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the database operation fails.
    async fn update(&self, id: &str, updates: &MeasurementUpdate) -> Result<bool, StorageError>;

    /// Delete a document; `false` if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the database operation fails.
    async fn delete(&self, id: &str) -> Result<bool, StorageError>;

    /// Case-insensitive substring search over client name and email.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the database operation fails.
    async fn search(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<MeasurementDocument>, StorageError>;
}

/// Derived client views.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClientDirectory: Send + Sync {
    /// One view per distinct email, most recently measured first.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the database operation fails.
    async fn get_unique_clients(&self, limit: u32) -> Result<Vec<ClientView>, StorageError>;

    /// Collection-wide counters.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the database operation fails.
    async fn get_statistics(&self) -> Result<ClientStatistics, StorageError>;
}

/// Image blob operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageStorage: Send + Sync {
    /// Store bytes and return the new file identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the blob cannot be written.
    async fn store(
        &self,
        data: &[u8],
        filename: &str,
        metadata: Option<Metadata>,
    ) -> Result<String, StorageError>;

    /// Read bytes back; `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the database operation fails or the blob is corrupt.
    async fn get(&self, file_id: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Describe a blob; `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the database operation fails.
    async fn get_info(&self, file_id: &str) -> Result<Option<ImageRecord>, StorageError>;

    /// Delete a blob; `false` if absent.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the database operation fails.
    async fn delete(&self, file_id: &str) -> Result<bool, StorageError>;
}

/// Time provider trait for deterministic testing.
///
/// This trait abstracts time operations to allow for
/// deterministic testing by providing fixed timestamps.
#[cfg_attr(test, mockall::automock)]
pub trait TimeProvider: Send + Sync {
    /// Get the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Real time provider using system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealTimeProvider;

impl TimeProvider for RealTimeProvider {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
