//! Storage backend.
//!
//! This module provides:
//! - The shared [`Database`] handle and its lazy owner [`DatabaseManager`]
//! - Measurement document CRUD and search
//! - Client views derived from measurement documents
//! - A chunked blob store for images
//!
//! # Architecture
//!
//! The storage layer uses `SQLite` with the `sqlx` crate for async operations.
//! Measurement documents live in one table; client information is flattened
//! into indexed columns while measurements and metadata are stored as JSON.
//! Clients are never stored on their own: every client view is computed from
//! the measurement table at query time.
//!
//! The implementation is split across submodules:
//! - `core`: Connection setup, migrations, and helper functions
//! - `manager`: Lazy, shared initialisation
//! - `measurement`: Measurement document operations
//! - `client`: Client aggregation and statistics
//! - `image`: Chunked image store
//! - `trait_impl`: Trait implementations for the repositories
//!
//! # Example
//!
//! ```ignore
//! use bodymeasure_store::storage::{ClientInfo, Database};
//!
//! let db = Database::init(None).await?;
//! let id = db
//!     .measurements()
//!     .create(&ClientInfo::new("Jane", "jane@x.com"), &measurements, None)
//!     .await?;
//! let stats = db.clients().get_statistics().await?;
//! ```

mod client;
mod core;
mod image;
mod manager;
mod measurement;
mod trait_impl;
mod types;

pub use self::core::Database;
pub use client::{ClientAggregator, DEFAULT_CLIENT_LIMIT, RECENT_WINDOW_DAYS};
pub use image::{ImageStore, DEFAULT_CHUNK_SIZE, DEFAULT_CONTENT_TYPE};
pub use manager::DatabaseManager;
pub use measurement::{MeasurementRepository, DEFAULT_MEASUREMENT_LIMIT, MAX_QUERY_LIMIT};
pub use types::{
    ClientInfo, ClientStatistics, ClientView, ImageRecord, MeasurementDocument, MeasurementUpdate,
    Measurements, Metadata,
};
