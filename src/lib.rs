//! Body Measurement Store
//!
//! Data-access layer for a body-measurement tracking application: client
//! measurement documents, client summaries derived from them, and the
//! images captured alongside.
//!
//! # Features
//!
//! - Measurement document CRUD and case-insensitive search
//! - Per-client views and collection statistics computed at query time
//! - Chunked image blob store
//! - `SQLite` persistence via `sqlx`, configured from the environment
//!
//! # Quick Start
//!
//! ```ignore
//! use bodymeasure_store::storage::{ClientInfo, DatabaseManager};
//!
//! let manager = DatabaseManager::new(None); // DATABASE_URI / DATABASE_NAME
//! let db = manager.get_database().await?;
//! let id = db
//!     .measurements()
//!     .create(&ClientInfo::new("Jane", "jane@x.com"), &measurements, None)
//!     .await?;
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   repositories   ┌──────────────────┐
//! │ HTTP backend │─────────────────▶│ Database handle  │──────▶ SQLite
//! │  (caller)    │◀─────────────────│ (shared pool)    │
//! └──────────────┘     Result<_>    └──────────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod logging;
pub mod storage;
pub mod traits;

#[cfg(test)]
mod test_utils;
