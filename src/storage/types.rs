//! Storage types for database operations.
//!
//! This module defines the types stored in and derived from the database:
//! - [`ClientInfo`]: Client details embedded in every measurement document
//! - [`MeasurementDocument`]: One submitted measurement session
//! - [`MeasurementUpdate`]: Shallow field merge applied by updates
//! - [`ClientView`]: Per-email summary computed from measurement documents
//! - [`ClientStatistics`]: Collection-wide counters
//! - [`ImageRecord`]: Descriptor of a blob in the chunked image store

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body dimensions keyed by measurement name (e.g. `chest`, `waist`).
pub type Measurements = BTreeMap<String, f64>;

/// Free-form attributes attached to a document or blob.
pub type Metadata = Map<String, Value>;

/// Client details embedded in a measurement document.
///
/// `name` and `email` are required; `phone` and `notes` default to empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    /// Client display name.
    pub name: String,
    /// Client email; identifies the client across documents.
    pub email: String,
    /// Phone number.
    #[serde(default)]
    pub phone: String,
    /// Free-text notes.
    #[serde(default)]
    pub notes: String,
}

impl ClientInfo {
    /// Create client info with the required fields.
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: String::new(),
            notes: String::new(),
        }
    }

    /// Set the phone number.
    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }

    /// Set notes.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }
}

/// Measurement document stored in database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementDocument {
    /// Unique document identifier.
    pub id: String,
    /// Client the measurements belong to.
    pub client_info: ClientInfo,
    /// Body dimensions.
    pub measurements: Measurements,
    /// Additional attributes (capture settings and the like).
    #[serde(default)]
    pub metadata: Metadata,
    /// Creation timestamp, set once.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Fields to merge into an existing measurement document.
///
/// The merge is shallow: a field that is present replaces the stored value
/// wholesale, so including `measurements` drops any measurement names not in
/// the new map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasurementUpdate {
    /// Replacement client info.
    pub client_info: Option<ClientInfo>,
    /// Replacement measurements map.
    pub measurements: Option<Measurements>,
    /// Replacement metadata map.
    pub metadata: Option<Metadata>,
}

impl MeasurementUpdate {
    /// An update that only refreshes `updated_at`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace client info.
    #[must_use]
    pub fn client_info(mut self, client_info: ClientInfo) -> Self {
        self.client_info = Some(client_info);
        self
    }

    /// Replace the measurements map.
    #[must_use]
    pub fn measurements(mut self, measurements: Measurements) -> Self {
        self.measurements = Some(measurements);
        self
    }

    /// Replace the metadata map.
    #[must_use]
    pub fn metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Returns true if no field would change besides `updated_at`.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.client_info.is_none() && self.measurements.is_none() && self.metadata.is_none()
    }
}

/// Client summary derived from all measurement documents sharing an email.
///
/// Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientView {
    /// Name from the client's most recent document.
    pub name: String,
    /// Grouping key.
    pub email: String,
    /// Phone from the client's most recent document.
    pub phone: String,
    /// Newest `created_at` in the group.
    pub last_measurement: DateTime<Utc>,
    /// Oldest `created_at` in the group.
    pub first_measurement: DateTime<Utc>,
    /// Number of documents in the group.
    pub measurement_count: u64,
    /// Every measurements map in the group, newest first.
    pub latest_measurements: Vec<Measurements>,
}

/// Collection-wide statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientStatistics {
    /// Count of all measurement documents.
    pub total_measurements: u64,
    /// Count of distinct client emails.
    pub unique_clients: u64,
    /// Documents created within the last 30 days.
    pub recent_measurements: u64,
    /// `total / max(unique, 1)`, rounded to two decimals.
    pub average_measurements_per_client: f64,
    /// When the statistics were computed.
    pub last_updated: DateTime<Utc>,
}

/// Descriptor of an image blob in the chunked store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Generated file identifier.
    pub id: String,
    /// Original filename.
    pub filename: String,
    /// MIME type.
    pub content_type: String,
    /// Payload size in bytes.
    pub length: u64,
    /// Chunk size the payload was split with.
    pub chunk_size: u32,
    /// Upload timestamp.
    pub upload_date: DateTime<Utc>,
    /// Stored metadata, including `filename`, `upload_date` and `content_type`.
    pub metadata: Metadata,
}
