//! Measurement document operations.

#![allow(clippy::missing_errors_doc)]

use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::error::StorageError;

use super::core::Database;
use super::types::{ClientInfo, MeasurementDocument, MeasurementUpdate, Measurements, Metadata};

/// Default cap for per-client and search listings.
pub const DEFAULT_MEASUREMENT_LIMIT: u32 = 50;

/// Hard cap applied to every caller-supplied limit.
pub const MAX_QUERY_LIMIT: u32 = 1000;

const SELECT_COLUMNS: &str = "SELECT id, client_name, client_email, client_phone, client_notes, \
     measurements, metadata, created_at, updated_at FROM measurements";

/// CRUD and search over measurement documents.
///
/// Obtained from [`Database::measurements`].
#[derive(Debug, Clone)]
pub struct MeasurementRepository {
    db: Database,
}

impl MeasurementRepository {
    pub(crate) const fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert a new measurement document and return its identifier.
    ///
    /// `created_at` and `updated_at` are both set to the current time.
    /// No schema validation happens here beyond rejecting non-finite
    /// measurement values, which cannot be stored as JSON numbers.
    pub async fn create(
        &self,
        client_info: &ClientInfo,
        measurements: &Measurements,
        metadata: Option<&Metadata>,
    ) -> Result<String, StorageError> {
        let id = Database::generate_id();
        let now = Database::format_datetime(&self.db.now());
        let measurements_json = encode_measurements(&id, measurements)?;
        let metadata_json = encode_metadata(&id, metadata.unwrap_or(&Metadata::new()))?;

        sqlx::query(
            "INSERT INTO measurements (id, client_name, client_email, client_phone, client_notes,
                                       client_name_folded, client_email_folded,
                                       measurements, metadata, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&client_info.name)
        .bind(&client_info.email)
        .bind(&client_info.phone)
        .bind(&client_info.notes)
        .bind(fold_case(&client_info.name))
        .bind(fold_case(&client_info.email))
        .bind(&measurements_json)
        .bind(&metadata_json)
        .bind(&now)
        .bind(&now)
        .execute(&self.db.pool)
        .await
        .map_err(|e| Database::query_error("INSERT measurements", e))?;

        tracing::info!(id = %id, client = %client_info.name, "Created measurement record");
        Ok(id)
    }

    /// Get a measurement document by ID.
    ///
    /// Returns `None` if the document doesn't exist or the ID is malformed.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<MeasurementDocument>, StorageError> {
        let Some(id) = Database::normalize_id(id) else {
            return Ok(None);
        };

        let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE id = ?"))
            .bind(&id)
            .fetch_optional(&self.db.pool)
            .await
            .map_err(|e| Database::query_error("SELECT measurements by id", e))?;

        row.as_ref().map(row_to_document).transpose()
    }

    /// Get a client's measurement documents, newest first.
    ///
    /// Matches `email` exactly. An unknown email yields an empty list.
    pub async fn get_by_client_email(
        &self,
        email: &str,
        limit: u32,
    ) -> Result<Vec<MeasurementDocument>, StorageError> {
        let rows = sqlx::query(&format!(
            "{SELECT_COLUMNS} WHERE client_email = ? ORDER BY created_at DESC, id DESC LIMIT ?"
        ))
        .bind(email)
        .bind(clamp_limit(limit))
        .fetch_all(&self.db.pool)
        .await
        .map_err(|e| Database::query_error("SELECT measurements by email", e))?;

        tracing::debug!(email, count = rows.len(), "Fetched client measurements");
        rows_to_documents(&rows)
    }

    /// Merge `updates` into a document and refresh `updated_at`.
    ///
    /// Returns `false` if no document has this ID.
    pub async fn update(&self, id: &str, updates: &MeasurementUpdate) -> Result<bool, StorageError> {
        let Some(id) = Database::normalize_id(id) else {
            return Ok(false);
        };

        let measurements_json = updates
            .measurements
            .as_ref()
            .map(|m| encode_measurements(&id, m))
            .transpose()?;
        let metadata_json = updates
            .metadata
            .as_ref()
            .map(|m| encode_metadata(&id, m))
            .transpose()?;
        let client = updates.client_info.as_ref();
        let now = Database::format_datetime(&self.db.now());

        let result = sqlx::query(
            "UPDATE measurements SET
                 client_name = COALESCE(?, client_name),
                 client_email = COALESCE(?, client_email),
                 client_phone = COALESCE(?, client_phone),
                 client_notes = COALESCE(?, client_notes),
                 client_name_folded = COALESCE(?, client_name_folded),
                 client_email_folded = COALESCE(?, client_email_folded),
                 measurements = COALESCE(?, measurements),
                 metadata = COALESCE(?, metadata),
                 updated_at = ?
             WHERE id = ?",
        )
        .bind(client.map(|c| c.name.as_str()))
        .bind(client.map(|c| c.email.as_str()))
        .bind(client.map(|c| c.phone.as_str()))
        .bind(client.map(|c| c.notes.as_str()))
        .bind(client.map(|c| fold_case(&c.name)))
        .bind(client.map(|c| fold_case(&c.email)))
        .bind(measurements_json)
        .bind(metadata_json)
        .bind(&now)
        .bind(&id)
        .execute(&self.db.pool)
        .await
        .map_err(|e| Database::query_error("UPDATE measurements", e))?;

        let updated = result.rows_affected() > 0;
        tracing::debug!(id = %id, updated, "Updated measurement record");
        Ok(updated)
    }

    /// Delete a measurement document.
    ///
    /// Returns `false` if no document has this ID.
    pub async fn delete(&self, id: &str) -> Result<bool, StorageError> {
        let Some(id) = Database::normalize_id(id) else {
            return Ok(false);
        };

        let result = sqlx::query("DELETE FROM measurements WHERE id = ?")
            .bind(&id)
            .execute(&self.db.pool)
            .await
            .map_err(|e| Database::query_error("DELETE measurements", e))?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::info!(id = %id, "Deleted measurement record");
        }
        Ok(deleted)
    }

    /// Case-insensitive substring search over client name and email.
    ///
    /// An empty query matches every document. Results are newest first.
    pub async fn search(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<MeasurementDocument>, StorageError> {
        let needle = fold_case(query);

        let rows = sqlx::query(&format!(
            "{SELECT_COLUMNS}
             WHERE instr(client_name_folded, ?) > 0 OR instr(client_email_folded, ?) > 0
             ORDER BY created_at DESC, id DESC LIMIT ?"
        ))
        .bind(&needle)
        .bind(&needle)
        .bind(clamp_limit(limit))
        .fetch_all(&self.db.pool)
        .await
        .map_err(|e| Database::query_error("SELECT measurements search", e))?;

        tracing::debug!(query, count = rows.len(), "Searched measurements");
        rows_to_documents(&rows)
    }

    /// Most recent documents across all clients.
    pub async fn list_recent(&self, limit: u32) -> Result<Vec<MeasurementDocument>, StorageError> {
        let rows = sqlx::query(&format!(
            "{SELECT_COLUMNS} ORDER BY created_at DESC, id DESC LIMIT ?"
        ))
        .bind(clamp_limit(limit))
        .fetch_all(&self.db.pool)
        .await
        .map_err(|e| Database::query_error("SELECT recent measurements", e))?;

        rows_to_documents(&rows)
    }

    /// Total number of measurement documents.
    pub async fn count(&self) -> Result<u64, StorageError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM measurements")
            .fetch_one(&self.db.pool)
            .await
            .map_err(|e| Database::query_error("COUNT measurements", e))?;

        Ok(u64::try_from(count).unwrap_or(0))
    }
}

/// Case-fold text for search; SQLite's own `lower()` only folds ASCII.
fn fold_case(text: &str) -> String {
    text.to_lowercase()
}

/// Clamp a caller limit to `1..=MAX_QUERY_LIMIT` for binding.
pub(crate) fn clamp_limit(limit: u32) -> i64 {
    i64::from(limit.clamp(1, MAX_QUERY_LIMIT))
}

fn encode_measurements(id: &str, measurements: &Measurements) -> Result<String, StorageError> {
    if let Some((name, value)) = measurements.iter().find(|(_, v)| !v.is_finite()) {
        return Err(StorageError::InvalidDocument {
            id: id.to_string(),
            message: format!("measurement '{name}' is not a finite number: {value}"),
        });
    }
    serde_json::to_string(measurements).map_err(|e| StorageError::InvalidDocument {
        id: id.to_string(),
        message: format!("Failed to encode measurements: {e}"),
    })
}

fn encode_metadata(id: &str, metadata: &Metadata) -> Result<String, StorageError> {
    serde_json::to_string(metadata).map_err(|e| StorageError::InvalidDocument {
        id: id.to_string(),
        message: format!("Failed to encode metadata: {e}"),
    })
}

/// Decode a stored measurements map.
pub(crate) fn decode_measurements(id: &str, json: &str) -> Result<Measurements, StorageError> {
    serde_json::from_str(json).map_err(|e| StorageError::InvalidDocument {
        id: id.to_string(),
        message: format!("Failed to decode measurements: {e}"),
    })
}

fn rows_to_documents(rows: &[SqliteRow]) -> Result<Vec<MeasurementDocument>, StorageError> {
    rows.iter().map(row_to_document).collect()
}

/// Convert a database row to a `MeasurementDocument`.
fn row_to_document(row: &SqliteRow) -> Result<MeasurementDocument, StorageError> {
    let id: String = row.get("id");
    let measurements_json: String = row.get("measurements");
    let metadata_json: String = row.get("metadata");
    let created_at_str: String = row.get("created_at");
    let updated_at_str: String = row.get("updated_at");

    let metadata: Metadata =
        serde_json::from_str(&metadata_json).map_err(|e| StorageError::InvalidDocument {
            id: id.clone(),
            message: format!("Failed to decode metadata: {e}"),
        })?;

    Ok(MeasurementDocument {
        client_info: ClientInfo {
            name: row.get("client_name"),
            email: row.get("client_email"),
            phone: row.get("client_phone"),
            notes: row.get("client_notes"),
        },
        measurements: decode_measurements(&id, &measurements_json)?,
        metadata,
        created_at: Database::parse_datetime(&created_at_str)?,
        updated_at: Database::parse_datetime(&updated_at_str)?,
        id,
    })
}
