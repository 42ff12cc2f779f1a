//! Chunked image blob store.
//!
//! Each blob is one `image_files` row plus `ceil(length / chunk_size)` rows
//! in `image_chunks`, numbered from zero. Writes and deletes happen in a
//! single transaction so readers never see a partial blob.

#![allow(clippy::missing_errors_doc)]

use serde_json::Value;
use sqlx::Row;

use crate::error::StorageError;

use super::core::Database;
use super::types::{ImageRecord, Metadata};

/// Default chunk size: 255 KiB.
pub const DEFAULT_CHUNK_SIZE: usize = 255 * 1024;

/// Content type recorded when the caller does not supply one.
pub const DEFAULT_CONTENT_TYPE: &str = "image/jpeg";

/// Binary image storage keyed by generated identifiers.
///
/// Obtained from [`Database::file_store`]. There is no update: replacing an
/// image means deleting it and storing the new bytes.
#[derive(Debug, Clone)]
pub struct ImageStore {
    db: Database,
    chunk_size: usize,
}

impl ImageStore {
    pub(crate) const fn new(db: Database) -> Self {
        Self {
            db,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Use a different chunk size for subsequent writes.
    ///
    /// Existing blobs keep the size they were written with.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Store `data` and return the new file identifier.
    ///
    /// The stored metadata is `filename`, `upload_date` and `content_type`
    /// (default `image/jpeg`) overlaid with `metadata`; caller keys win.
    pub async fn store(
        &self,
        data: &[u8],
        filename: &str,
        metadata: Option<&Metadata>,
    ) -> Result<String, StorageError> {
        let id = Database::generate_id();
        let upload_date = self.db.now();
        let upload_date_str = Database::format_datetime(&upload_date);

        let mut merged = Metadata::new();
        merged.insert("filename".into(), Value::from(filename));
        merged.insert("upload_date".into(), Value::from(upload_date_str.clone()));
        merged.insert("content_type".into(), Value::from(DEFAULT_CONTENT_TYPE));
        if let Some(extra) = metadata {
            merged.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        let content_type = merged
            .get("content_type")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();
        let metadata_json =
            serde_json::to_string(&merged).map_err(|e| StorageError::InvalidDocument {
                id: id.clone(),
                message: format!("Failed to encode image metadata: {e}"),
            })?;
        let length = i64::try_from(data.len()).map_err(|_| StorageError::InvalidDocument {
            id: id.clone(),
            message: "image too large".to_string(),
        })?;
        let chunk_size = i64::try_from(self.chunk_size).unwrap_or(i64::MAX);

        let mut tx = self
            .db
            .pool
            .begin()
            .await
            .map_err(|e| Database::query_error("BEGIN store image", e))?;

        sqlx::query(
            "INSERT INTO image_files (id, filename, content_type, length, chunk_size, upload_date, metadata)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(filename)
        .bind(&content_type)
        .bind(length)
        .bind(chunk_size)
        .bind(&upload_date_str)
        .bind(&metadata_json)
        .execute(&mut *tx)
        .await
        .map_err(|e| Database::query_error("INSERT image_files", e))?;

        for (n, chunk) in data.chunks(self.chunk_size).enumerate() {
            sqlx::query("INSERT INTO image_chunks (file_id, n, data) VALUES (?, ?, ?)")
                .bind(&id)
                .bind(i64::try_from(n).unwrap_or(i64::MAX))
                .bind(chunk)
                .execute(&mut *tx)
                .await
                .map_err(|e| Database::query_error("INSERT image_chunks", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| Database::query_error("COMMIT store image", e))?;

        tracing::info!(id = %id, filename, bytes = data.len(), "Stored image");
        Ok(id)
    }

    /// Read an image back.
    ///
    /// Returns `None` if no blob has this ID or the ID is malformed.
    pub async fn get(&self, file_id: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let Some(id) = Database::normalize_id(file_id) else {
            return Ok(None);
        };

        let mut tx = self
            .db
            .pool
            .begin()
            .await
            .map_err(|e| Database::query_error("BEGIN get image", e))?;

        let length: Option<i64> = sqlx::query_scalar("SELECT length FROM image_files WHERE id = ?")
            .bind(&id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| Database::query_error("SELECT image_files", e))?;
        let Some(length) = length else {
            return Ok(None);
        };

        let chunks: Vec<Vec<u8>> =
            sqlx::query_scalar("SELECT data FROM image_chunks WHERE file_id = ? ORDER BY n ASC")
                .bind(&id)
                .fetch_all(&mut *tx)
                .await
                .map_err(|e| Database::query_error("SELECT image_chunks", e))?;

        tx.commit()
            .await
            .map_err(|e| Database::query_error("COMMIT get image", e))?;

        let data = chunks.concat();
        if i64::try_from(data.len()).ok() != Some(length) {
            tracing::error!(id = %id, expected = length, actual = data.len(), "Corrupt image blob");
            return Err(StorageError::Internal {
                message: format!(
                    "image {id} is corrupt: expected {length} bytes, found {}",
                    data.len()
                ),
            });
        }

        tracing::debug!(id = %id, bytes = data.len(), "Retrieved image");
        Ok(Some(data))
    }

    /// Describe a stored image without reading its payload.
    pub async fn get_info(&self, file_id: &str) -> Result<Option<ImageRecord>, StorageError> {
        let Some(id) = Database::normalize_id(file_id) else {
            return Ok(None);
        };

        let row = sqlx::query(
            "SELECT id, filename, content_type, length, chunk_size, upload_date, metadata
             FROM image_files WHERE id = ?",
        )
        .bind(&id)
        .fetch_optional(&self.db.pool)
        .await
        .map_err(|e| Database::query_error("SELECT image_files", e))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let metadata_json: String = row.get("metadata");
        let metadata: Metadata =
            serde_json::from_str(&metadata_json).map_err(|e| StorageError::InvalidDocument {
                id: id.clone(),
                message: format!("Failed to decode image metadata: {e}"),
            })?;
        let upload_date: String = row.get("upload_date");

        Ok(Some(ImageRecord {
            id: row.get("id"),
            filename: row.get("filename"),
            content_type: row.get("content_type"),
            length: u64::try_from(row.get::<i64, _>("length")).unwrap_or(0),
            chunk_size: u32::try_from(row.get::<i64, _>("chunk_size")).unwrap_or(u32::MAX),
            upload_date: Database::parse_datetime(&upload_date)?,
            metadata,
        }))
    }

    /// Delete an image and all of its chunks.
    ///
    /// Returns `false` if no blob has this ID.
    pub async fn delete(&self, file_id: &str) -> Result<bool, StorageError> {
        let Some(id) = Database::normalize_id(file_id) else {
            return Ok(false);
        };

        let mut tx = self
            .db
            .pool
            .begin()
            .await
            .map_err(|e| Database::query_error("BEGIN delete image", e))?;

        sqlx::query("DELETE FROM image_chunks WHERE file_id = ?")
            .bind(&id)
            .execute(&mut *tx)
            .await
            .map_err(|e| Database::query_error("DELETE image_chunks", e))?;

        let result = sqlx::query("DELETE FROM image_files WHERE id = ?")
            .bind(&id)
            .execute(&mut *tx)
            .await
            .map_err(|e| Database::query_error("DELETE image_files", e))?;

        tx.commit()
            .await
            .map_err(|e| Database::query_error("COMMIT delete image", e))?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::info!(id = %id, "Deleted image");
        }
        Ok(deleted)
    }
}
