//! Client views derived from measurement documents.
//!
//! There is no client table behind these operations: a client is the set of
//! measurement documents sharing an email, summarised at query time.

#![allow(clippy::missing_errors_doc)]

use chrono::Duration;
use sqlx::Row;

use crate::error::StorageError;

use super::core::Database;
use super::measurement::{clamp_limit, decode_measurements};
use super::types::{ClientStatistics, ClientView, Measurements};

/// Default cap for [`ClientAggregator::get_unique_clients`].
pub const DEFAULT_CLIENT_LIMIT: u32 = 100;

/// Window counted as "recent" by [`ClientAggregator::get_statistics`].
pub const RECENT_WINDOW_DAYS: i64 = 30;

/// Read-only aggregation over the measurement collection.
///
/// Obtained from [`Database::clients`].
#[derive(Debug, Clone)]
pub struct ClientAggregator {
    db: Database,
}

impl ClientAggregator {
    pub(crate) const fn new(db: Database) -> Self {
        Self { db }
    }

    /// One view per distinct email, most recently measured first.
    ///
    /// `name` and `phone` come from the client's newest document (ties broken
    /// by id). `latest_measurements` holds every measurements map of the
    /// client, newest first. The group summary and the per-client maps are
    /// separate reads, so a concurrent insert may show up in one and not the
    /// other.
    pub async fn get_unique_clients(&self, limit: u32) -> Result<Vec<ClientView>, StorageError> {
        let rows = sqlx::query(
            "SELECT m.client_email AS email,
                    MAX(m.created_at) AS last_measurement,
                    MIN(m.created_at) AS first_measurement,
                    COUNT(*) AS measurement_count,
                    (SELECT l.client_name FROM measurements l
                      WHERE l.client_email = m.client_email
                      ORDER BY l.created_at DESC, l.id DESC LIMIT 1) AS name,
                    (SELECT l.client_phone FROM measurements l
                      WHERE l.client_email = m.client_email
                      ORDER BY l.created_at DESC, l.id DESC LIMIT 1) AS phone
             FROM measurements m
             GROUP BY m.client_email
             ORDER BY last_measurement DESC, email ASC
             LIMIT ?",
        )
        .bind(clamp_limit(limit))
        .fetch_all(&self.db.pool)
        .await
        .map_err(|e| Database::query_error("AGGREGATE clients", e))?;

        let mut clients = Vec::with_capacity(rows.len());
        for row in &rows {
            let email: String = row.get("email");
            let last: String = row.get("last_measurement");
            let first: String = row.get("first_measurement");
            let count: i64 = row.get("measurement_count");

            clients.push(ClientView {
                name: row.get("name"),
                phone: row.get("phone"),
                last_measurement: Database::parse_datetime(&last)?,
                first_measurement: Database::parse_datetime(&first)?,
                measurement_count: u64::try_from(count).unwrap_or(0),
                latest_measurements: self.measurement_history(&email).await?,
                email,
            });
        }

        tracing::debug!(count = clients.len(), "Aggregated unique clients");
        Ok(clients)
    }

    /// Every measurements map recorded for `email`, newest first.
    async fn measurement_history(
        &self,
        email: &str,
    ) -> Result<Vec<Measurements>, StorageError> {
        let rows = sqlx::query(
            "SELECT id, measurements FROM measurements
             WHERE client_email = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(email)
        .fetch_all(&self.db.pool)
        .await
        .map_err(|e| Database::query_error("SELECT client measurements", e))?;

        rows.iter()
            .map(|row| {
                let id: String = row.get("id");
                let json: String = row.get("measurements");
                decode_measurements(&id, &json)
            })
            .collect()
    }

    /// Collection-wide counters.
    ///
    /// `last_updated` is the time of this call, not a stored value. With no
    /// documents the average is `0.0`.
    pub async fn get_statistics(&self) -> Result<ClientStatistics, StorageError> {
        let now = self.db.now();
        let since = Database::format_datetime(&(now - Duration::days(RECENT_WINDOW_DAYS)));

        let row = sqlx::query(
            "SELECT COUNT(*) AS total,
                    COUNT(DISTINCT client_email) AS unique_clients,
                    COALESCE(SUM(CASE WHEN created_at >= ? THEN 1 ELSE 0 END), 0) AS recent
             FROM measurements",
        )
        .bind(&since)
        .fetch_one(&self.db.pool)
        .await
        .map_err(|e| Database::query_error("STATS measurements", e))?;

        let total = u64::try_from(row.get::<i64, _>("total")).unwrap_or(0);
        let unique_clients = u64::try_from(row.get::<i64, _>("unique_clients")).unwrap_or(0);
        let recent = u64::try_from(row.get::<i64, _>("recent")).unwrap_or(0);

        Ok(ClientStatistics {
            total_measurements: total,
            unique_clients,
            recent_measurements: recent,
            average_measurements_per_client: average_per_client(total, unique_clients),
            last_updated: now,
        })
    }
}

/// `total / max(unique, 1)` rounded to two decimals.
#[allow(clippy::cast_precision_loss)]
fn average_per_client(total: u64, unique: u64) -> f64 {
    let avg = total as f64 / unique.max(1) as f64;
    (avg * 100.0).round() / 100.0
}
