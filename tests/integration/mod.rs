//! Integration test modules for end-to-end workflows.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod client_workflow;
mod image_workflow;
mod measurement_workflow;

use std::sync::atomic::{AtomicI64, Ordering};

use bodymeasure_store::config::DatabaseConfig;
use bodymeasure_store::storage::{Database, Measurements};
use bodymeasure_store::traits::TimeProvider;
use chrono::{DateTime, Duration, Utc};
use tempfile::TempDir;

/// Create a test database in a temporary directory.
pub async fn create_test_database() -> (Database, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = DatabaseConfig {
        database_uri: format!("sqlite://{}", temp_dir.path().display()),
        database_name: "workflow".to_string(),
        ..DatabaseConfig::default()
    };
    let db = Database::init(Some(&config))
        .await
        .expect("Failed to create database");
    (db, temp_dir)
}

pub fn measurements(pairs: &[(&str, f64)]) -> Measurements {
    pairs.iter().map(|(k, v)| ((*k).to_string(), *v)).collect()
}

/// Clock that can be moved by hand between operations.
#[derive(Debug)]
pub struct ManualClock {
    micros: AtomicI64,
}

impl ManualClock {
    pub fn at(rfc3339: &str) -> Self {
        let start = DateTime::parse_from_rfc3339(rfc3339)
            .expect("valid timestamp")
            .with_timezone(&Utc);
        Self {
            micros: AtomicI64::new(start.timestamp_micros()),
        }
    }

    pub fn advance(&self, by: Duration) {
        let micros = by.num_microseconds().expect("duration in range");
        self.micros.fetch_add(micros, Ordering::SeqCst);
    }
}

impl TimeProvider for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_micros(self.micros.load(Ordering::SeqCst))
            .expect("timestamp in range")
    }
}
