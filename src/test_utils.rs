//! Test utilities and fixtures.
//!
//! This module provides helpers for creating mock objects and test data.

#![allow(clippy::expect_used)]

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Duration, Utc};

use crate::storage::Measurements;
use crate::traits::{MockTimeProvider, TimeProvider};

/// Create a mock time provider that returns a fixed timestamp.
#[must_use]
pub fn mock_time(time: DateTime<Utc>) -> MockTimeProvider {
    let mut mock = MockTimeProvider::new();
    mock.expect_now().return_const(time);
    mock
}

/// Create a mock time provider from an ISO 8601 timestamp string.
///
/// # Panics
///
/// Panics if the timestamp string is invalid.
#[must_use]
pub fn mock_time_str(timestamp: &str) -> MockTimeProvider {
    let time = timestamp
        .parse::<DateTime<Utc>>()
        .expect("Invalid timestamp format");
    mock_time(time)
}

/// Clock that advances one second on every read.
///
/// Gives each stamped document a distinct, increasing timestamp without
/// sleeping.
#[derive(Debug)]
pub struct StepClock {
    start: DateTime<Utc>,
    ticks: AtomicI64,
}

impl StepClock {
    /// Start counting from an ISO 8601 timestamp.
    ///
    /// # Panics
    ///
    /// Panics if the timestamp string is invalid.
    #[must_use]
    pub fn starting_at(timestamp: &str) -> Self {
        Self {
            start: timestamp
                .parse::<DateTime<Utc>>()
                .expect("Invalid timestamp format"),
            ticks: AtomicI64::new(0),
        }
    }
}

impl TimeProvider for StepClock {
    fn now(&self) -> DateTime<Utc> {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
        self.start + Duration::seconds(tick)
    }
}

/// Build a measurements map from name/value pairs.
#[must_use]
pub fn measurements(pairs: &[(&str, f64)]) -> Measurements {
    pairs
        .iter()
        .map(|(name, value)| ((*name).to_string(), *value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_time_str() {
        let mock = mock_time_str("2024-01-15T12:00:00Z");
        assert_eq!(mock.now().to_rfc3339(), "2024-01-15T12:00:00+00:00");
    }

    #[test]
    fn test_step_clock_advances() {
        let clock = StepClock::starting_at("2024-01-15T12:00:00Z");
        let a = clock.now();
        let b = clock.now();
        assert_eq!(b - a, Duration::seconds(1));
    }

    #[test]
    fn test_measurements_builder() {
        let m = measurements(&[("chest", 36.0), ("waist", 30.0)]);
        assert_eq!(m.len(), 2);
        assert!(m.contains_key("chest"));
    }
}
