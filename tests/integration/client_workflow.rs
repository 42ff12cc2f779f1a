//! Client view integration tests.
//!
//! Tests the derived views: record visits → list clients → statistics

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]

use std::sync::Arc;

use bodymeasure_store::storage::{ClientInfo, Measurements, DEFAULT_CLIENT_LIMIT};
use bodymeasure_store::traits::TimeProvider;
use chrono::Duration;
use pretty_assertions::assert_eq;
use serial_test::serial;

use super::{create_test_database, measurements, ManualClock};

#[tokio::test]
#[serial]
async fn test_client_views_follow_visits() {
    let (db, _temp_dir) = create_test_database().await;
    let clock = Arc::new(ManualClock::at("2024-01-10T08:00:00Z"));
    let db = db.with_clock(clock.clone());
    let repo = db.measurements();

    repo.create(
        &ClientInfo::new("Jane", "jane@x.com").with_phone("111"),
        &measurements(&[("hips", 40.0)]),
        None,
    )
    .await
    .unwrap();
    clock.advance(Duration::days(1));
    repo.create(&ClientInfo::new("Bob", "bob@y.com"), &Measurements::new(), None)
        .await
        .unwrap();
    clock.advance(Duration::days(1));
    repo.create(
        &ClientInfo::new("Jane Smith", "jane@x.com").with_phone("222"),
        &measurements(&[("hips", 39.0)]),
        None,
    )
    .await
    .unwrap();

    let clients = db.clients().get_unique_clients(DEFAULT_CLIENT_LIMIT).await.unwrap();
    let emails: Vec<&str> = clients.iter().map(|c| c.email.as_str()).collect();
    assert_eq!(emails, vec!["jane@x.com", "bob@y.com"]);

    let jane = &clients[0];
    assert_eq!(jane.name, "Jane Smith");
    assert_eq!(jane.phone, "222");
    assert_eq!(jane.measurement_count, 2);
    assert_eq!(jane.last_measurement - jane.first_measurement, Duration::days(2));
    assert_eq!(
        jane.latest_measurements,
        vec![measurements(&[("hips", 39.0)]), measurements(&[("hips", 40.0)])]
    );

    // Limit keeps the most recently measured clients.
    let top = db.clients().get_unique_clients(1).await.unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].email, "jane@x.com");
}

#[tokio::test]
#[serial]
async fn test_statistics_recent_window() {
    let (db, _temp_dir) = create_test_database().await;
    let clock = Arc::new(ManualClock::at("2024-01-01T00:00:00Z"));
    let db = db.with_clock(clock.clone());
    let repo = db.measurements();

    for email in ["a@x.com", "b@x.com", "c@x.com"] {
        repo.create(&ClientInfo::new("old", email), &Measurements::new(), None)
            .await
            .unwrap();
    }
    clock.advance(Duration::days(60));
    repo.create(&ClientInfo::new("new", "a@x.com"), &Measurements::new(), None)
        .await
        .unwrap();
    clock.advance(Duration::days(1));

    let stats = db.clients().get_statistics().await.unwrap();
    assert_eq!(stats.total_measurements, 4);
    assert_eq!(stats.unique_clients, 3);
    assert_eq!(stats.recent_measurements, 1);
    assert_eq!(stats.average_measurements_per_client, 1.33);
    assert_eq!(stats.last_updated, clock.now());
}

#[tokio::test]
#[serial]
async fn test_statistics_on_empty_store() {
    let (db, _temp_dir) = create_test_database().await;

    let stats = db.clients().get_statistics().await.unwrap();
    assert_eq!(stats.total_measurements, 0);
    assert_eq!(stats.unique_clients, 0);
    assert_eq!(stats.recent_measurements, 0);
    assert_eq!(stats.average_measurements_per_client, 0.0);
    assert!(db
        .clients()
        .get_unique_clients(DEFAULT_CLIENT_LIMIT)
        .await
        .unwrap()
        .is_empty());
}

