//! Measurement workflow integration tests.
//!
//! Tests the full lifecycle: create → get → update → search → delete

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]

use std::sync::Arc;

use bodymeasure_store::storage::{
    ClientInfo, MeasurementUpdate, Measurements, Metadata, DEFAULT_MEASUREMENT_LIMIT,
};
use chrono::Duration;
use serde_json::json;
use serial_test::serial;

use super::{create_test_database, measurements, ManualClock};

#[tokio::test]
#[serial]
async fn test_measurement_lifecycle() {
    let (db, _temp_dir) = create_test_database().await;
    let clock = Arc::new(ManualClock::at("2024-03-01T10:00:00Z"));
    let db = db.with_clock(clock.clone());
    let repo = db.measurements();

    let mut metadata = Metadata::new();
    metadata.insert("measured_by".into(), json!("Sam"));

    // Step 1: Create
    let client = ClientInfo::new("Jane Smith", "jane@x.com")
        .with_phone("555-0100")
        .with_notes("prefers metric");
    let id = repo
        .create(
            &client,
            &measurements(&[("chest", 36.0), ("waist", 28.5)]),
            Some(&metadata),
        )
        .await
        .expect("Failed to create measurement");

    // Step 2: Get
    let doc = repo.get_by_id(&id).await.unwrap().expect("Document should exist");
    assert_eq!(doc.id, id);
    assert_eq!(doc.client_info, client);
    assert_eq!(doc.measurements["waist"], 28.5);
    assert_eq!(doc.metadata["measured_by"], json!("Sam"));
    assert_eq!(doc.created_at, doc.updated_at);

    // Step 3: Update only the measurements
    clock.advance(Duration::minutes(5));
    let update = MeasurementUpdate::new().measurements(measurements(&[("chest", 37.0)]));
    assert!(repo.update(&id, &update).await.unwrap());

    let doc = repo.get_by_id(&id).await.unwrap().unwrap();
    assert_eq!(doc.measurements, measurements(&[("chest", 37.0)]));
    assert_eq!(doc.client_info, client);
    assert_eq!(doc.metadata["measured_by"], json!("Sam"));
    assert_eq!(doc.updated_at - doc.created_at, Duration::minutes(5));

    // Step 4: Search
    let found = repo.search("SMITH", DEFAULT_MEASUREMENT_LIMIT).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, id);

    // Step 5: Delete
    assert!(repo.delete(&id).await.unwrap());
    assert!(repo.get_by_id(&id).await.unwrap().is_none());
    assert!(!repo.delete(&id).await.unwrap());
    assert_eq!(repo.count().await.unwrap(), 0);
}

#[tokio::test]
#[serial]
async fn test_history_is_newest_first_and_limited() {
    let (db, _temp_dir) = create_test_database().await;
    let clock = Arc::new(ManualClock::at("2024-03-01T10:00:00Z"));
    let db = db.with_clock(clock.clone());
    let repo = db.measurements();

    let mut ids = Vec::new();
    for waist in [30.0, 29.5, 29.0, 28.5] {
        ids.push(
            repo.create(
                &ClientInfo::new("Jane", "jane@x.com"),
                &measurements(&[("waist", waist)]),
                None,
            )
            .await
            .unwrap(),
        );
        clock.advance(Duration::days(7));
    }
    repo.create(&ClientInfo::new("Bob", "bob@y.com"), &Measurements::new(), None)
        .await
        .unwrap();

    let history = repo.get_by_client_email("jane@x.com", 3).await.unwrap();
    let history_ids: Vec<&str> = history.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(history_ids, vec![ids[3].as_str(), ids[2].as_str(), ids[1].as_str()]);

    // Email match is exact.
    assert!(repo
        .get_by_client_email("JANE@X.COM", DEFAULT_MEASUREMENT_LIMIT)
        .await
        .unwrap()
        .is_empty());

    let recent = repo.list_recent(2).await.unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].client_info.email, "bob@y.com");
    assert_eq!(recent[1].id, ids[3]);
}

#[tokio::test]
#[serial]
async fn test_search_treats_pattern_characters_literally() {
    let (db, _temp_dir) = create_test_database().await;
    let repo = db.measurements();

    repo.create(&ClientInfo::new("Ann", "ann.lee@x.com"), &Measurements::new(), None)
        .await
        .unwrap();
    repo.create(&ClientInfo::new("Annie", "annxlee@x.com"), &Measurements::new(), None)
        .await
        .unwrap();
    repo.create(&ClientInfo::new("100% Cotton", "c@x.com"), &Measurements::new(), None)
        .await
        .unwrap();

    let dot = repo.search("ann.lee", DEFAULT_MEASUREMENT_LIMIT).await.unwrap();
    assert_eq!(dot.len(), 1);
    assert_eq!(dot[0].client_info.name, "Ann");

    let percent = repo.search("0%", DEFAULT_MEASUREMENT_LIMIT).await.unwrap();
    assert_eq!(percent.len(), 1);

    assert!(repo.search("a_n", DEFAULT_MEASUREMENT_LIMIT).await.unwrap().is_empty());
}

#[tokio::test]
#[serial]
async fn test_update_client_info_moves_document() {
    let (db, _temp_dir) = create_test_database().await;
    let repo = db.measurements();

    let id = repo
        .create(&ClientInfo::new("Jane", "old@x.com"), &Measurements::new(), None)
        .await
        .unwrap();

    let update = MeasurementUpdate::new().client_info(ClientInfo::new("Jane", "new@x.com"));
    assert!(repo.update(&id, &update).await.unwrap());

    assert!(repo
        .get_by_client_email("old@x.com", DEFAULT_MEASUREMENT_LIMIT)
        .await
        .unwrap()
        .is_empty());
    assert_eq!(
        repo.get_by_client_email("new@x.com", DEFAULT_MEASUREMENT_LIMIT)
            .await
            .unwrap()
            .len(),
        1
    );
}
