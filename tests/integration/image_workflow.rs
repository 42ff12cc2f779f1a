//! Image store integration tests.
//!
//! Tests the blob lifecycle: store → describe → read → delete

#![allow(clippy::unwrap_used, clippy::expect_used)]

use bodymeasure_store::storage::{Metadata, DEFAULT_CHUNK_SIZE, DEFAULT_CONTENT_TYPE};
use serde_json::json;
use serial_test::serial;

use super::create_test_database;

#[tokio::test]
#[serial]
async fn test_image_lifecycle() {
    let (db, _temp_dir) = create_test_database().await;
    let images = db.file_store();
    let payload: Vec<u8> = (0..(DEFAULT_CHUNK_SIZE * 2 + 17))
        .map(|i| (i % 253) as u8)
        .collect();

    let mut metadata = Metadata::new();
    metadata.insert("content_type".into(), json!("image/png"));
    metadata.insert("client_email".into(), json!("jane@x.com"));

    let id = images
        .store(&payload, "side.png", Some(&metadata))
        .await
        .expect("Failed to store image");

    let info = images.get_info(&id).await.unwrap().expect("Image should exist");
    assert_eq!(info.filename, "side.png");
    assert_eq!(info.content_type, "image/png");
    assert_eq!(info.length, payload.len() as u64);
    assert_eq!(info.metadata["client_email"], json!("jane@x.com"));
    assert_eq!(info.metadata["filename"], json!("side.png"));

    assert_eq!(images.get(&id).await.unwrap(), Some(payload));

    assert!(images.delete(&id).await.unwrap());
    assert!(images.get(&id).await.unwrap().is_none());
    assert!(images.get_info(&id).await.unwrap().is_none());
    assert!(!images.delete(&id).await.unwrap());
}

#[tokio::test]
#[serial]
async fn test_empty_image_and_default_content_type() {
    let (db, _temp_dir) = create_test_database().await;
    let images = db.file_store();

    let id = images.store(&[], "blank.jpg", None).await.unwrap();
    assert_eq!(images.get(&id).await.unwrap(), Some(Vec::new()));

    let info = images.get_info(&id).await.unwrap().unwrap();
    assert_eq!(info.length, 0);
    assert_eq!(info.content_type, DEFAULT_CONTENT_TYPE);
}

#[tokio::test]
#[serial]
async fn test_small_chunks_round_trip() {
    let (db, _temp_dir) = create_test_database().await;
    let images = db.file_store().with_chunk_size(7);
    let payload = b"a sequence of bytes longer than one chunk".to_vec();

    let id = images.store(&payload, "tiny.jpg", None).await.unwrap();
    assert_eq!(images.get(&id).await.unwrap(), Some(payload));
    assert_eq!(images.get_info(&id).await.unwrap().unwrap().chunk_size, 7);
}
