//! Tests for the in-memory backing store

use atrium_providers::BackingStore;
use atrium_providers::backing_store::InMemoryBackingStore;
use serde_json::json;

fn widgets() -> InMemoryBackingStore {
    let store = InMemoryBackingStore::new();
    store.upsert_many(
        "widgets",
        (1..=5).map(|id| json!({"id": id, "name": format!("Widget {id}")})),
    );
    store
}

#[tokio::test]
async fn test_paged_scan_walks_rows_in_order() {
    let store = widgets();
    let first = store.paged_scan("widgets", 0, 2).await.unwrap();
    let last = store.paged_scan("widgets", 2, 2).await.unwrap();
    let past_end = store.paged_scan("widgets", 3, 2).await.unwrap();

    assert_eq!(first.len(), 2);
    assert_eq!(first[0]["id"], 1);
    assert_eq!(last.len(), 1);
    assert_eq!(last[0]["id"], 5);
    assert!(past_end.is_empty());
    assert_eq!(store.calls().scans(), 3);
}

#[tokio::test]
async fn test_find_by_key_matches_numeric_ids() {
    let store = widgets();
    let row = store.find_by_key("widgets", "3").await.unwrap().unwrap();
    assert_eq!(row["name"], "Widget 3");
    assert!(store.find_by_key("widgets", "99").await.unwrap().is_none());
    assert_eq!(store.calls().finds(), 2);
}

#[tokio::test]
async fn test_find_many_skips_missing_ids() {
    let store = widgets();
    let ids = vec!["2".to_string(), "4".to_string(), "42".to_string()];
    let rows = store.find_many_by_keys("widgets", &ids).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(store.calls().bulk_finds(), 1);
}

#[tokio::test]
async fn test_upsert_replaces_and_delete_removes() {
    let store = widgets();
    store.upsert("widgets", json!({"id": 2, "name": "Renamed"}));
    assert_eq!(store.row_count("widgets"), 5);
    let row = store.find_by_key("widgets", "2").await.unwrap().unwrap();
    assert_eq!(row["name"], "Renamed");

    assert!(store.delete("widgets", "2"));
    assert!(!store.delete("widgets", "2"));
    assert_eq!(store.row_count("widgets"), 4);
}

#[tokio::test]
async fn test_reorder_changes_scan_order() {
    let store = widgets();
    store.reorder("widgets", &["5".to_string(), "1".to_string()]);
    let page = store.paged_scan("widgets", 0, 5).await.unwrap();
    let ids: Vec<i64> = page.iter().map(|r| r["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![5, 1, 2, 3, 4]);
}

#[tokio::test]
async fn test_failing_reads_surface_backing_store_errors() {
    let store = widgets();
    store.fail_reads("widgets");
    let err = store.find_by_key("widgets", "1").await.unwrap_err();
    assert!(err.is_backing_store());

    store.restore_reads("widgets");
    assert!(store.find_by_key("widgets", "1").await.unwrap().is_some());
}

#[test]
fn test_extract_primary_key() {
    let store = InMemoryBackingStore::new().with_primary_key_field("code");
    assert_eq!(
        store.extract_primary_key("widgets", &json!({"code": "W-1"})),
        Some(json!("W-1"))
    );
    assert_eq!(store.extract_primary_key("widgets", &json!({"id": 1})), None);
}
