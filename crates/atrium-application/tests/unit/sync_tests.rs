//! Tests for backing-store synchronization

use super::support::{on_demand_policy, row, startup_policy, sync_with};
use atrium_application::{ItemSyncReport, MapperRegistry, SetOptions};
use atrium_domain::CachePolicy;
use serde_json::json;

#[tokio::test]
async fn test_load_all_pages_through_every_row() {
    let (sync, backing) = sync_with(vec![startup_policy("Country", "countries")], MapperRegistry::new());
    backing.upsert_many("countries", (1..=5).map(|id| row(id, "country")));

    let report = sync.load_all().await;

    assert!(report.is_success());
    assert_eq!(report.loaded["Country"], 5);
    assert_eq!(backing.calls().scans(), 3);
    assert_eq!(
        sync.facade().get_raw("Country", "5").await.unwrap(),
        Some(row(5, "country"))
    );
}

#[tokio::test]
async fn test_load_all_stops_on_empty_page() {
    let (sync, backing) = sync_with(vec![startup_policy("Country", "countries")], MapperRegistry::new());
    backing.upsert_many("countries", (1..=4).map(|id| row(id, "country")));

    let report = sync.load_all().await;

    assert_eq!(report.total_loaded(), 4);
    assert_eq!(backing.calls().scans(), 3);
}

#[tokio::test]
async fn test_load_all_isolates_failing_types() {
    let (sync, backing) = sync_with(
        vec![
            startup_policy("Country", "countries"),
            startup_policy("Region", "regions"),
        ],
        MapperRegistry::new(),
    );
    backing.upsert_many("countries", (1..=3).map(|id| row(id, "country")));
    backing.upsert("regions", row(1, "north"));
    backing.fail_reads("regions");

    let report = sync.load_all().await;

    assert!(!report.is_success());
    assert_eq!(report.loaded["Country"], 3);
    assert!(report.failed.contains_key("Region"));
    assert_eq!(report.aborted, 0);
    assert_eq!(sync.facade().get_raw("Region", "1").await.unwrap(), None);
}

#[tokio::test]
async fn test_load_all_ignores_on_demand_types() {
    let (sync, backing) = sync_with(
        vec![on_demand_policy("Customer", "customers")],
        MapperRegistry::new(),
    );
    backing.upsert("customers", row(1, "ada"));

    let report = sync.load_all().await;

    assert!(report.loaded.is_empty());
    assert_eq!(backing.calls().scans(), 0);
}

#[tokio::test]
async fn test_load_skips_rows_without_primary_key() {
    let (sync, backing) = sync_with(vec![startup_policy("Country", "countries")], MapperRegistry::new());
    backing.upsert("countries", row(1, "country"));
    backing.upsert("countries", json!({"name": "nameless"}));
    backing.upsert("countries", json!({"id": "not-a-number"}));

    let report = sync.load_all().await;

    assert_eq!(report.loaded["Country"], 1);
}

#[tokio::test]
async fn test_load_applies_mapped_fields() {
    let policy = startup_policy("ProductCard", "products").with_mapped_fields(["id", "name"]);
    let (sync, backing) = sync_with(vec![policy], MapperRegistry::new());
    backing.upsert("products", row(4, "lamp"));

    sync.load_all().await;

    assert_eq!(
        sync.facade().get_raw("ProductCard", "4").await.unwrap(),
        Some(json!({"id": 4, "name": "lamp"}))
    );
}

#[tokio::test]
async fn test_manual_mapping_without_mapper_loads_nothing() {
    let policy = startup_policy("ProductPrice", "products").manual_mapping(true);
    let (sync, backing) = sync_with(vec![policy], MapperRegistry::new());
    backing.upsert("products", row(4, "lamp"));

    let report = sync.load_all().await;

    assert_eq!(report.loaded["ProductPrice"], 0);
    assert_eq!(backing.calls().scans(), 0);
}

#[tokio::test]
async fn test_get_or_create_reads_backing_store_once() {
    let (sync, backing) = sync_with(
        vec![on_demand_policy("Customer", "customers")],
        MapperRegistry::new(),
    );
    backing.upsert("customers", row(1, "ada"));

    for _ in 0..2 {
        let value = sync.get_or_create("Customer", "01", None).await.unwrap();
        assert_eq!(value, Some(row(1, "ada")));
    }
    assert_eq!(backing.calls().finds(), 1);
}

#[tokio::test]
async fn test_get_or_create_uses_supplied_row() {
    let (sync, backing) = sync_with(
        vec![on_demand_policy("Customer", "customers")],
        MapperRegistry::new(),
    );

    let value = sync
        .get_or_create("Customer", "2", Some(row(2, "grace")))
        .await
        .unwrap();

    assert_eq!(value, Some(row(2, "grace")));
    assert_eq!(backing.calls().finds(), 0);
}

#[tokio::test]
async fn test_get_or_create_does_not_cache_missing_rows() {
    let (sync, backing) = sync_with(
        vec![on_demand_policy("Customer", "customers")],
        MapperRegistry::new(),
    );

    for _ in 0..2 {
        assert_eq!(sync.get_or_create("Customer", "9", None).await.unwrap(), None);
    }
    assert_eq!(backing.calls().finds(), 2);
}

#[tokio::test]
async fn test_get_or_create_for_unbound_type_reads_cache_only() {
    let (sync, backing) = sync_with(vec![CachePolicy::new("Session")], MapperRegistry::new());
    sync.facade()
        .set_raw("Session", "s1", &json!({"user": 1}), SetOptions::new())
        .await
        .unwrap();

    assert_eq!(
        sync.get_or_create("Session", "s1", None).await.unwrap(),
        Some(json!({"user": 1}))
    );
    assert_eq!(sync.get_or_create("Session", "s2", None).await.unwrap(), None);
    assert_eq!(sync.get_or_create("Unknown", "1", None).await.unwrap(), None);
    assert_eq!(backing.calls().finds(), 0);
}

#[tokio::test]
async fn test_update_cache_for_items_uses_one_query() {
    let (sync, backing) = sync_with(vec![on_demand_policy("Product", "products")], MapperRegistry::new());
    backing.upsert_many("products", [row(1, "new one"), row(2, "new two")]);
    for id in ["1", "2", "3"] {
        sync.facade()
            .set_raw("Product", id, &json!("stale"), SetOptions::new())
            .await
            .unwrap();
    }

    let ids: Vec<String> = ["1", "2", "3", "02", "x"].iter().map(ToString::to_string).collect();
    let report = sync.update_cache_for_items("Product", &ids).await.unwrap();

    assert_eq!(report, ItemSyncReport { updated: 2, removed: 1 });
    assert_eq!(backing.calls().bulk_finds(), 1);
    assert_eq!(
        sync.facade().get_raw("Product", "2").await.unwrap(),
        Some(row(2, "new two"))
    );
    assert_eq!(sync.facade().get_raw("Product", "3").await.unwrap(), None);
}

#[tokio::test]
async fn test_update_cache_for_items_with_no_valid_ids_skips_query() {
    let (sync, backing) = sync_with(vec![on_demand_policy("Product", "products")], MapperRegistry::new());

    let report = sync
        .update_cache_for_items("Product", &["x".to_string()])
        .await
        .unwrap();

    assert_eq!(report, ItemSyncReport::default());
    assert_eq!(backing.calls().bulk_finds(), 0);
}

#[tokio::test]
async fn test_remove_respects_policy_flag() {
    let (sync, _) = sync_with(
        vec![
            on_demand_policy("Product", "products"),
            on_demand_policy("Archive", "archives").remove_on_delete(false),
        ],
        MapperRegistry::new(),
    );
    for type_name in ["Product", "Archive"] {
        sync.update(type_name, "1", &row(1, "kept")).await.unwrap();
    }

    assert!(sync.remove("Product", "1").await.unwrap());
    assert!(!sync.remove("Archive", "1").await.unwrap());
    assert!(sync.facade().contains_raw("Archive", "1").await.unwrap());
}

#[tokio::test]
async fn test_reload_replaces_region_contents() {
    let (sync, backing) = sync_with(vec![startup_policy("Country", "countries")], MapperRegistry::new());
    backing.upsert_many("countries", [row(1, "one"), row(2, "two")]);
    sync.load_all().await;

    backing.delete("countries", "2");
    backing.upsert("countries", row(3, "three"));
    let loaded = sync.reload_cache_for_type("Country").await.unwrap();

    assert_eq!(loaded, 2);
    assert_eq!(sync.facade().get_raw("Country", "2").await.unwrap(), None);
    assert!(sync.facade().contains_raw("Country", "3").await.unwrap());
    assert_eq!(sync.reload_cache_for_type("Unknown").await.unwrap(), 0);
}
