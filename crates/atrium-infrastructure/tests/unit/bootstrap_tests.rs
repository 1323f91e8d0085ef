//! Tests for cache composition

use atrium_domain::{CachePolicy, CacheTiming, KeyKind};
use atrium_infrastructure::bootstrap::AtriumCache;
use atrium_infrastructure::config::CacheConfig;
use atrium_providers::backing_store::InMemoryBackingStore;
use serde_json::json;
use std::sync::Arc;

fn startup(type_name: &str, source: &str) -> CachePolicy {
    CachePolicy::new(type_name)
        .with_backing_source(source)
        .with_timing(CacheTiming::OnApplicationStart)
        .with_key_kind(KeyKind::Integer)
}

fn seeded_store() -> InMemoryBackingStore {
    let backing = InMemoryBackingStore::new();
    backing.upsert_many(
        "countries",
        (1..=3).map(|id| json!({"id": id, "name": format!("country {id}")})),
    );
    backing.upsert("currencies", json!({"id": 1, "code": "EUR"}));
    backing
}

#[test]
fn test_config_and_builder_policies_are_merged() {
    let mut config = CacheConfig::default();
    config.policies.push(CachePolicy::new("Country"));

    let cache = AtriumCache::builder(config)
        .policy(CachePolicy::new("Currency"))
        .build()
        .unwrap();

    let registry = cache.registry();
    assert!(registry.contains("Country"));
    assert!(registry.contains("Currency"));
    assert!(cache.sync().is_none());
    assert!(cache.hooks().is_none());
}

#[test]
fn test_duplicate_policy_fails_build() {
    let mut config = CacheConfig::default();
    config.policies.push(CachePolicy::new("Country"));

    let result = AtriumCache::builder(config)
        .policy(CachePolicy::new("Country"))
        .build();
    assert!(result.is_err());
}

#[tokio::test]
async fn test_start_loads_startup_types() {
    let cache = AtriumCache::builder(CacheConfig::default())
        .policy(startup("Country", "countries"))
        .backing_store(Arc::new(seeded_store()))
        .build()
        .unwrap();

    let report = cache.start().await;

    assert!(report.is_success());
    assert_eq!(report.loaded["Country"], 3);
    let cached = cache.facade().get_raw("Country", "2").await.unwrap();
    assert_eq!(cached, Some(json!({"id": 2, "name": "country 2"})));
    assert!(cache.hooks().is_some());
}

#[tokio::test]
async fn test_start_respects_load_on_start() {
    let mut config = CacheConfig::default();
    config.sync.load_on_start = false;
    let backing = seeded_store();

    let cache = AtriumCache::builder(config)
        .policy(startup("Country", "countries"))
        .backing_store(Arc::new(backing.clone()))
        .build()
        .unwrap();

    let report = cache.start().await;

    assert!(report.loaded.is_empty());
    assert_eq!(backing.calls().scans(), 0);
}

#[tokio::test]
async fn test_reload_policies_drops_removed_types_and_loads_new_ones() {
    let mut config = CacheConfig::default();
    config.policies.push(startup("Country", "countries"));
    let cache = AtriumCache::builder(config)
        .backing_store(Arc::new(seeded_store()))
        .build()
        .unwrap();
    cache.start().await;
    assert!(cache.facade().get_raw("Country", "1").await.unwrap().is_some());

    let report = cache
        .reload_policies(vec![startup("Currency", "currencies")])
        .await
        .unwrap();

    assert_eq!(report.loaded["Currency"], 1);
    assert!(!cache.registry().contains("Country"));
    assert_eq!(cache.facade().store().local().size().await.unwrap(), 1);
    assert_eq!(
        cache.facade().get_raw("Currency", "1").await.unwrap(),
        Some(json!({"id": 1, "code": "EUR"}))
    );
}

#[tokio::test]
async fn test_invalid_reload_keeps_current_policies() {
    let cache = AtriumCache::builder(CacheConfig::default())
        .policy(CachePolicy::new("Country"))
        .build()
        .unwrap();

    let result = cache
        .reload_policies(vec![CachePolicy::new("Country")])
        .await;

    assert!(result.is_err());
    assert!(cache.registry().contains("Country"));
    assert_eq!(cache.registry().len(), 1);
}

#[tokio::test]
async fn test_reload_policies_respects_load_on_start() {
    let mut config = CacheConfig::default();
    config.sync.load_on_start = false;
    let backing = seeded_store();
    let cache = AtriumCache::builder(config)
        .backing_store(Arc::new(backing.clone()))
        .build()
        .unwrap();

    let report = cache
        .reload_policies(vec![startup("Currency", "currencies")])
        .await
        .unwrap();

    assert!(report.loaded.is_empty());
    assert!(cache.registry().contains("Currency"));
    assert_eq!(backing.calls().scans(), 0);
    assert_eq!(cache.facade().get_raw("Currency", "1").await.unwrap(), None);
}
