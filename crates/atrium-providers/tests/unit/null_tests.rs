//! Tests for the null cache provider

use atrium_providers::CacheProvider;
use atrium_providers::cache::{CacheEntryConfig, NullCacheProvider};

#[tokio::test]
async fn test_null_provider_stores_nothing() {
    let cache = NullCacheProvider::new();
    cache
        .set_json("Widget", "Widget_1", "{}", CacheEntryConfig::new())
        .await
        .unwrap();

    assert!(cache.get_json("Widget", "Widget_1").await.unwrap().is_none());
    assert!(!cache.exists("Widget", "Widget_1").await.unwrap());
    assert!(!cache.delete("Widget", "Widget_1").await.unwrap());
    assert_eq!(cache.clear_region("Widget").await.unwrap(), 0);
    assert_eq!(cache.size().await.unwrap(), 0);
    assert_eq!(cache.provider_name(), "null");
}
