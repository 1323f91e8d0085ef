//! Null cache provider
//!
//! Stores nothing. Used as the local tier when caching is disabled, which
//! turns every read into a pass-through to the backing store.

use async_trait::async_trait;
use atrium_domain::error::Result;
use atrium_domain::ports::providers::{CacheEntryConfig, CacheProvider};
use atrium_domain::value_objects::CacheStats;

/// Null cache provider that doesn't store anything
///
/// # Example
///
/// ```
/// use atrium_providers::cache::NullCacheProvider;
///
/// let provider = NullCacheProvider::new();
/// // All operations succeed but nothing is cached
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCacheProvider;

impl NullCacheProvider {
    /// Create a new null cache provider
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CacheProvider for NullCacheProvider {
    async fn get_json(&self, _region: &str, _key: &str) -> Result<Option<String>> {
        Ok(None)
    }

    async fn set_json(
        &self,
        _region: &str,
        _key: &str,
        _value: &str,
        _config: CacheEntryConfig,
    ) -> Result<()> {
        Ok(())
    }

    async fn delete(&self, _region: &str, _key: &str) -> Result<bool> {
        Ok(false)
    }

    async fn exists(&self, _region: &str, _key: &str) -> Result<bool> {
        Ok(false)
    }

    async fn clear_region(&self, _region: &str) -> Result<u64> {
        Ok(0)
    }

    async fn clear(&self) -> Result<()> {
        Ok(())
    }

    async fn stats(&self) -> Result<CacheStats> {
        Ok(CacheStats::new())
    }

    async fn size(&self) -> Result<usize> {
        Ok(0)
    }

    fn provider_name(&self) -> &str {
        "null"
    }
}
