//! Cache Provider Port
//!
//! Port for cache backend providers. Every entry lives in a region; providers
//! must be able to drop one region without touching the others.
//!
//! Implementations:
//!
//! - **Moka**: in-process front cache
//! - **Redis**: distributed cache shared between instances
//! - **Null**: no-op provider used when caching is disabled

use crate::error::Result;
use crate::value_objects::{CacheStats, Expiration, ExpirationMode};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Cache Entry Configuration
///
/// How one write should expire. A `None` TTL means the provider's own
/// default applies.
///
/// # Example
///
/// ```
/// use atrium_domain::ports::providers::CacheEntryConfig;
/// use std::time::Duration;
///
/// let config = CacheEntryConfig::new()
///     .with_ttl(Duration::from_secs(600))
///     .sliding();
/// assert!(config.is_sliding());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntryConfig {
    /// Time to live for the entry
    pub ttl: Option<Duration>,
    /// How the TTL is measured
    pub mode: ExpirationMode,
}

impl CacheEntryConfig {
    /// Absolute expiration with the provider default TTL
    pub fn new() -> Self {
        Self::default()
    }

    /// Config equivalent to a resolved expiration
    pub fn from_expiration(expiration: Expiration) -> Self {
        Self {
            ttl: Some(expiration.ttl),
            mode: expiration.mode,
        }
    }

    /// Set the TTL for the entry
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Set TTL in seconds
    pub fn with_ttl_secs(self, secs: u64) -> Self {
        self.with_ttl(Duration::from_secs(secs))
    }

    /// Renew the TTL on every read
    pub fn sliding(mut self) -> Self {
        self.mode = ExpirationMode::Sliding;
        self
    }

    /// Whether reads renew the TTL
    pub fn is_sliding(&self) -> bool {
        self.mode == ExpirationMode::Sliding
    }

    /// Resolve against a provider default TTL
    pub fn expiration(&self, default_ttl: Duration) -> Expiration {
        Expiration {
            ttl: self.ttl.unwrap_or(default_ttl),
            mode: self.mode,
        }
    }
}

/// Cache Provider Port
///
/// Region-partitioned JSON storage with TTL support. Values are opaque JSON
/// text; typed (de)serialization happens above this port.
#[async_trait]
pub trait CacheProvider: Send + Sync + std::fmt::Debug {
    /// Get a value as JSON text, `None` if absent or expired
    async fn get_json(&self, region: &str, key: &str) -> Result<Option<String>>;

    /// Like [`get_json`](Self::get_json), also returning how long the entry
    /// has left to live
    ///
    /// The lifetime is measured after any sliding renewal of this read.
    /// Providers that cannot tell return `None` for it.
    async fn get_json_with_ttl(
        &self,
        region: &str,
        key: &str,
    ) -> Result<Option<(String, Option<Duration>)>> {
        Ok(self.get_json(region, key).await?.map(|json| (json, None)))
    }

    /// Store JSON text under `key` in `region`
    async fn set_json(
        &self,
        region: &str,
        key: &str,
        value: &str,
        config: CacheEntryConfig,
    ) -> Result<()>;

    /// Delete a value; returns whether a live entry was removed
    async fn delete(&self, region: &str, key: &str) -> Result<bool>;

    /// Check if a live entry exists
    async fn exists(&self, region: &str, key: &str) -> Result<bool>;

    /// Drop every entry in `region`; returns how many were removed
    async fn clear_region(&self, region: &str) -> Result<u64>;

    /// Drop every entry this provider owns
    async fn clear(&self) -> Result<()>;

    /// Get cache statistics
    async fn stats(&self) -> Result<CacheStats>;

    /// Number of entries currently held
    async fn size(&self) -> Result<usize>;

    /// Provider identifier ("moka", "redis", "null")
    fn provider_name(&self) -> &str;
}
