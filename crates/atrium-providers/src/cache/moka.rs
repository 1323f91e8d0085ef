//! Moka in-memory cache provider
//!
//! Local front cache built on Moka. Each entry carries its own expiration so
//! absolute and sliding entries with different TTLs share one cache.
//!
//! Expiry is decided against an injected [`Clock`]; Moka's per-entry expiry
//! evicts the same entries in real time so memory is reclaimed even when
//! nobody reads them again.
//!
//! ## Example
//!
//! ```
//! use atrium_providers::cache::MokaCacheProvider;
//! use std::time::Duration;
//!
//! let provider = MokaCacheProvider::with_capacity(1_000)
//!     .with_default_ttl(Duration::from_secs(30));
//! assert_eq!(provider.max_entries(), 1_000);
//! ```

use super::stats::ProviderCounters;
use crate::constants::CACHE_DEFAULT_MAX_ENTRIES;
use async_trait::async_trait;
use atrium_domain::constants::DEFAULT_CACHE_TTL_SECS;
use atrium_domain::error::Result;
use atrium_domain::ports::infrastructure::{Clock, SystemClock};
use atrium_domain::ports::providers::{CacheEntryConfig, CacheProvider};
use atrium_domain::value_objects::{CacheStats, Expiration};
use chrono::{DateTime, Utc};
use moka::Expiry;
use moka::future::Cache;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{Duration, Instant};

type EntryId = (String, String);

#[derive(Debug)]
struct StoredEntry {
    json: String,
    expiration: Expiration,
    written_at: DateTime<Utc>,
    last_access_ms: AtomicI64,
}

impl StoredEntry {
    fn new(json: String, expiration: Expiration, now: DateTime<Utc>) -> Self {
        Self {
            json,
            expiration,
            written_at: now,
            last_access_ms: AtomicI64::new(now.timestamp_millis()),
        }
    }

    fn last_access(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.last_access_ms.load(Ordering::Acquire))
            .unwrap_or(self.written_at)
    }

    fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiration
            .is_expired_at(self.written_at, self.last_access(), now)
    }

    fn remaining_at(&self, now: DateTime<Utc>) -> Duration {
        (self
            .expiration
            .deadline(self.written_at, self.last_access())
            - now)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }

    fn touch(&self, now: DateTime<Utc>) {
        if self.expiration.is_sliding() {
            self.last_access_ms
                .fetch_max(now.timestamp_millis(), Ordering::AcqRel);
        }
    }
}

/// Real-time eviction mirroring each entry's own expiration
struct EntryExpiry;

impl Expiry<EntryId, Arc<StoredEntry>> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &EntryId,
        value: &Arc<StoredEntry>,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.expiration.ttl)
    }

    fn expire_after_read(
        &self,
        _key: &EntryId,
        value: &Arc<StoredEntry>,
        _read_at: Instant,
        duration_until_expiry: Option<Duration>,
        _last_modified_at: Instant,
    ) -> Option<Duration> {
        if value.expiration.is_sliding() {
            Some(value.expiration.ttl)
        } else {
            duration_until_expiry
        }
    }

    fn expire_after_update(
        &self,
        _key: &EntryId,
        value: &Arc<StoredEntry>,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.expiration.ttl)
    }
}

/// Moka-based in-memory cache provider
#[derive(Clone)]
pub struct MokaCacheProvider {
    cache: Cache<EntryId, Arc<StoredEntry>>,
    max_entries: u64,
    default_ttl: Duration,
    clock: Arc<dyn Clock>,
    counters: Arc<ProviderCounters>,
}

impl Default for MokaCacheProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MokaCacheProvider {
    /// Create a new Moka cache provider with default settings
    pub fn new() -> Self {
        Self::with_capacity(CACHE_DEFAULT_MAX_ENTRIES)
    }

    /// Create a new Moka cache provider holding at most `max_entries`
    pub fn with_capacity(max_entries: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .expire_after(EntryExpiry)
            .build();

        Self {
            cache,
            max_entries,
            default_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            clock: Arc::new(SystemClock),
            counters: Arc::new(ProviderCounters::default()),
        }
    }

    /// TTL used for writes that carry none
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Decide expiry against `clock` instead of wall-clock time
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Get the maximum capacity of the cache
    pub fn max_entries(&self) -> u64 {
        self.max_entries
    }

    fn entry_id(region: &str, key: &str) -> EntryId {
        (region.to_string(), key.to_string())
    }

    /// Live entry for `id`, dropping it if it expired
    async fn live_entry(&self, id: &EntryId) -> Option<Arc<StoredEntry>> {
        let entry = self.cache.get(id).await?;
        if entry.is_expired_at(self.clock.now()) {
            self.cache.invalidate(id).await;
            return None;
        }
        Some(entry)
    }
}

#[async_trait]
impl CacheProvider for MokaCacheProvider {
    async fn get_json(&self, region: &str, key: &str) -> Result<Option<String>> {
        Ok(self
            .get_json_with_ttl(region, key)
            .await?
            .map(|(json, _)| json))
    }

    async fn get_json_with_ttl(
        &self,
        region: &str,
        key: &str,
    ) -> Result<Option<(String, Option<Duration>)>> {
        let id = Self::entry_id(region, key);
        match self.live_entry(&id).await {
            Some(entry) => {
                let now = self.clock.now();
                entry.touch(now);
                self.counters.hit();
                Ok(Some((entry.json.clone(), Some(entry.remaining_at(now)))))
            }
            None => {
                self.counters.miss();
                Ok(None)
            }
        }
    }

    async fn set_json(
        &self,
        region: &str,
        key: &str,
        value: &str,
        config: CacheEntryConfig,
    ) -> Result<()> {
        let entry = StoredEntry::new(
            value.to_string(),
            config.expiration(self.default_ttl),
            self.clock.now(),
        );
        self.cache
            .insert(Self::entry_id(region, key), Arc::new(entry))
            .await;
        self.counters.set();
        Ok(())
    }

    async fn delete(&self, region: &str, key: &str) -> Result<bool> {
        let removed = self.cache.remove(&Self::entry_id(region, key)).await;
        let existed = removed.is_some_and(|entry| !entry.is_expired_at(self.clock.now()));
        if existed {
            self.counters.removed(1);
        }
        Ok(existed)
    }

    async fn exists(&self, region: &str, key: &str) -> Result<bool> {
        Ok(self
            .live_entry(&Self::entry_id(region, key))
            .await
            .is_some())
    }

    async fn clear_region(&self, region: &str) -> Result<u64> {
        let ids: Vec<EntryId> = self
            .cache
            .iter()
            .filter(|(id, _)| id.0 == region)
            .map(|(id, _)| (*id).clone())
            .collect();

        let mut removed = 0;
        for id in ids {
            if self.cache.remove(&id).await.is_some() {
                removed += 1;
            }
        }
        self.counters.removed(removed);
        tracing::debug!(region, removed, "cleared local cache region");
        Ok(removed)
    }

    async fn clear(&self) -> Result<()> {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
        Ok(())
    }

    async fn stats(&self) -> Result<CacheStats> {
        // Run pending tasks to ensure entry_count is accurate
        self.cache.run_pending_tasks().await;
        Ok(self.counters.snapshot(self.cache.entry_count()))
    }

    async fn size(&self) -> Result<usize> {
        self.cache.run_pending_tasks().await;
        Ok(usize::try_from(self.cache.entry_count()).unwrap_or(usize::MAX))
    }

    fn provider_name(&self) -> &str {
        "moka"
    }
}

impl std::fmt::Debug for MokaCacheProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaCacheProvider")
            .field("max_entries", &self.max_entries)
            .field("default_ttl", &self.default_ttl)
            .field("entries", &self.cache.entry_count())
            .finish_non_exhaustive()
    }
}
