//! Two-tier entry store with per-key single-flight loading
//!
//! The store owns one required local backend and an optional distributed
//! backend. Writes go to both; reads try the local tier first and back-fill it
//! from the distributed tier. When a distributed tier exists, local copies
//! are absolute entries living at most the front TTL, whatever the policy
//! mode, so reads fall through to the distributed tier at least that often.
//! That bounds how stale one instance can be relative to the others.
//!
//! Values are stored as JSON text in every backend.

use super::key_lock::{KeyLease, KeyLockTable};
use atrium_domain::error::Result;
use atrium_domain::ports::providers::{CacheEntryConfig, CacheProvider};
use atrium_domain::value_objects::{CacheKey, Expiration};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// How a get-or-create call was satisfied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome<T> {
    /// The value was already cached
    Hit(T),
    /// The factory produced the value and it was stored
    Loaded(T),
    /// The factory found nothing; nothing was stored
    Absent,
}

impl<T> LoadOutcome<T> {
    /// The value, if any
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Hit(value) | Self::Loaded(value) => Some(value),
            Self::Absent => None,
        }
    }

    /// Whether the value came from the cache
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit(_))
    }
}

/// Region-partitioned entry store over a local and an optional distributed tier
#[derive(Clone)]
pub struct CacheEntryStore {
    local: Arc<dyn CacheProvider>,
    distributed: Option<Arc<dyn CacheProvider>>,
    front_ttl: Duration,
    locks: KeyLockTable,
}

impl CacheEntryStore {
    /// Store backed only by `local`
    pub fn new(local: Arc<dyn CacheProvider>) -> Self {
        Self {
            local,
            distributed: None,
            front_ttl: Duration::MAX,
            locks: KeyLockTable::new(),
        }
    }

    /// Add a distributed tier; local entries then live at most `front_ttl`
    pub fn with_distributed(mut self, distributed: Arc<dyn CacheProvider>, front_ttl: Duration) -> Self {
        self.distributed = Some(distributed);
        self.front_ttl = front_ttl;
        self
    }

    /// View of this store that skips the distributed tier
    ///
    /// The view shares backends and locks with `self`.
    pub fn local_only(&self) -> Self {
        Self {
            local: Arc::clone(&self.local),
            distributed: None,
            front_ttl: Duration::MAX,
            locks: self.locks.clone(),
        }
    }

    /// Local backend
    pub fn local(&self) -> &Arc<dyn CacheProvider> {
        &self.local
    }

    /// Distributed backend, if configured
    pub fn distributed(&self) -> Option<&Arc<dyn CacheProvider>> {
        self.distributed.as_ref()
    }

    /// Per-key lock table
    pub fn locks(&self) -> &KeyLockTable {
        &self.locks
    }

    fn lock_id(key: &CacheKey) -> String {
        key.to_string()
    }

    /// Take the lock of `key`, waiting if needed
    pub async fn lease(&self, key: &CacheKey) -> KeyLease {
        self.locks.acquire(&Self::lock_id(key)).await
    }

    /// Take the lock of `key` only if it is free
    pub fn try_lease(&self, key: &CacheKey) -> Option<KeyLease> {
        self.locks.try_acquire(&Self::lock_id(key))
    }

    fn local_config(&self, expiration: Expiration) -> CacheEntryConfig {
        if self.distributed.is_some() {
            CacheEntryConfig::from_expiration(Expiration::absolute(expiration.ttl.min(self.front_ttl)))
        } else {
            CacheEntryConfig::from_expiration(expiration)
        }
    }

    /// Whether a live entry exists in any tier
    pub async fn exists(&self, key: &CacheKey) -> Result<bool> {
        if self.local.exists(&key.region, &key.key).await? {
            return Ok(true);
        }
        let Some(distributed) = &self.distributed else {
            return Ok(false);
        };
        match distributed.exists(&key.region, &key.key).await {
            Ok(found) => Ok(found),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "distributed cache unavailable, treating as miss");
                Ok(false)
            }
        }
    }

    /// Raw JSON text of `key`
    pub async fn get_json(&self, key: &CacheKey) -> Result<Option<String>> {
        if let Some(json) = self.local.get_json(&key.region, &key.key).await? {
            return Ok(Some(json));
        }
        let Some(distributed) = &self.distributed else {
            return Ok(None);
        };
        match distributed.get_json_with_ttl(&key.region, &key.key).await {
            Ok(Some((json, remaining))) => {
                // Never outlive the distributed entry
                let ttl = remaining.map_or(self.front_ttl, |left| left.min(self.front_ttl));
                if !ttl.is_zero() {
                    let front = CacheEntryConfig::from_expiration(Expiration::absolute(ttl));
                    if let Err(e) = self.local.set_json(&key.region, &key.key, &json, front).await
                    {
                        tracing::warn!(key = %key, error = %e, "failed to back-fill local cache");
                    }
                }
                Ok(Some(json))
            }
            Ok(None) => Ok(None),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "distributed cache unavailable, treating as miss");
                Ok(None)
            }
        }
    }

    /// Typed value of `key`
    pub async fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Result<Option<T>> {
        match self.get_json(key).await? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn write<T: Serialize + ?Sized>(
        &self,
        key: &CacheKey,
        value: &T,
        expiration: Expiration,
    ) -> Result<()> {
        let json = serde_json::to_string(value)?;
        if let Some(distributed) = &self.distributed {
            distributed
                .set_json(
                    &key.region,
                    &key.key,
                    &json,
                    CacheEntryConfig::from_expiration(expiration),
                )
                .await?;
        }
        self.local
            .set_json(&key.region, &key.key, &json, self.local_config(expiration))
            .await
    }

    /// Store `value` under `key` in every tier
    ///
    /// With `ignore_lock` the write skips the key lock; use it only when the
    /// caller already holds exclusivity for the key.
    pub async fn set<T: Serialize + ?Sized>(
        &self,
        key: &CacheKey,
        value: &T,
        expiration: Expiration,
        ignore_lock: bool,
    ) -> Result<()> {
        let _lease = if ignore_lock {
            None
        } else {
            Some(self.lease(key).await)
        };
        self.write(key, value, expiration).await
    }

    /// Remove `key` from every tier; returns whether any tier held it
    pub async fn remove(&self, key: &CacheKey, ignore_lock: bool) -> Result<bool> {
        let _lease = if ignore_lock {
            None
        } else {
            Some(self.lease(key).await)
        };
        let mut existed = false;
        if let Some(distributed) = &self.distributed {
            existed |= distributed.delete(&key.region, &key.key).await?;
        }
        existed |= self.local.delete(&key.region, &key.key).await?;
        Ok(existed)
    }

    /// Drop every entry of `region` in every tier
    ///
    /// Not serialized against in-flight loads: a load that finishes after the
    /// clear repopulates its key. Returns the number of entries removed across
    /// tiers.
    pub async fn clear_region(&self, region: &str) -> Result<u64> {
        let mut removed = 0;
        if let Some(distributed) = &self.distributed {
            removed += distributed.clear_region(region).await?;
        }
        removed += self.local.clear_region(region).await?;
        tracing::debug!(region, removed, "cleared cache region");
        Ok(removed)
    }

    /// Return the cached value of `key`, or build it once with `factory`
    ///
    /// Concurrent callers for the same key wait on the key lock while one of
    /// them runs the factory; they then observe the stored value. A factory
    /// returning `None` stores nothing. The lock is released on every exit,
    /// including factory errors and panics.
    pub async fn get_or_create<T, F, Fut>(
        &self,
        key: &CacheKey,
        expiration: Expiration,
        factory: F,
    ) -> Result<LoadOutcome<T>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<T>>>,
    {
        if let Some(value) = self.get(key).await? {
            return Ok(LoadOutcome::Hit(value));
        }

        let _lease = self.lease(key).await;

        if let Some(value) = self.get(key).await? {
            tracing::debug!(key = %key, "loaded by a concurrent caller");
            return Ok(LoadOutcome::Hit(value));
        }

        match factory().await? {
            Some(value) => {
                self.write(key, &value, expiration).await?;
                Ok(LoadOutcome::Loaded(value))
            }
            None => Ok(LoadOutcome::Absent),
        }
    }
}

impl std::fmt::Debug for CacheEntryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheEntryStore")
            .field("local", &self.local.provider_name())
            .field(
                "distributed",
                &self.distributed.as_ref().map(|d| d.provider_name()),
            )
            .field("front_ttl", &self.front_ttl)
            .field("locked_keys", &self.locks.len())
            .finish()
    }
}
