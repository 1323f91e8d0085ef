//! Typed cache facade
//!
//! Addresses entries by (cacheable type, id) instead of raw keys. The type's
//! policy decides the region, the TTL and whether the distributed tier is
//! used; the id is canonicalized with the policy's key kind, so the entry of
//! `Widget` id `7` always lives at `Widget_7`.
//!
//! Every operation exists twice: a typed form for callers that own a
//! [`CacheableType`], and a `*_raw` form addressed by type tag that carries
//! `serde_json::Value`s. Both reach the same entries.
//!
//! Types without a policy are inert: reads return `None`, writes and removes
//! do nothing and get-or-create simply calls the factory.

use super::entry_store::{CacheEntryStore, LoadOutcome};
use super::events::CacheEventBus;
use crate::policy::{CachePolicyRegistry, PolicyHandle};
use atrium_domain::error::Result;
use atrium_domain::events::CacheEvent;
use atrium_domain::value_objects::{CacheKey, CachePolicy, CacheStats, Expiration};
use atrium_domain::CacheableType;
use futures::future::join_all;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::broadcast::Receiver;

/// Options for a single write
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetOptions {
    /// TTL override; the policy TTL applies when `None`
    pub ttl: Option<Duration>,
    /// Skip the key lock (caller already holds exclusivity)
    pub ignore_lock: bool,
}

impl SetOptions {
    /// Locked write with the policy TTL
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the policy TTL
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Write without taking the key lock
    pub fn ignoring_lock(mut self) -> Self {
        self.ignore_lock = true;
        self
    }
}

#[derive(Debug, Default)]
struct FacadeCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    sets: AtomicU64,
    removes: AtomicU64,
}

/// Resolved location of one entry of a registered type
struct Placement {
    key: CacheKey,
    expiration: Expiration,
    store: CacheEntryStore,
}

/// Policy-driven cache API keyed by (type, id)
#[derive(Clone)]
pub struct TypedCacheFacade {
    store: CacheEntryStore,
    policies: PolicyHandle,
    events: CacheEventBus,
    counters: Arc<FacadeCounters>,
}

// Construction and accessors
impl TypedCacheFacade {
    /// Facade over `store` using the policies behind `policies`
    pub fn new(store: CacheEntryStore, policies: PolicyHandle) -> Self {
        Self {
            store,
            policies,
            events: CacheEventBus::default(),
            counters: Arc::new(FacadeCounters::default()),
        }
    }

    /// Publish events on `events` instead of a private bus
    pub fn with_event_bus(mut self, events: CacheEventBus) -> Self {
        self.events = events;
        self
    }

    /// Current policies
    pub fn policies(&self) -> &PolicyHandle {
        &self.policies
    }

    /// Underlying entry store
    pub fn store(&self) -> &CacheEntryStore {
        &self.store
    }

    /// Event bus
    pub fn events(&self) -> &CacheEventBus {
        &self.events
    }

    /// Subscribe to cache events
    pub fn subscribe(&self) -> Receiver<CacheEvent> {
        self.events.subscribe()
    }

    /// Counters plus the local entry count
    pub async fn stats(&self) -> Result<CacheStats> {
        let entries = self.store.local().size().await?;
        Ok(CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            sets: self.counters.sets.load(Ordering::Relaxed),
            removes: self.counters.removes.load(Ordering::Relaxed),
            entries: entries as u64,
            hit_rate: 0.0,
        }
        .with_hit_rate())
    }

    /// Cache key of `id` for `type_name`, `None` when the type has no policy
    pub fn key_for(&self, type_name: &str, id: &str) -> Result<Option<CacheKey>> {
        let registry = self.policies.current();
        Ok(self.place(&registry, type_name, id, None)?.map(|p| p.key))
    }
}

// Resolution and bookkeeping
impl TypedCacheFacade {
    fn store_for(&self, policy: &CachePolicy) -> CacheEntryStore {
        if policy.use_distributed_backend {
            self.store.clone()
        } else {
            self.store.local_only()
        }
    }

    fn place(
        &self,
        registry: &CachePolicyRegistry,
        type_name: &str,
        id: &str,
        ttl_override: Option<Duration>,
    ) -> Result<Option<Placement>> {
        let Some(policy) = registry.policy(type_name) else {
            tracing::debug!(type_name, "no cache policy registered, skipping cache");
            return Ok(None);
        };
        let id = policy.key_kind.coerce(type_name, id)?;
        let mut expiration = registry.expiration_for(policy);
        if let Some(ttl) = ttl_override.filter(|ttl| !ttl.is_zero()) {
            expiration.ttl = ttl;
        }
        Ok(Some(Placement {
            key: CacheKey::for_entry(policy.region(), &id),
            expiration,
            store: self.store_for(policy),
        }))
    }

    fn record_hit(&self, key: &CacheKey) {
        self.counters.hits.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(key = %key, "cache hit");
        self.events.publish(CacheEvent::Hit {
            region: key.region.clone(),
            key: key.key.clone(),
        });
    }

    fn record_miss(&self, key: &CacheKey) {
        self.counters.misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(key = %key, "cache miss");
        self.events.publish(CacheEvent::Miss {
            region: key.region.clone(),
            key: key.key.clone(),
        });
    }

    fn record_set(&self, key: &CacheKey) {
        self.counters.sets.fetch_add(1, Ordering::Relaxed);
        self.events.publish(CacheEvent::Set {
            region: key.region.clone(),
            key: key.key.clone(),
        });
    }

    fn record_removed(&self, key: &CacheKey) {
        self.counters.removes.fetch_add(1, Ordering::Relaxed);
        self.events.publish(CacheEvent::Removed {
            region: key.region.clone(),
            key: key.key.clone(),
        });
    }
}

// Operations shared by the typed and tag-based forms
impl TypedCacheFacade {
    async fn get_as<T: DeserializeOwned>(&self, type_name: &str, id: &str) -> Result<Option<T>> {
        let registry = self.policies.current();
        let Some(place) = self.place(&registry, type_name, id, None)? else {
            return Ok(None);
        };
        let value = place.store.get::<T>(&place.key).await?;
        if value.is_some() {
            self.record_hit(&place.key);
        } else {
            self.record_miss(&place.key);
        }
        Ok(value)
    }

    async fn contains_as(&self, type_name: &str, id: &str) -> Result<bool> {
        let registry = self.policies.current();
        match self.place(&registry, type_name, id, None)? {
            Some(place) => place.store.exists(&place.key).await,
            None => Ok(false),
        }
    }

    async fn set_as<T: Serialize + ?Sized>(
        &self,
        type_name: &str,
        id: &str,
        value: &T,
        options: SetOptions,
    ) -> Result<()> {
        let registry = self.policies.current();
        let Some(place) = self.place(&registry, type_name, id, options.ttl)? else {
            return Ok(());
        };
        place
            .store
            .set(&place.key, value, place.expiration, options.ignore_lock)
            .await?;
        self.record_set(&place.key);
        Ok(())
    }

    async fn remove_as(&self, type_name: &str, id: &str, ignore_lock: bool) -> Result<bool> {
        let registry = self.policies.current();
        let Some(place) = self.place(&registry, type_name, id, None)? else {
            return Ok(false);
        };
        let existed = place.store.remove(&place.key, ignore_lock).await?;
        if existed {
            self.record_removed(&place.key);
        }
        Ok(existed)
    }

    async fn get_or_create_as<T, F, Fut>(
        &self,
        type_name: &str,
        id: &str,
        factory: F,
        ttl: Option<Duration>,
    ) -> Result<Option<T>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<T>>>,
    {
        let registry = self.policies.current();
        let Some(place) = self.place(&registry, type_name, id, ttl)? else {
            return factory().await;
        };

        let outcome = place
            .store
            .get_or_create(&place.key, place.expiration, factory)
            .await?;
        match &outcome {
            LoadOutcome::Hit(_) => self.record_hit(&place.key),
            LoadOutcome::Loaded(_) => {
                self.record_miss(&place.key);
                self.record_set(&place.key);
            }
            LoadOutcome::Absent => self.record_miss(&place.key),
        }
        Ok(outcome.into_option())
    }

    async fn get_or_create_bulk_as<T, F, Fut>(
        &self,
        type_name: &str,
        ids: &[String],
        bulk_factory: F,
    ) -> Result<HashMap<String, T>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(Vec<String>) -> Fut,
        Fut: Future<Output = Result<HashMap<String, T>>>,
    {
        let registry = self.policies.current();
        let Some(policy) = registry.policy(type_name) else {
            let mut seen = HashSet::new();
            let unique: Vec<String> = ids
                .iter()
                .filter(|id| seen.insert(id.as_str()))
                .cloned()
                .collect();
            if unique.is_empty() {
                return Ok(HashMap::new());
            }
            return bulk_factory(unique).await;
        };
        let store = self.store_for(policy);
        let expiration = registry.expiration_for(policy);

        // Canonical, de-duplicated ids; unconvertible ones are skipped.
        let mut seen = HashSet::new();
        let mut requested = Vec::with_capacity(ids.len());
        for raw in ids {
            match policy.key_kind.coerce(type_name, raw) {
                Ok(id) => {
                    if seen.insert(id.clone()) {
                        let key = CacheKey::for_entry(policy.region(), &id);
                        requested.push((id, key));
                    }
                }
                Err(e) => {
                    tracing::warn!(type_name, id = %raw, error = %e, "skipping id that cannot be converted");
                }
            }
        }

        let mut found = HashMap::with_capacity(requested.len());
        let mut missing = Vec::new();
        for (id, key) in requested {
            match store.get::<T>(&key).await? {
                Some(value) => {
                    self.record_hit(&key);
                    found.insert(id, value);
                }
                None => missing.push((id, key)),
            }
        }
        if missing.is_empty() {
            return Ok(found);
        }

        let mut leases = Vec::with_capacity(missing.len());
        let mut load_now = Vec::new();
        let mut elsewhere = Vec::new();
        for (id, key) in missing {
            match store.try_lease(&key) {
                Some(lease) => {
                    leases.push(lease);
                    load_now.push((id, key));
                }
                None => elsewhere.push((id, key)),
            }
        }

        let mut to_load = Vec::with_capacity(load_now.len());
        for (id, key) in load_now {
            match store.get::<T>(&key).await? {
                Some(value) => {
                    self.record_hit(&key);
                    found.insert(id, value);
                }
                None => {
                    self.record_miss(&key);
                    to_load.push((id, key));
                }
            }
        }

        if !to_load.is_empty() {
            let load_ids: Vec<String> = to_load.iter().map(|(id, _)| id.clone()).collect();
            let wanted: HashMap<String, CacheKey> = to_load.into_iter().collect();
            let loaded = bulk_factory(load_ids).await?;
            for (raw_id, value) in loaded {
                let id = match policy.key_kind.coerce(type_name, &raw_id) {
                    Ok(id) => id,
                    Err(e) => {
                        tracing::warn!(type_name, id = %raw_id, error = %e, "bulk loader returned an unconvertible id");
                        continue;
                    }
                };
                let Some(key) = wanted.get(&id) else {
                    tracing::debug!(type_name, id, "bulk loader returned an id that was not requested");
                    continue;
                };
                store.set(key, &value, expiration, true).await?;
                self.record_set(key);
                found.insert(id, value);
            }
        }
        drop(leases);

        if !elsewhere.is_empty() {
            tracing::debug!(type_name, waiting = elsewhere.len(), "waiting for concurrent loads");
            let store_ref = &store;
            join_all(elsewhere.iter().map(|(_, key)| async move {
                drop(store_ref.lease(key).await);
            }))
            .await;
            for (id, key) in elsewhere {
                match store.get::<T>(&key).await? {
                    Some(value) => {
                        self.record_hit(&key);
                        found.insert(id, value);
                    }
                    None => {
                        tracing::debug!(key = %key, "concurrent load produced no value");
                        self.record_miss(&key);
                    }
                }
            }
        }

        Ok(found)
    }

    async fn clear_region_as(&self, type_name: &str) -> Result<u64> {
        let registry = self.policies.current();
        let Some(policy) = registry.policy(type_name) else {
            return Ok(0);
        };
        let region = policy.region();
        let removed = self.store_for(policy).clear_region(region).await?;
        self.events.publish(CacheEvent::RegionCleared {
            region: region.to_string(),
        });
        tracing::info!(type_name, region, removed, "cache region cleared");
        Ok(removed)
    }
}

// Typed API
impl TypedCacheFacade {
    /// Cached value of `id`
    pub async fn get<T: CacheableType>(&self, id: &str) -> Result<Option<T>> {
        self.get_as(T::TYPE_NAME, id).await
    }

    /// Cached value of `id`; backend and conversion errors are logged and read as `None`
    pub async fn try_get<T: CacheableType>(&self, id: &str) -> Option<T> {
        match self.get::<T>(id).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(type_name = T::TYPE_NAME, id, error = %e, "cache read failed");
                None
            }
        }
    }

    /// Whether a live entry exists for `id`
    pub async fn contains<T: CacheableType>(&self, id: &str) -> Result<bool> {
        self.contains_as(T::TYPE_NAME, id).await
    }

    /// Store `value` for `id`
    pub async fn set<T: CacheableType>(&self, id: &str, value: &T, options: SetOptions) -> Result<()> {
        self.set_as(T::TYPE_NAME, id, value, options).await
    }

    /// Remove the entry of `id`; returns whether it existed
    pub async fn remove<T: CacheableType>(&self, id: &str) -> Result<bool> {
        self.remove_as(T::TYPE_NAME, id, false).await
    }

    /// Cached value of `id`, built with `factory` on a miss
    ///
    /// Concurrent callers for the same id share one factory call. `ttl`
    /// overrides the policy TTL.
    pub async fn get_or_create<T, F, Fut>(
        &self,
        id: &str,
        factory: F,
        ttl: Option<Duration>,
    ) -> Result<Option<T>>
    where
        T: CacheableType,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<T>>>,
    {
        self.get_or_create_as(T::TYPE_NAME, id, factory, ttl).await
    }

    /// Values of every resolvable id, loading the missing ones with one `bulk_factory` call
    ///
    /// The result is keyed by canonical id. Ids that cannot be converted to
    /// the type's key kind are skipped.
    pub async fn get_or_create_bulk<T, F, Fut>(
        &self,
        ids: &[String],
        bulk_factory: F,
    ) -> Result<HashMap<String, T>>
    where
        T: CacheableType,
        F: FnOnce(Vec<String>) -> Fut,
        Fut: Future<Output = Result<HashMap<String, T>>>,
    {
        self.get_or_create_bulk_as(T::TYPE_NAME, ids, bulk_factory)
            .await
    }

    /// Drop every entry of `T`
    pub async fn clear_region_for<T: CacheableType>(&self) -> Result<u64> {
        self.clear_region_as(T::TYPE_NAME).await
    }
}

// Tag-based API
impl TypedCacheFacade {
    /// Cached JSON of `id` for `type_name`
    pub async fn get_raw(&self, type_name: &str, id: &str) -> Result<Option<Value>> {
        self.get_as(type_name, id).await
    }

    /// Cached JSON of `id`; errors are logged and read as `None`
    pub async fn try_get_raw(&self, type_name: &str, id: &str) -> Option<Value> {
        match self.get_raw(type_name, id).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(type_name, id, error = %e, "cache read failed");
                None
            }
        }
    }

    /// Whether a live entry exists for `id`
    pub async fn contains_raw(&self, type_name: &str, id: &str) -> Result<bool> {
        self.contains_as(type_name, id).await
    }

    /// Store JSON for `id`
    pub async fn set_raw(
        &self,
        type_name: &str,
        id: &str,
        value: &Value,
        options: SetOptions,
    ) -> Result<()> {
        self.set_as(type_name, id, value, options).await
    }

    /// Remove the entry of `id`; returns whether it existed
    pub async fn remove_raw(&self, type_name: &str, id: &str, ignore_lock: bool) -> Result<bool> {
        self.remove_as(type_name, id, ignore_lock).await
    }

    /// Cached JSON of `id`, built with `factory` on a miss
    pub async fn get_or_create_raw<F, Fut>(
        &self,
        type_name: &str,
        id: &str,
        factory: F,
        ttl: Option<Duration>,
    ) -> Result<Option<Value>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<Value>>>,
    {
        self.get_or_create_as(type_name, id, factory, ttl).await
    }

    /// JSON of every resolvable id, loading the missing ones with one `bulk_factory` call
    pub async fn get_or_create_bulk_raw<F, Fut>(
        &self,
        type_name: &str,
        ids: &[String],
        bulk_factory: F,
    ) -> Result<HashMap<String, Value>>
    where
        F: FnOnce(Vec<String>) -> Fut,
        Fut: Future<Output = Result<HashMap<String, Value>>>,
    {
        self.get_or_create_bulk_as(type_name, ids, bulk_factory)
            .await
    }

    /// Drop every entry of `type_name`; returns the number removed
    pub async fn clear_region_for_type(&self, type_name: &str) -> Result<u64> {
        self.clear_region_as(type_name).await
    }
}

impl std::fmt::Debug for TypedCacheFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedCacheFacade")
            .field("store", &self.store)
            .field("policies", &self.policies.current().len())
            .field("subscribers", &self.events.subscriber_count())
            .finish_non_exhaustive()
    }
}
