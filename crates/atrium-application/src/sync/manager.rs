//! Backing Store Sync Manager
//!
//! Keeps cached types consistent with the backing store:
//!
//! - startup bulk loads, one task per startup type, paging sequentially
//!   within each type
//! - get-or-create that falls back to the backing store on a true miss
//! - single and bulk refresh after writes, region reloads after re-sorts
//!
//! Types without a policy, without a backing source, or with manual mapping
//! and no registered mapper are left alone; operations on them are logged
//! no-ops rather than errors.

use crate::cache::{SetOptions, TypedCacheFacade};
use crate::mapping::MapperRegistry;
use crate::ports::WritePathHooks;
use async_trait::async_trait;
use atrium_domain::constants::DEFAULT_LOAD_PAGE_SIZE;
use atrium_domain::error::{Error, Result};
use atrium_domain::ports::providers::{BackingRow, BackingStore, CacheMapper};
use atrium_domain::value_objects::CachePolicy;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tokio::task::JoinSet;

/// Outcome of a startup bulk load
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Entries written per cached type
    pub loaded: BTreeMap<String, usize>,
    /// Error message per cached type whose load failed
    pub failed: BTreeMap<String, String>,
    /// Load tasks that panicked or were aborted
    pub aborted: usize,
}

impl LoadReport {
    /// Entries written across all types
    pub fn total_loaded(&self) -> usize {
        self.loaded.values().sum()
    }

    /// Whether every type loaded
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.aborted == 0
    }
}

/// Outcome of a bulk item refresh
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ItemSyncReport {
    /// Entries rewritten from found rows
    pub updated: usize,
    /// Entries dropped because their row is gone
    pub removed: usize,
}

/// A cached type together with everything needed to build its entries
struct Binding {
    policy: CachePolicy,
    source: String,
    mapper: Arc<dyn CacheMapper>,
}

/// Synchronizes cached types with the backing store
#[derive(Clone)]
pub struct BackingStoreSyncManager {
    facade: TypedCacheFacade,
    backing: Arc<dyn BackingStore>,
    mappers: Arc<MapperRegistry>,
    page_size: usize,
}

impl BackingStoreSyncManager {
    /// Create a sync manager writing through `facade`
    pub fn new(
        facade: TypedCacheFacade,
        backing: Arc<dyn BackingStore>,
        mappers: MapperRegistry,
    ) -> Self {
        Self {
            facade,
            backing,
            mappers: Arc::new(mappers),
            page_size: DEFAULT_LOAD_PAGE_SIZE,
        }
    }

    /// Rows requested per page during bulk loads
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Facade the manager writes through
    pub fn facade(&self) -> &TypedCacheFacade {
        &self.facade
    }

    /// Page size in use
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    fn binding_for(&self, policy: &CachePolicy) -> Option<Binding> {
        let Some(source) = policy.backing_source() else {
            tracing::debug!(type_name = %policy.type_name, "no backing source bound, skipping sync");
            return None;
        };
        let mapper = self.mappers.mapper_for(policy)?;
        Some(Binding {
            policy: policy.clone(),
            source: source.to_string(),
            mapper,
        })
    }

    fn binding(&self, type_name: &str) -> Option<Binding> {
        let registry = self.facade.policies().current();
        match registry.policy(type_name) {
            Some(policy) => self.binding_for(policy),
            None => {
                tracing::debug!(type_name, "no cache policy registered, skipping sync");
                None
            }
        }
    }

    async fn store_row(&self, binding: &Binding, id: &str, row: &BackingRow) -> Result<()> {
        let value = binding
            .mapper
            .to_cache_representation(row, &binding.policy)?;
        self.facade
            .set_raw(
                &binding.policy.type_name,
                id,
                &value,
                SetOptions::new().ignoring_lock(),
            )
            .await
    }

    fn row_id(&self, binding: &Binding, row: &BackingRow) -> Result<String> {
        let type_name = &binding.policy.type_name;
        let key = self
            .backing
            .extract_primary_key(&binding.source, row)
            .ok_or_else(|| Error::conversion(type_name, "<missing>", "row has no primary key"))?;
        binding.policy.key_kind.coerce_value(type_name, &key)
    }

    async fn load_binding(&self, binding: &Binding) -> Result<usize> {
        let type_name = binding.policy.type_name.as_str();
        let mut loaded = 0;
        let mut page = 0;
        loop {
            let rows = self
                .backing
                .paged_scan(&binding.source, page, self.page_size)
                .await?;
            let fetched = rows.len();
            for row in &rows {
                let id = match self.row_id(binding, row) {
                    Ok(id) => id,
                    Err(e) => {
                        tracing::warn!(type_name, error = %e, "skipping row without a usable primary key");
                        continue;
                    }
                };
                self.store_row(binding, &id, row).await?;
                loaded += 1;
            }
            if fetched < self.page_size {
                break;
            }
            page += 1;
        }
        tracing::info!(type_name, loaded, pages = page + 1, "cache type loaded");
        Ok(loaded)
    }

    async fn load_policy(&self, policy: &CachePolicy) -> Result<usize> {
        match self.binding_for(policy) {
            Some(binding) => self.load_binding(&binding).await,
            None => Ok(0),
        }
    }

    /// Bulk-load every startup type
    ///
    /// Types load in parallel; a failing type is reported and does not stop
    /// the others. Loads run to completion once started.
    pub async fn load_all(&self) -> LoadReport {
        let registry = self.facade.policies().current();
        let startup: Vec<CachePolicy> = registry.startup_types().into_iter().cloned().collect();
        tracing::info!(types = startup.len(), "starting cache bulk load");

        let mut tasks = JoinSet::new();
        for policy in startup {
            let manager = self.clone();
            tasks.spawn(async move {
                let result = manager.load_policy(&policy).await;
                (policy.type_name, result)
            });
        }

        let mut report = LoadReport::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((type_name, Ok(count))) => {
                    report.loaded.insert(type_name, count);
                }
                Ok((type_name, Err(e))) => {
                    tracing::error!(type_name, error = %e, "cache type load failed");
                    report.failed.insert(type_name, e.to_string());
                }
                Err(e) => {
                    tracing::error!(error = %e, "cache load task did not complete");
                    report.aborted += 1;
                }
            }
        }

        tracing::info!(
            loaded = report.total_loaded(),
            failed = report.failed.len(),
            "cache bulk load finished"
        );
        report
    }

    /// Cached value of `id`, loaded from `row` or the backing store on a miss
    ///
    /// A supplied `row` saves the store round trip. Without a binding only
    /// an already cached value is returned.
    pub async fn get_or_create(
        &self,
        type_name: &str,
        id: &str,
        row: Option<BackingRow>,
    ) -> Result<Option<Value>> {
        let Some(binding) = self.binding(type_name) else {
            return self.facade.get_raw(type_name, id).await;
        };
        let canonical = binding.policy.key_kind.coerce(type_name, id)?;
        let backing = Arc::clone(&self.backing);
        let lookup_id = canonical.clone();

        self.facade
            .get_or_create_raw(
                type_name,
                &canonical,
                move || async move {
                    let row = match row {
                        Some(row) => Some(row),
                        None => backing.find_by_key(&binding.source, &lookup_id).await?,
                    };
                    row.map(|row| binding.mapper.to_cache_representation(&row, &binding.policy))
                        .transpose()
                },
                None,
            )
            .await
    }

    /// Rebuild the entry of `id` from `row`, ignoring the key lock
    pub async fn update(&self, type_name: &str, id: &str, row: &BackingRow) -> Result<()> {
        match self.binding(type_name) {
            Some(binding) => self.store_row(&binding, id, row).await,
            None => Ok(()),
        }
    }

    /// Drop the entry of `id` if the policy removes on delete
    pub async fn remove(&self, type_name: &str, id: &str) -> Result<bool> {
        let registry = self.facade.policies().current();
        let Some(policy) = registry.policy(type_name) else {
            tracing::debug!(type_name, "no cache policy registered, skipping remove");
            return Ok(false);
        };
        if !policy.remove_on_delete {
            return Ok(false);
        }
        self.facade.remove_raw(type_name, id, false).await
    }

    /// Refresh several entries with one backing-store query
    ///
    /// Found rows are rewritten; ids whose row is gone are removed.
    /// Unconvertible ids are skipped.
    pub async fn update_cache_for_items(
        &self,
        type_name: &str,
        ids: &[String],
    ) -> Result<ItemSyncReport> {
        let mut report = ItemSyncReport::default();
        let Some(binding) = self.binding(type_name) else {
            return Ok(report);
        };

        let mut seen = HashSet::new();
        let mut canonical = Vec::with_capacity(ids.len());
        for raw in ids {
            match binding.policy.key_kind.coerce(type_name, raw) {
                Ok(id) => {
                    if seen.insert(id.clone()) {
                        canonical.push(id);
                    }
                }
                Err(e) => tracing::warn!(type_name, id = %raw, error = %e, "skipping id that cannot be converted"),
            }
        }
        if canonical.is_empty() {
            return Ok(report);
        }

        let rows = self
            .backing
            .find_many_by_keys(&binding.source, &canonical)
            .await?;
        let mut by_id = HashMap::with_capacity(rows.len());
        for row in rows {
            match self.row_id(&binding, &row) {
                Ok(id) => {
                    by_id.insert(id, row);
                }
                Err(e) => tracing::warn!(type_name, error = %e, "ignoring row without a usable primary key"),
            }
        }

        for id in canonical {
            match by_id.remove(&id) {
                Some(row) => {
                    self.store_row(&binding, &id, &row).await?;
                    report.updated += 1;
                }
                None => {
                    if self.remove(type_name, &id).await? {
                        report.removed += 1;
                    }
                }
            }
        }
        tracing::debug!(type_name, updated = report.updated, removed = report.removed, "items refreshed");
        Ok(report)
    }

    /// Clear the region of `type_name` and load it again from the backing store
    pub async fn reload_cache_for_type(&self, type_name: &str) -> Result<usize> {
        let registry = self.facade.policies().current();
        let Some(policy) = registry.policy(type_name) else {
            tracing::debug!(type_name, "no cache policy registered, skipping reload");
            return Ok(0);
        };
        self.facade.clear_region_for_type(type_name).await?;
        self.load_policy(policy).await
    }
}

/// Keep the first error, log the rest
fn keep_first(first: &mut Option<Error>, type_name: &str, hook: &str, result: Result<()>) {
    if let Err(e) = result {
        tracing::warn!(type_name, hook, error = %e, "cache sync failed");
        first.get_or_insert(e);
    }
}

fn finish(first: Option<Error>) -> Result<()> {
    first.map_or(Ok(()), Err)
}

#[async_trait]
impl WritePathHooks for BackingStoreSyncManager {
    async fn on_entity_created(
        &self,
        entity_type: &str,
        id: &str,
        row: &BackingRow,
    ) -> Result<()> {
        let registry = self.facade.policies().current();
        let mut first = None;
        for policy in registry.affected_types(entity_type) {
            if policy.cache_on_create {
                let result = self.update(&policy.type_name, id, row).await;
                keep_first(&mut first, &policy.type_name, "created", result);
            }
        }
        finish(first)
    }

    async fn on_entity_updated(
        &self,
        entity_type: &str,
        id: &str,
        row: &BackingRow,
    ) -> Result<()> {
        let registry = self.facade.policies().current();
        let mut first = None;
        for policy in registry.affected_types(entity_type) {
            if policy.update_on_edit {
                let result = self.update(&policy.type_name, id, row).await;
                keep_first(&mut first, &policy.type_name, "updated", result);
            }
        }
        finish(first)
    }

    async fn on_entity_deleted(&self, entity_type: &str, id: &str) -> Result<()> {
        let registry = self.facade.policies().current();
        let mut first = None;
        for policy in registry.affected_types(entity_type) {
            if policy.remove_on_delete {
                let result = self.remove(&policy.type_name, id).await.map(|_| ());
                keep_first(&mut first, &policy.type_name, "deleted", result);
            }
        }
        finish(first)
    }

    async fn on_sort_changed(&self, entity_type: &str, _sorted_ids: &[String]) -> Result<()> {
        let registry = self.facade.policies().current();
        let mut first = None;
        for policy in registry.affected_types(entity_type) {
            if !policy.reload_on_sort {
                continue;
            }
            let result = self
                .reload_cache_for_type(&policy.type_name)
                .await
                .map(|_| ());
            keep_first(&mut first, &policy.type_name, "sort_changed", result);
        }
        finish(first)
    }
}

impl std::fmt::Debug for BackingStoreSyncManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackingStoreSyncManager")
            .field("page_size", &self.page_size)
            .field("mappers", &self.mappers)
            .finish_non_exhaustive()
    }
}
