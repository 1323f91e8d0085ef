//! Cache Bootstrap - composition root
//!
//! Wires configuration, policies, mappers, backends and the backing store
//! into one [`AtriumCache`] handle.
//!
//! ```text
//! CacheConfig + policies → CachePolicyRegistry → PolicyHandle ─┐
//! CacheConfig → CacheBackendFactory → CacheEntryStore ─────────┼→ TypedCacheFacade
//! BackingStore + MapperRegistry ───────────────────────────────┴→ BackingStoreSyncManager
//! ```
//!
//! ## Usage
//!
//! ```
//! use atrium_domain::CachePolicy;
//! use atrium_infrastructure::bootstrap::AtriumCacheBuilder;
//! use atrium_infrastructure::config::CacheConfig;
//!
//! let cache = AtriumCacheBuilder::new(CacheConfig::default())
//!     .policy(CachePolicy::new("Widget").with_ttl_secs(60))
//!     .build()?;
//! assert!(cache.registry().contains("Widget"));
//! # Ok::<(), atrium_domain::Error>(())
//! ```

use crate::cache::CacheBackendFactory;
use crate::config::{AppConfig, CacheConfig};
use atrium_application::{
    BackingStoreSyncManager, CacheEventBus, CachePolicyRegistry, LoadReport, MapperRegistry,
    PolicyHandle, TypedCacheFacade, WritePathHooks,
};
use atrium_domain::error::Result;
use atrium_domain::ports::infrastructure::Clock;
use atrium_domain::ports::providers::{BackingStore, CacheMapper, CacheProvider};
use atrium_domain::value_objects::{CachePolicy, CacheStats};
use std::sync::Arc;
use tracing::info;

/// Builder for [`AtriumCache`]
pub struct AtriumCacheBuilder {
    config: CacheConfig,
    policies: Vec<CachePolicy>,
    mappers: MapperRegistry,
    backing: Option<Arc<dyn BackingStore>>,
    local: Option<Arc<dyn CacheProvider>>,
    distributed: Option<Arc<dyn CacheProvider>>,
    clock: Option<Arc<dyn Clock>>,
    events: Option<CacheEventBus>,
}

impl AtriumCacheBuilder {
    /// Start from `config`; its policies are registered first
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            policies: Vec::new(),
            mappers: MapperRegistry::new(),
            backing: None,
            local: None,
            distributed: None,
            clock: None,
            events: None,
        }
    }

    /// Start from the cache section of `config`
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self::new(config.cache.clone())
    }

    /// Register a policy in addition to the configured ones
    pub fn policy(mut self, policy: CachePolicy) -> Self {
        self.policies.push(policy);
        self
    }

    /// Register several policies
    pub fn policies<I: IntoIterator<Item = CachePolicy>>(mut self, policies: I) -> Self {
        self.policies.extend(policies);
        self
    }

    /// Register the mapper of `type_name`
    pub fn mapper<S, M>(mut self, type_name: S, mapper: M) -> Self
    where
        S: Into<String>,
        M: CacheMapper + 'static,
    {
        self.mappers = self.mappers.register(type_name, mapper);
        self
    }

    /// Backing store used for loads and write-path sync
    pub fn backing_store(mut self, store: Arc<dyn BackingStore>) -> Self {
        self.backing = Some(store);
        self
    }

    /// Use `provider` as the local tier instead of the configured one
    pub fn local_provider(mut self, provider: Arc<dyn CacheProvider>) -> Self {
        self.local = Some(provider);
        self
    }

    /// Use `provider` as the distributed tier instead of the configured one
    pub fn distributed_provider(mut self, provider: Arc<dyn CacheProvider>) -> Self {
        self.distributed = Some(provider);
        self
    }

    /// Decide local expiry against `clock`
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Publish events on `events`
    pub fn event_bus(mut self, events: CacheEventBus) -> Self {
        self.events = Some(events);
        self
    }

    /// Validate the policies and compose the cache
    pub fn build(self) -> Result<AtriumCache> {
        let registry = build_registry(&self.config, self.policies.iter().cloned())?;
        let policies = PolicyHandle::new(registry);

        let local = match self.local {
            Some(local) => local,
            None => CacheBackendFactory::create_local_with_clock(&self.config, self.clock),
        };
        let distributed = match self.distributed {
            Some(distributed) => Some(distributed),
            None => CacheBackendFactory::create_distributed(&self.config)?,
        };
        let store = CacheBackendFactory::assemble(local, distributed, &self.config);

        let mut facade = TypedCacheFacade::new(store, policies);
        if let Some(events) = self.events {
            facade = facade.with_event_bus(events);
        }

        let sync = self.backing.map(|backing| {
            BackingStoreSyncManager::new(facade.clone(), backing, self.mappers)
                .with_page_size(self.config.sync.page_size)
        });

        info!(
            policies = facade.policies().current().len(),
            distributed = facade.store().distributed().is_some(),
            sync = sync.is_some(),
            "cache composed"
        );
        Ok(AtriumCache {
            config: Arc::new(self.config),
            extra_policies: Arc::new(self.policies),
            facade,
            sync,
        })
    }
}

fn build_registry<I>(config: &CacheConfig, extra: I) -> Result<CachePolicyRegistry>
where
    I: IntoIterator<Item = CachePolicy>,
{
    CachePolicyRegistry::builder()
        .default_ttl(config.default_ttl())
        .policies(config.policies.iter().cloned())
        .policies(extra)
        .build()
}

/// Composed cache: facade, policies and backing-store sync
#[derive(Clone)]
pub struct AtriumCache {
    config: Arc<CacheConfig>,
    extra_policies: Arc<Vec<CachePolicy>>,
    facade: TypedCacheFacade,
    sync: Option<BackingStoreSyncManager>,
}

impl AtriumCache {
    /// Start building a cache from `config`
    pub fn builder(config: CacheConfig) -> AtriumCacheBuilder {
        AtriumCacheBuilder::new(config)
    }

    /// Typed cache API
    pub fn facade(&self) -> &TypedCacheFacade {
        &self.facade
    }

    /// Backing-store sync, when a backing store was supplied
    pub fn sync(&self) -> Option<&BackingStoreSyncManager> {
        self.sync.as_ref()
    }

    /// Write-path hooks for the CRUD layer, when a backing store was supplied
    pub fn hooks(&self) -> Option<Arc<dyn WritePathHooks>> {
        self.sync
            .clone()
            .map(|sync| Arc::new(sync) as Arc<dyn WritePathHooks>)
    }

    /// Current policy registry
    pub fn registry(&self) -> Arc<CachePolicyRegistry> {
        self.facade.policies().current()
    }

    /// Cache configuration the cache was built from
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Facade statistics
    pub async fn stats(&self) -> Result<CacheStats> {
        self.facade.stats().await
    }

    /// Bulk-load startup types if configured to
    pub async fn start(&self) -> LoadReport {
        match &self.sync {
            Some(sync) if self.config.sync.load_on_start => sync.load_all().await,
            Some(_) => {
                info!("startup loading disabled");
                LoadReport::default()
            }
            None => {
                info!("no backing store configured, skipping startup load");
                LoadReport::default()
            }
        }
    }

    /// Replace the configured policies and reload affected regions
    ///
    /// Policies registered on the builder are kept. Regions of types that
    /// disappear are cleared. When startup loading is enabled, every startup
    /// type of the new set is reloaded.
    /// On a validation error the current policies stay in effect.
    pub async fn reload_policies(&self, policies: Vec<CachePolicy>) -> Result<LoadReport> {
        let mut config = (*self.config).clone();
        config.policies = policies;
        let registry = build_registry(&config, self.extra_policies.iter().cloned())?;
        let previous = self.facade.policies().replace(registry);
        let current = self.facade.policies().current();

        for policy in previous.policies() {
            if !current.contains(&policy.type_name) {
                let removed = self.facade.store().clear_region(policy.region()).await?;
                info!(type_name = %policy.type_name, removed, "dropped cache type");
            }
        }

        let mut report = LoadReport::default();
        let Some(sync) = &self.sync else {
            return Ok(report);
        };
        if !self.config.sync.load_on_start {
            info!(policies = current.len(), "cache policies reloaded, startup loading disabled");
            return Ok(report);
        }
        for policy in current.startup_types() {
            match sync.reload_cache_for_type(&policy.type_name).await {
                Ok(count) => {
                    report.loaded.insert(policy.type_name.clone(), count);
                }
                Err(e) => {
                    tracing::error!(type_name = %policy.type_name, error = %e, "reload failed");
                    report.failed.insert(policy.type_name.clone(), e.to_string());
                }
            }
        }
        info!(
            policies = current.len(),
            reloaded = report.total_loaded(),
            "cache policies reloaded"
        );
        Ok(report)
    }
}

impl std::fmt::Debug for AtriumCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AtriumCache")
            .field("facade", &self.facade)
            .field("sync", &self.sync.is_some())
            .finish_non_exhaustive()
    }
}
