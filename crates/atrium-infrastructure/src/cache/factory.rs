//! Cache Backend Factory
//!
//! Builds the local and distributed cache providers from [`CacheConfig`].
//! All provider implementations come from `atrium-providers`; this factory
//! only handles wiring.

use crate::config::CacheConfig;
use atrium_application::CacheEntryStore;
use atrium_domain::error::Result;
use atrium_domain::ports::infrastructure::Clock;
use atrium_domain::ports::providers::CacheProvider;
use atrium_providers::cache::{MokaCacheProvider, NullCacheProvider, RedisCacheProvider};
use atrium_providers::constants::REDIS_DEFAULT_URL;
use std::sync::Arc;

/// Factory for cache backends
pub struct CacheBackendFactory;

impl CacheBackendFactory {
    /// Local tier: Moka, or Null when caching is disabled
    pub fn create_local(config: &CacheConfig) -> Arc<dyn CacheProvider> {
        Self::create_local_with_clock(config, None)
    }

    /// Local tier deciding expiry against `clock` when given
    pub fn create_local_with_clock(
        config: &CacheConfig,
        clock: Option<Arc<dyn Clock>>,
    ) -> Arc<dyn CacheProvider> {
        if !config.enabled {
            tracing::info!("cache disabled, using null provider");
            return Arc::new(NullCacheProvider::new());
        }
        let mut provider = MokaCacheProvider::with_capacity(config.local.max_entries)
            .with_default_ttl(config.default_ttl());
        if let Some(clock) = clock {
            provider = provider.with_clock(clock);
        }
        tracing::debug!(max_entries = config.local.max_entries, "local cache created");
        Arc::new(provider)
    }

    /// Distributed tier, `None` unless enabled
    ///
    /// No connection is opened here; Redis connects on first use.
    pub fn create_distributed(config: &CacheConfig) -> Result<Option<Arc<dyn CacheProvider>>> {
        if !config.uses_distributed() {
            return Ok(None);
        }
        let url = config
            .distributed
            .redis_url
            .as_deref()
            .unwrap_or(REDIS_DEFAULT_URL);
        let provider = RedisCacheProvider::new(url)?
            .with_key_prefix(config.distributed.key_prefix.clone())
            .with_default_ttl(config.default_ttl());
        tracing::info!(prefix = %config.distributed.key_prefix, "distributed cache configured");
        Ok(Some(Arc::new(provider)))
    }

    /// Entry store over the configured tiers
    pub fn create_entry_store(config: &CacheConfig) -> Result<CacheEntryStore> {
        Ok(Self::assemble(
            Self::create_local(config),
            Self::create_distributed(config)?,
            config,
        ))
    }

    /// Entry store over explicit tiers
    pub fn assemble(
        local: Arc<dyn CacheProvider>,
        distributed: Option<Arc<dyn CacheProvider>>,
        config: &CacheConfig,
    ) -> CacheEntryStore {
        let store = CacheEntryStore::new(local);
        match distributed {
            Some(distributed) => store.with_distributed(distributed, config.front_ttl()),
            None => store,
        }
    }
}
