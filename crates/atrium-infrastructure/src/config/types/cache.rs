//! Cache configuration types

use crate::constants::LOCAL_CACHE_DEFAULT_FRONT_TTL_SECS;
use atrium_domain::constants::{DEFAULT_CACHE_TTL_SECS, DEFAULT_LOAD_PAGE_SIZE};
use atrium_domain::value_objects::CachePolicy;
use atrium_providers::constants::{
    CACHE_DEFAULT_MAX_ENTRIES, REDIS_DEFAULT_KEY_PREFIX, REDIS_DEFAULT_URL,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Local (in-process) tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalCacheConfig {
    /// Maximum number of entries kept in memory
    pub max_entries: u64,

    /// Lifetime of local copies when a distributed tier is enabled (seconds)
    pub front_ttl_secs: u64,
}

impl Default for LocalCacheConfig {
    fn default() -> Self {
        Self {
            max_entries: CACHE_DEFAULT_MAX_ENTRIES,
            front_ttl_secs: LOCAL_CACHE_DEFAULT_FRONT_TTL_SECS,
        }
    }
}

/// Distributed (Redis) tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistributedCacheConfig {
    /// Use the distributed tier
    pub enabled: bool,

    /// Redis URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redis_url: Option<String>,

    /// Prefix of every Redis key
    pub key_prefix: String,
}

impl Default for DistributedCacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            redis_url: Some(REDIS_DEFAULT_URL.to_string()),
            key_prefix: REDIS_DEFAULT_KEY_PREFIX.to_string(),
        }
    }
}

/// Backing-store synchronization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Rows requested per page during startup loads
    pub page_size: usize,

    /// Bulk-load startup types when the cache starts
    pub load_on_start: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_LOAD_PAGE_SIZE,
            load_on_start: true,
        }
    }
}

/// Cache configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache enabled; when disabled every read misses
    pub enabled: bool,

    /// TTL for types whose policy declares none (seconds)
    pub default_ttl_secs: u64,

    /// Local tier
    pub local: LocalCacheConfig,

    /// Distributed tier
    pub distributed: DistributedCacheConfig,

    /// Backing-store synchronization
    pub sync: SyncConfig,

    /// Policies declared in configuration
    pub policies: Vec<CachePolicy>,
}

impl CacheConfig {
    /// Default TTL as a duration
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_secs)
    }

    /// Front TTL as a duration
    pub fn front_ttl(&self) -> Duration {
        Duration::from_secs(self.local.front_ttl_secs)
    }

    /// Whether writes also go to the distributed tier
    pub fn uses_distributed(&self) -> bool {
        self.enabled && self.distributed.enabled
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            local: LocalCacheConfig::default(),
            distributed: DistributedCacheConfig::default(),
            sync: SyncConfig::default(),
            policies: Vec::new(),
        }
    }
}
