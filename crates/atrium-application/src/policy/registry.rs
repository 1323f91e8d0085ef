//! Cache Policy Registry
//!
//! Index of every cacheable type's policy, built once during startup
//! composition. Lookups answer three questions:
//!
//! - how is type `T` cached (`policy`, `effective_expiration`)
//! - which types are bulk-loaded at startup (`startup_types`)
//! - which cached types depend on backing entity `E` (`affected_types`)
//!
//! The registry itself is immutable. [`PolicyHandle`] holds the current one
//! and swaps in a rebuilt registry atomically on reload.

use arc_swap::ArcSwap;
use atrium_domain::constants::DEFAULT_CACHE_TTL_SECS;
use atrium_domain::error::{Error, Result};
use atrium_domain::value_objects::{CachePolicy, Expiration};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// Immutable index of cache policies
#[derive(Debug, Clone)]
pub struct CachePolicyRegistry {
    policies: BTreeMap<String, CachePolicy>,
    by_source: BTreeMap<String, Vec<String>>,
    default_ttl: Duration,
}

impl CachePolicyRegistry {
    /// Start building a registry
    pub fn builder() -> CachePolicyRegistryBuilder {
        CachePolicyRegistryBuilder::default()
    }

    /// Registry with no policies; every type is inert
    pub fn empty() -> Self {
        Self {
            policies: BTreeMap::new(),
            by_source: BTreeMap::new(),
            default_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
        }
    }

    /// Policy of `type_name`
    pub fn policy(&self, type_name: &str) -> Option<&CachePolicy> {
        self.policies.get(type_name)
    }

    /// Whether `type_name` has a policy
    pub fn contains(&self, type_name: &str) -> bool {
        self.policies.contains_key(type_name)
    }

    /// Every cacheable type, sorted by name
    pub fn cacheable_types(&self) -> impl Iterator<Item = &str> {
        self.policies.keys().map(String::as_str)
    }

    /// All policies, sorted by type name
    pub fn policies(&self) -> impl Iterator<Item = &CachePolicy> {
        self.policies.values()
    }

    /// Manager-wide default TTL
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Expiration of entries of `policy`
    pub fn expiration_for(&self, policy: &CachePolicy) -> Expiration {
        policy.effective_expiration(self.default_ttl)
    }

    /// Expiration of entries of `type_name`, `None` when it has no policy
    pub fn effective_expiration(&self, type_name: &str) -> Option<Expiration> {
        self.policy(type_name).map(|p| self.expiration_for(p))
    }

    /// Types bulk-loaded at startup that have a backing-source binding
    pub fn startup_types(&self) -> Vec<&CachePolicy> {
        self.policies
            .values()
            .filter(|p| p.loads_on_start() && p.backing_source().is_some())
            .collect()
    }

    /// Cached types built from backing entity `entity_type`
    pub fn affected_types(&self, entity_type: &str) -> Vec<&CachePolicy> {
        self.by_source
            .get(entity_type)
            .map(|types| types.iter().filter_map(|t| self.policy(t)).collect())
            .unwrap_or_default()
    }

    /// Number of registered policies
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    /// Whether no policy is registered
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

impl Default for CachePolicyRegistry {
    fn default() -> Self {
        Self::empty()
    }
}

/// Builder for [`CachePolicyRegistry`]
#[derive(Debug, Clone)]
pub struct CachePolicyRegistryBuilder {
    policies: Vec<CachePolicy>,
    default_ttl: Duration,
}

impl Default for CachePolicyRegistryBuilder {
    fn default() -> Self {
        Self {
            policies: Vec::new(),
            default_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
        }
    }
}

impl CachePolicyRegistryBuilder {
    /// TTL for policies that declare none
    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Register one policy
    pub fn policy(mut self, policy: CachePolicy) -> Self {
        self.policies.push(policy);
        self
    }

    /// Register several policies
    pub fn policies<I: IntoIterator<Item = CachePolicy>>(mut self, policies: I) -> Self {
        self.policies.extend(policies);
        self
    }

    /// Validate and index the registered policies
    ///
    /// Fails on a zero default TTL, a blank type name or a type registered
    /// twice.
    pub fn build(self) -> Result<CachePolicyRegistry> {
        if self.default_ttl.is_zero() {
            return Err(Error::configuration("default cache TTL cannot be zero"));
        }

        let mut policies = BTreeMap::new();
        let mut by_source: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for mut policy in self.policies {
            let type_name = policy.type_name.trim().to_string();
            policy.type_name.clone_from(&type_name);
            if type_name.is_empty() {
                return Err(Error::configuration("cache policy has an empty type name"));
            }
            if policies.contains_key(&type_name) {
                return Err(Error::configuration(format!(
                    "duplicate cache policy for type '{type_name}'"
                )));
            }
            match policy.backing_source() {
                Some(source) => by_source
                    .entry(source.to_string())
                    .or_default()
                    .push(type_name.clone()),
                None if policy.loads_on_start() => {
                    tracing::warn!(
                        type_name,
                        "startup loading requested without a backing source; type will load on first access only"
                    );
                }
                None => {}
            }
            policies.insert(type_name, policy);
        }

        tracing::debug!(policies = policies.len(), "cache policy registry built");
        Ok(CachePolicyRegistry {
            policies,
            by_source,
            default_ttl: self.default_ttl,
        })
    }
}

/// Shared, atomically replaceable reference to the current registry
#[derive(Debug, Clone)]
pub struct PolicyHandle {
    current: Arc<ArcSwap<CachePolicyRegistry>>,
}

impl PolicyHandle {
    /// Handle starting at `registry`
    pub fn new(registry: CachePolicyRegistry) -> Self {
        Self {
            current: Arc::new(ArcSwap::from_pointee(registry)),
        }
    }

    /// Snapshot of the current registry
    pub fn current(&self) -> Arc<CachePolicyRegistry> {
        self.current.load_full()
    }

    /// Swap in `registry`, returning the previous one
    pub fn replace(&self, registry: CachePolicyRegistry) -> Arc<CachePolicyRegistry> {
        self.current.swap(Arc::new(registry))
    }
}

impl Default for PolicyHandle {
    fn default() -> Self {
        Self::new(CachePolicyRegistry::empty())
    }
}
