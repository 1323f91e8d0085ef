//! Per-type cache policy
//!
//! A policy is the declarative description of how one cacheable type is
//! cached: how long entries live, where the data comes from, whether the type
//! is bulk-loaded at startup, and which write-path events keep it in sync.
//!
//! Policies are plain data. They are registered explicitly during startup
//! composition, either through the builder methods below or deserialized from
//! the `[[cache.policies]]` section of the configuration file.

use crate::cacheable::CacheableType;
use crate::value_objects::{Expiration, ExpirationMode, KeyKind};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// When a type's entries are first populated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheTiming {
    /// Loaded lazily through get-or-create
    #[default]
    OnFirstAccess,
    /// Bulk-loaded from the backing store when the cache starts
    OnApplicationStart,
}

/// Caching policy for one cacheable type
///
/// # Example
///
/// ```
/// use atrium_domain::value_objects::{CachePolicy, CacheTiming};
///
/// let policy = CachePolicy::new("WidgetSummary")
///     .with_ttl_secs(120)
///     .with_backing_source("Widget")
///     .with_timing(CacheTiming::OnApplicationStart)
///     .reload_on_sort(true);
///
/// assert_eq!(policy.region(), "WidgetSummary");
/// assert!(policy.loads_on_start());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CachePolicy {
    /// Cacheable type tag
    pub type_name: String,
    /// Region prefix; defaults to the type name
    pub region_prefix: Option<String>,
    /// TTL in seconds; zero means "use the manager default"
    pub ttl_secs: u64,
    /// Renew the TTL on every read
    pub use_sliding_expiration: bool,
    /// Backing-store entity type the cached values are built from
    pub backing_source_type: Option<String>,
    /// Mapping is supplied by a registered mapper instead of field copy
    pub manual_mapping: bool,
    /// When entries are first populated
    pub cache_timing: CacheTiming,
    /// Cache rows as soon as they are created in the backing store
    pub cache_on_create: bool,
    /// Refresh entries when their backing row is edited
    pub update_on_edit: bool,
    /// Drop entries when their backing row is deleted
    pub remove_on_delete: bool,
    /// Reload the whole region when the backing rows are re-sorted
    pub reload_on_sort: bool,
    /// Also write through the distributed backend when one is configured
    pub use_distributed_backend: bool,
    /// Declared primary-key kind used to canonicalize ids
    pub key_kind: KeyKind,
    /// Fields copied by the default field-copy mapping (empty = all fields)
    pub mapped_fields: Vec<String>,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            type_name: String::new(),
            region_prefix: None,
            ttl_secs: 0,
            use_sliding_expiration: false,
            backing_source_type: None,
            manual_mapping: false,
            cache_timing: CacheTiming::OnFirstAccess,
            cache_on_create: false,
            update_on_edit: true,
            remove_on_delete: true,
            reload_on_sort: false,
            use_distributed_backend: true,
            key_kind: KeyKind::Text,
            mapped_fields: Vec::new(),
        }
    }
}

// Construction
impl CachePolicy {
    /// Create a policy with defaults for the given type tag
    pub fn new<S: Into<String>>(type_name: S) -> Self {
        Self {
            type_name: type_name.into(),
            ..Self::default()
        }
    }

    /// Create a policy for a [`CacheableType`]
    pub fn for_type<T: CacheableType>() -> Self {
        Self::new(T::TYPE_NAME)
    }

    /// Set a custom region prefix
    pub fn with_region_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.region_prefix = Some(prefix.into());
        self
    }

    /// Set the TTL in seconds (zero falls back to the manager default)
    pub fn with_ttl_secs(mut self, secs: u64) -> Self {
        self.ttl_secs = secs;
        self
    }

    /// Set the TTL, truncated to whole seconds
    pub fn with_ttl(self, ttl: Duration) -> Self {
        self.with_ttl_secs(ttl.as_secs())
    }

    /// Use sliding instead of absolute expiration
    pub fn sliding(mut self, enabled: bool) -> Self {
        self.use_sliding_expiration = enabled;
        self
    }

    /// Bind the type to a backing-store entity type
    pub fn with_backing_source<S: Into<String>>(mut self, source: S) -> Self {
        self.backing_source_type = Some(source.into());
        self
    }

    /// Require an explicitly registered mapper
    pub fn manual_mapping(mut self, enabled: bool) -> Self {
        self.manual_mapping = enabled;
        self
    }

    /// Set when entries are first populated
    pub fn with_timing(mut self, timing: CacheTiming) -> Self {
        self.cache_timing = timing;
        self
    }

    /// Toggle caching on create
    pub fn cache_on_create(mut self, enabled: bool) -> Self {
        self.cache_on_create = enabled;
        self
    }

    /// Toggle refresh on edit
    pub fn update_on_edit(mut self, enabled: bool) -> Self {
        self.update_on_edit = enabled;
        self
    }

    /// Toggle removal on delete
    pub fn remove_on_delete(mut self, enabled: bool) -> Self {
        self.remove_on_delete = enabled;
        self
    }

    /// Toggle region reload on re-sort
    pub fn reload_on_sort(mut self, enabled: bool) -> Self {
        self.reload_on_sort = enabled;
        self
    }

    /// Toggle use of the distributed backend
    pub fn use_distributed_backend(mut self, enabled: bool) -> Self {
        self.use_distributed_backend = enabled;
        self
    }

    /// Set the declared primary-key kind
    pub fn with_key_kind(mut self, kind: KeyKind) -> Self {
        self.key_kind = kind;
        self
    }

    /// Restrict default field-copy mapping to these fields
    pub fn with_mapped_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mapped_fields = fields.into_iter().map(Into::into).collect();
        self
    }
}

// Queries
impl CachePolicy {
    /// Region all entries of this type live in
    pub fn region(&self) -> &str {
        self.region_prefix
            .as_deref()
            .filter(|prefix| !prefix.is_empty())
            .unwrap_or(&self.type_name)
    }

    /// Policy TTL, `None` when the manager default applies
    pub fn ttl(&self) -> Option<Duration> {
        (self.ttl_secs > 0).then(|| Duration::from_secs(self.ttl_secs))
    }

    /// Expiration mode declared by the policy
    pub fn expiration_mode(&self) -> ExpirationMode {
        ExpirationMode::from_sliding(self.use_sliding_expiration)
    }

    /// Effective expiration given the manager-wide default TTL
    pub fn effective_expiration(&self, default_ttl: Duration) -> Expiration {
        Expiration {
            ttl: self.ttl().unwrap_or(default_ttl),
            mode: self.expiration_mode(),
        }
    }

    /// Backing-store binding, ignoring blank values
    pub fn backing_source(&self) -> Option<&str> {
        self.backing_source_type
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Whether the type is bulk-loaded at startup
    pub fn loads_on_start(&self) -> bool {
        self.cache_timing == CacheTiming::OnApplicationStart
    }

    /// Whether the default field-copy mapping applies
    pub fn uses_default_mapping(&self) -> bool {
        !self.manual_mapping && self.backing_source().is_some()
    }
}
