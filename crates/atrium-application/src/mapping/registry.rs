//! Mapper lookup per cacheable type

use super::FieldCopyMapper;
use atrium_domain::error::Result;
use atrium_domain::ports::providers::{BackingRow, CacheMapper};
use atrium_domain::value_objects::CachePolicy;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Explicitly registered mappers, keyed by cacheable type tag
#[derive(Clone)]
pub struct MapperRegistry {
    mappers: HashMap<String, Arc<dyn CacheMapper>>,
    fallback: Arc<dyn CacheMapper>,
}

impl MapperRegistry {
    /// Registry with only the field-copy fallback
    pub fn new() -> Self {
        Self {
            mappers: HashMap::new(),
            fallback: Arc::new(FieldCopyMapper),
        }
    }

    /// Register the mapper for `type_name`, replacing any previous one
    pub fn register<S, M>(mut self, type_name: S, mapper: M) -> Self
    where
        S: Into<String>,
        M: CacheMapper + 'static,
    {
        self.mappers.insert(type_name.into(), Arc::new(mapper));
        self
    }

    /// Whether `type_name` has an explicit mapper
    pub fn has_mapper(&self, type_name: &str) -> bool {
        self.mappers.contains_key(type_name)
    }

    /// Mapper for `policy`, `None` when the type cannot be mapped
    ///
    /// An explicit mapper always wins. Otherwise manual-mapping types and
    /// types without a backing source have no mapper.
    pub fn mapper_for(&self, policy: &CachePolicy) -> Option<Arc<dyn CacheMapper>> {
        if let Some(mapper) = self.mappers.get(&policy.type_name) {
            return Some(Arc::clone(mapper));
        }
        if policy.manual_mapping {
            tracing::warn!(
                type_name = %policy.type_name,
                "manual mapping declared but no mapper registered; type is not synchronized"
            );
            return None;
        }
        policy
            .uses_default_mapping()
            .then(|| Arc::clone(&self.fallback))
    }

    /// Map `row` for `policy`; `Ok(None)` when the type cannot be mapped
    pub fn map(&self, policy: &CachePolicy, row: &BackingRow) -> Result<Option<Value>> {
        self.mapper_for(policy)
            .map(|mapper| mapper.to_cache_representation(row, policy))
            .transpose()
    }
}

impl Default for MapperRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MapperRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<&str> = self.mappers.keys().map(String::as_str).collect();
        types.sort_unstable();
        f.debug_struct("MapperRegistry")
            .field("mapped_types", &types)
            .finish_non_exhaustive()
    }
}
