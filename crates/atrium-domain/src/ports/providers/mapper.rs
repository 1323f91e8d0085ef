//! Cache Mapper Port

use crate::error::Result;
use crate::ports::providers::BackingRow;
use crate::value_objects::CachePolicy;

/// Converts a backing-store row into the cached representation of a type
pub trait CacheMapper: Send + Sync {
    /// Build the cached JSON value for `policy.type_name` from `row`
    fn to_cache_representation(
        &self,
        row: &BackingRow,
        policy: &CachePolicy,
    ) -> Result<serde_json::Value>;
}

impl<F> CacheMapper for F
where
    F: Fn(&BackingRow, &CachePolicy) -> Result<serde_json::Value> + Send + Sync,
{
    fn to_cache_representation(
        &self,
        row: &BackingRow,
        policy: &CachePolicy,
    ) -> Result<serde_json::Value> {
        self(row, policy)
    }
}
