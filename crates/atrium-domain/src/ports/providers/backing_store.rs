//! Backing Store Port
//!
//! The persistent source of truth the cache is populated from. Rows are
//! untyped JSON objects; the entity type names the table or collection.

use crate::error::Result;
use async_trait::async_trait;

/// One row read from the backing store
pub type BackingRow = serde_json::Value;

/// Read access to the persistent store behind the cache
#[async_trait]
pub trait BackingStore: Send + Sync {
    /// Read one page of rows of `entity_type` in a stable order
    ///
    /// An empty page ends a scan.
    async fn paged_scan(
        &self,
        entity_type: &str,
        page_index: usize,
        page_size: usize,
    ) -> Result<Vec<BackingRow>>;

    /// Find a single row by primary key
    async fn find_by_key(&self, entity_type: &str, id: &str) -> Result<Option<BackingRow>>;

    /// Find every row whose primary key is in `ids`, in one round trip
    ///
    /// Missing ids are simply absent from the result.
    async fn find_many_by_keys(&self, entity_type: &str, ids: &[String])
    -> Result<Vec<BackingRow>>;

    /// Primary-key value of a row, `None` when the row has none
    fn extract_primary_key(&self, entity_type: &str, row: &BackingRow)
    -> Option<serde_json::Value>;
}
