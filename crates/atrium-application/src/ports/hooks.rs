//! Write-Path Hooks Port
//!
//! The CRUD layer calls these after it has committed a change to the backing
//! store. `entity_type` is the backing entity, not the cached type: one
//! entity may feed several cached types, each applying its own policy flags.

use async_trait::async_trait;
use atrium_domain::error::Result;
use atrium_domain::ports::providers::BackingRow;

/// Cache synchronization entry points for backing-store writes
#[async_trait]
pub trait WritePathHooks: Send + Sync {
    /// A row was inserted
    async fn on_entity_created(&self, entity_type: &str, id: &str, row: &BackingRow)
    -> Result<()>;

    /// A row was modified
    async fn on_entity_updated(&self, entity_type: &str, id: &str, row: &BackingRow)
    -> Result<()>;

    /// A row was deleted
    async fn on_entity_deleted(&self, entity_type: &str, id: &str) -> Result<()>;

    /// Rows were re-ordered; `sorted_ids` lists the affected ids in their new order
    async fn on_sort_changed(&self, entity_type: &str, sorted_ids: &[String]) -> Result<()>;
}
