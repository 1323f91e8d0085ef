//! Backing-store synchronization
//!
//! [`BackingStoreSyncManager`] fills the cache from the backing store at
//! startup and keeps entries current after writes. It implements
//! [`WritePathHooks`](crate::ports::WritePathHooks) so the CRUD layer can
//! notify it directly.

pub mod manager;

pub use manager::{BackingStoreSyncManager, ItemSyncReport, LoadReport};
