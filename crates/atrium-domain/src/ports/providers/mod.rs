//! External Provider Ports
//!
//! | Port | Description |
//! |------|-------------|
//! | CacheProvider | Cache backend (local or distributed) |
//! | BackingStore | Persistent store the cache is populated from |
//! | CacheMapper | Row to cached-value conversion |

/// Backing store port
pub mod backing_store;
/// Cache provider port
pub mod cache;
/// Mapper port
pub mod mapper;

pub use backing_store::{BackingRow, BackingStore};
pub use cache::{CacheEntryConfig, CacheProvider};
pub use mapper::CacheMapper;
