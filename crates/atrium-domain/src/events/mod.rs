//! Cache Events
//!
//! Facts published by the typed cache facade whenever it reads, writes or
//! evicts entries. Subscribers use them for diagnostics and admin views.

/// Cache event definitions
pub mod cache_events;

pub use cache_events::CacheEvent;
