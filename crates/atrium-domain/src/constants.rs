//! Domain constants
//!
//! Values shared by every layer. Infrastructure-only defaults live in
//! `atrium_infrastructure::constants`.

/// Default TTL applied when neither an override nor a policy TTL is set (5 minutes)
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Separator between region and id in a cache key (`Widget_7`)
pub const CACHE_KEY_SEPARATOR: &str = "_";

/// Default page size for startup bulk loads
pub const DEFAULT_LOAD_PAGE_SIZE: usize = 500;

/// Default capacity of the cache event broadcast channel
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 256;
