//! Cache Provider Implementations
//!
//! | Provider | Type | Description |
//! |----------|------|-------------|
//! | [`NullCacheProvider`] | Disabled | Stores nothing |
//! | [`MokaCacheProvider`] | Local | In-process front cache |
//! | [`RedisCacheProvider`] | Distributed | Shared between instances |
//!
//! - **Caching disabled**: `NullCacheProvider`
//! - **Single instance**: `MokaCacheProvider`
//! - **Multi instance**: `MokaCacheProvider` in front of `RedisCacheProvider`

#[cfg(feature = "cache-moka")]
pub mod moka;
pub mod null;
#[cfg(feature = "cache-redis")]
pub mod redis;
mod stats;

#[cfg(feature = "cache-moka")]
pub use moka::MokaCacheProvider;
pub use null::NullCacheProvider;
#[cfg(feature = "cache-redis")]
pub use redis::RedisCacheProvider;

// Re-export domain types used by cache providers
pub use atrium_domain::ports::providers::CacheEntryConfig;
pub use atrium_domain::value_objects::CacheStats;
