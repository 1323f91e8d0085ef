//! Domain Value Objects
//!
//! Immutable values describing how entries are keyed, how long they live and
//! how a cacheable type is synchronized with its backing store.
//!
//! | Value Object | Description |
//! |--------------|-------------|
//! | [`CachePolicy`] | Per-type caching policy |
//! | [`Expiration`] | Resolved TTL plus absolute/sliding mode |
//! | [`CacheKey`] | Region plus raw key of one entry |
//! | [`KeyKind`] | Declared primary-key kind used for id coercion |
//! | [`CacheStats`] | Hit/miss/write counters |

/// Expiration modes and resolved TTLs
pub mod expiration;
/// Cache key derivation and id coercion
pub mod keys;
/// Per-type cache policy
pub mod policy;
/// Cache statistics
pub mod stats;

pub use expiration::{Expiration, ExpirationMode};
pub use keys::{CacheKey, KeyKind};
pub use policy::{CachePolicy, CacheTiming};
pub use stats::CacheStats;
