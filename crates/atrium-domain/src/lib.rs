//! # Atrium Cache - Domain Layer
//!
//! Policies, keys, expiration rules, error types and the ports every other
//! layer is written against. This crate has no runtime dependencies beyond
//! serialization and time handling.
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`value_objects`] | `CachePolicy`, `Expiration`, `CacheKey`, `KeyKind`, `CacheStats` |
//! | [`ports`] | `CacheProvider`, `BackingStore`, `CacheMapper`, `Clock` |
//! | [`events`] | `CacheEvent` |
//! | [`error`] | `Error` and `Result` |

/// Cacheable type marker trait
pub mod cacheable;
/// Domain constants
pub mod constants;
/// Error handling types
pub mod error;
/// Cache events
pub mod events;
/// Port interfaces
pub mod ports;
/// Value objects
pub mod value_objects;

pub use cacheable::CacheableType;
pub use error::{Error, Result};
pub use events::CacheEvent;
pub use value_objects::{
    CacheKey, CachePolicy, CacheStats, CacheTiming, Expiration, ExpirationMode, KeyKind,
};
