//! # Atrium Cache - Provider Implementations
//!
//! Concrete implementations of the ports defined in `atrium-domain`.
//!
//! | Category | Port | Implementations |
//! |----------|------|-----------------|
//! | Cache | `CacheProvider` | Moka, Redis, Null |
//! | Backing store | `BackingStore` | InMemory |
//!
//! ## Feature Flags
//!
//! ```toml
//! [dependencies]
//! atrium-providers = { version = "0.1", default-features = false, features = ["cache-moka"] }
//! ```

// Re-export domain types commonly used with providers
pub use atrium_domain::error::{Error, Result};
pub use atrium_domain::ports::providers::{BackingStore, CacheProvider};

/// Provider-specific constants
pub mod constants;

/// Cache provider implementations
///
/// Implements the `CacheProvider` trait for caching backends.
pub mod cache;

/// Backing store implementations
pub mod backing_store;
