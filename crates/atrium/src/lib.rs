//! # Atrium Cache
//!
//! Policy-driven two-tier entity cache for admin back-offices.
//!
//! This crate provides the main public API. It re-exports the layer crates
//! so applications depend on one crate only.
//!
//! ## Features
//!
//! - **Per-type policies**: TTL, sliding or absolute expiry, key kind, startup loading
//! - **Two tiers**: Moka in-process front cache over an optional Redis tier
//! - **Single-flight loads**: one factory call per key under concurrent misses
//! - **Backing-store sync**: startup bulk loads and write-path refresh hooks
//!
//! ## Example
//!
//! ```
//! use atrium::{AtriumCache, CacheConfig, CachePolicy, CacheableType};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Clone, Serialize, Deserialize)]
//! struct Country {
//!     id: i64,
//!     name: String,
//! }
//!
//! impl CacheableType for Country {
//!     const TYPE_NAME: &'static str = "Country";
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let cache = AtriumCache::builder(CacheConfig::default())
//!     .policy(CachePolicy::for_type::<Country>().with_ttl_secs(300))
//!     .build()
//!     .unwrap();
//!
//! let country = cache
//!     .facade()
//!     .get_or_create::<Country, _, _>(
//!         "7",
//!         || async { Ok(Some(Country { id: 7, name: "Portugal".into() })) },
//!         None,
//!     )
//!     .await
//!     .unwrap();
//! assert_eq!(country.map(|c| c.name).as_deref(), Some("Portugal"));
//! # }
//! ```
//!
//! ## Architecture
//!
//! - `domain` - Policies, keys, expiration, errors and ports
//! - `application` - Entry store, typed facade, registry and sync manager
//! - `providers` - Moka, Redis and Null cache backends, in-memory backing store
//! - `infrastructure` - Configuration, logging and composition

/// Domain layer - policies, value objects and ports
///
/// Re-exports from the domain crate for convenience
pub mod domain {
    pub use atrium_domain::*;
}

/// Application layer - cache services
///
/// Re-exports from the application crate for convenience
pub mod application {
    pub use atrium_application::*;
}

/// Provider implementations
pub mod providers {
    pub use atrium_providers::*;
}

/// Infrastructure layer - config, logging and bootstrap
///
/// Re-exports from the infrastructure crate for convenience
pub mod infrastructure {
    pub use atrium_infrastructure::*;
}

// Re-export commonly used domain types at the crate root
pub use domain::*;

// Re-export cache services at the crate root
pub use application::{
    BackingStoreSyncManager, CacheEntryStore, CacheEventBus, CachePolicyRegistry, FieldCopyMapper,
    ItemSyncReport, LoadOutcome, LoadReport, MapperRegistry, PolicyHandle, SetOptions,
    TypedCacheFacade, WritePathHooks,
};

// Re-export the composition root and configuration
pub use infrastructure::{
    AppConfig, AtriumCache, AtriumCacheBuilder, CacheConfig, ConfigLoader, LoggingConfig,
    init_logging,
};
