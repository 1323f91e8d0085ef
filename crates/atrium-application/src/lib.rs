//! Application Layer - Atrium Cache
//!
//! Caching use cases built on the ports of `atrium-domain`.
//!
//! ## Architecture
//!
//! The application layer:
//! - Serializes loads per key so one factory call serves concurrent misses
//! - Resolves cacheable types to regions, TTLs and key kinds through policies
//! - Synchronizes cached types with the backing store
//! - Has no dependencies on concrete cache backends
//!
//! ## Modules
//!
//! - `cache`: key locks, the two-tier entry store and the typed facade
//! - `policy`: the policy registry and its reloadable handle
//! - `mapping`: row-to-cache mappers
//! - `sync`: startup loading and write-path refresh
//! - `ports`: hooks offered to the CRUD layer
//!
//! ## Dependencies
//!
//! This crate depends only on:
//! - `atrium-domain`: For policies, keys, ports and errors
//! - Pure Rust libraries for async, serialization, etc.

pub mod cache;
pub mod mapping;
pub mod policy;
pub mod ports;
pub mod sync;

pub use cache::{
    CacheEntryStore, CacheEventBus, KeyLease, KeyLockTable, LoadOutcome, SetOptions,
    TypedCacheFacade,
};
pub use mapping::{FieldCopyMapper, MapperRegistry};
pub use policy::{CachePolicyRegistry, CachePolicyRegistryBuilder, PolicyHandle};
pub use ports::WritePathHooks;
pub use sync::{BackingStoreSyncManager, ItemSyncReport, LoadReport};
