//! Cache core
//!
//! | Type | Role |
//! |------|------|
//! | [`KeyLockTable`] | Per-key async locks with bounded slot table |
//! | [`CacheEntryStore`] | Two-tier JSON store with single-flight loading |
//! | [`TypedCacheFacade`] | Type/id addressed API driven by cache policies |
//! | [`CacheEventBus`] | Broadcast of hit/miss/set/remove events |

pub mod entry_store;
pub mod events;
pub mod key_lock;
pub mod typed;

pub use entry_store::{CacheEntryStore, LoadOutcome};
pub use events::CacheEventBus;
pub use key_lock::{KeyLease, KeyLockTable};
pub use typed::{SetOptions, TypedCacheFacade};
