//! Domain Port Interfaces
//!
//! Boundary contracts between the cache core and the outside world.
//! High-level code depends on these traits; providers and infrastructure
//! implement them.
//!
//! - **providers/** - cache backends, the backing store and row mappers
//! - **infrastructure/** - cross-cutting services such as the clock

/// Infrastructure service ports
pub mod infrastructure;
/// External service provider ports
pub mod providers;

pub use infrastructure::{Clock, ManualClock, SystemClock};
pub use providers::{BackingRow, BackingStore, CacheEntryConfig, CacheMapper, CacheProvider};
