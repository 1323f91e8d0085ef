//! Backing Store Implementations
//!
//! | Store | Description |
//! |-------|-------------|
//! | [`InMemoryBackingStore`] | Rows held in memory, for development and tests |

pub mod in_memory;

pub use in_memory::InMemoryBackingStore;
