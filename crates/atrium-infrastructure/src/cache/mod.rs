//! Cache backend wiring

pub mod factory;

pub use factory::CacheBackendFactory;
