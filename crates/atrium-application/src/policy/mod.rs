//! Cache policy registry

pub mod registry;

pub use registry::{CachePolicyRegistry, CachePolicyRegistryBuilder, PolicyHandle};
