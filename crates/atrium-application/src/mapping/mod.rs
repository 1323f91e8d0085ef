//! Row-to-cache mapping
//!
//! Types bound to a backing source are mapped with [`FieldCopyMapper`] unless
//! a mapper is registered for them. Types declaring `manual_mapping` must
//! register one; without it they are treated as unconfigured.

pub mod field_copy;
pub mod registry;

pub use field_copy::FieldCopyMapper;
pub use registry::MapperRegistry;
