//! # Infrastructure Layer
//!
//! Cross-cutting technical concerns that support the application and domain layers.
//! All cache backends live in `atrium-providers`; this crate wires them.
//!
//! ## Module Categories
//!
//! ### Configuration & Composition
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Figment loader: defaults, TOML file, `ATRIUM_` environment |
//! | [`cache`] | Backend factory (Moka, Redis, Null) |
//! | [`bootstrap`] | `AtriumCache` composition root |
//! | [`constants`] | Centralized configuration constants |
//!
//! ### Observability & Errors
//! | Module | Description |
//! |--------|-------------|
//! | [`logging`] | Structured logging with tracing |
//! | [`error_ext`] | Context extension for foreign errors |

pub mod bootstrap;
pub mod cache;
pub mod config;
pub mod constants;
pub mod error_ext;
pub mod logging;

// Re-export commonly used types
pub use bootstrap::{AtriumCache, AtriumCacheBuilder};
pub use cache::CacheBackendFactory;
pub use config::{AppConfig, CacheConfig, ConfigLoader, LoggingConfig};
pub use error_ext::ErrorContext;
pub use logging::init_logging;
