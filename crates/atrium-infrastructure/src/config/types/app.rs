//! Application configuration root

use super::{CacheConfig, LoggingConfig};
use serde::{Deserialize, Serialize};

/// Root of `atrium.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Logging
    pub logging: LoggingConfig,

    /// Cache
    pub cache: CacheConfig,
}
