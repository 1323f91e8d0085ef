//! Infrastructure layer constants
//!
//! Contains constants that are part of the infrastructure implementation.
//! Domain-specific constants are defined in `atrium_domain::constants`.

// ============================================================================
// CONFIGURATION CONSTANTS
// ============================================================================

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "atrium.toml";

/// Default configuration directory name
pub const DEFAULT_CONFIG_DIR: &str = "atrium";

/// Environment variable prefix for configuration
pub const CONFIG_ENV_PREFIX: &str = "ATRIUM";

/// Separator between nested keys in environment variables (`ATRIUM_CACHE__ENABLED`)
pub const CONFIG_ENV_SEPARATOR: &str = "__";

// ============================================================================
// LOGGING CONSTANTS
// ============================================================================

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Environment variable overriding the configured log filter
pub const LOG_ENV_VAR: &str = "ATRIUM_LOG";

/// File name stem used when the log file path has none
pub const DEFAULT_LOG_FILE_STEM: &str = "atrium";

// ============================================================================
// CACHE CONSTANTS
// ============================================================================

/// Default lifetime of local copies when a distributed tier is in use (seconds)
pub const LOCAL_CACHE_DEFAULT_FRONT_TTL_SECS: u64 = 30;
