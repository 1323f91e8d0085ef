//! Provider Constants
//!
//! Defaults specific to provider implementations. Domain-wide values live in
//! `atrium_domain::constants`.

// ============================================================================
// CACHE PROVIDER CONSTANTS
// ============================================================================

/// Default maximum number of entries held by the local cache
pub const CACHE_DEFAULT_MAX_ENTRIES: u64 = 10_000;

/// Separator between key prefix, region and key in distributed keys
pub const CACHE_NAMESPACE_SEPARATOR: &str = ":";

/// Default prefix for every key written to Redis
pub const REDIS_DEFAULT_KEY_PREFIX: &str = "atrium";

/// Default Redis connection URL
pub const REDIS_DEFAULT_URL: &str = "redis://localhost:6379";

/// Keys requested per SCAN round trip
pub const REDIS_SCAN_BATCH_SIZE: usize = 500;

/// Timeout for establishing the Redis connection
pub const REDIS_CONNECT_TIMEOUT_SECS: u64 = 2;

// ============================================================================
// BACKING STORE CONSTANTS
// ============================================================================

/// Field holding the primary key in in-memory rows
pub const DEFAULT_PRIMARY_KEY_FIELD: &str = "id";
