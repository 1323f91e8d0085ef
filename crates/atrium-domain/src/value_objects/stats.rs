//! Cache statistics

use serde::{Deserialize, Serialize};

/// Cache Operation Statistics
///
/// Tracks cache activity: hits, misses, writes and removals.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CacheStats {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of values written
    pub sets: u64,
    /// Number of values removed
    pub removes: u64,
    /// Number of cache entries (when the backend can report it)
    pub entries: u64,
    /// Cache hit rate (0.0 to 1.0)
    pub hit_rate: f64,
}

impl CacheStats {
    /// Create empty cache statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Calculate hit rate from hits and misses
    #[allow(clippy::cast_precision_loss)]
    pub fn calculate_hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total > 0 {
            self.hits as f64 / total as f64
        } else {
            0.0
        }
    }

    /// Return a copy with `hit_rate` recomputed
    pub fn with_hit_rate(mut self) -> Self {
        self.hit_rate = self.calculate_hit_rate();
        self
    }
}
