//! Cache event definitions

use serde::{Deserialize, Serialize};

/// Something observable happened to a cache entry or region
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CacheEvent {
    /// A lookup found a live entry
    Hit {
        /// Region the entry lives in
        region: String,
        /// Raw cache key
        key: String,
    },
    /// A lookup found nothing
    Miss {
        /// Region that was searched
        region: String,
        /// Raw cache key
        key: String,
    },
    /// An entry was written
    Set {
        /// Region the entry lives in
        region: String,
        /// Raw cache key
        key: String,
    },
    /// An entry was removed explicitly
    Removed {
        /// Region the entry lived in
        region: String,
        /// Raw cache key
        key: String,
    },
    /// Every entry in a region was dropped
    RegionCleared {
        /// The cleared region
        region: String,
    },
}

impl CacheEvent {
    /// Region the event refers to
    pub fn region(&self) -> &str {
        match self {
            Self::Hit { region, .. }
            | Self::Miss { region, .. }
            | Self::Set { region, .. }
            | Self::Removed { region, .. }
            | Self::RegionCleared { region } => region,
        }
    }

    /// Raw key the event refers to, if it concerns a single entry
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Hit { key, .. }
            | Self::Miss { key, .. }
            | Self::Set { key, .. }
            | Self::Removed { key, .. } => Some(key),
            Self::RegionCleared { .. } => None,
        }
    }
}
