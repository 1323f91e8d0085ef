//! Expiration value objects
//!
//! Absolute expiration counts from the last write; sliding expiration counts
//! from the last access and is renewed on every read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How a TTL is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpirationMode {
    /// Fixed lifetime from write time
    #[default]
    Absolute,
    /// Lifetime resets on each access
    Sliding,
}

impl ExpirationMode {
    /// Pick the mode from a policy's sliding flag
    pub fn from_sliding(use_sliding: bool) -> Self {
        if use_sliding {
            Self::Sliding
        } else {
            Self::Absolute
        }
    }
}

/// A resolved TTL together with its mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expiration {
    /// Time to live
    pub ttl: Duration,
    /// How the TTL is measured
    pub mode: ExpirationMode,
}

impl Expiration {
    /// Absolute expiration after `ttl`
    pub fn absolute(ttl: Duration) -> Self {
        Self {
            ttl,
            mode: ExpirationMode::Absolute,
        }
    }

    /// Sliding expiration after `ttl` of inactivity
    pub fn sliding(ttl: Duration) -> Self {
        Self {
            ttl,
            mode: ExpirationMode::Sliding,
        }
    }

    /// Whether the TTL is renewed on reads
    pub fn is_sliding(&self) -> bool {
        self.mode == ExpirationMode::Sliding
    }

    /// Point in time after which an entry is expired.
    ///
    /// `last_access` is only consulted for sliding expiration.
    pub fn deadline(&self, written_at: DateTime<Utc>, last_access: DateTime<Utc>) -> DateTime<Utc> {
        let anchor = match self.mode {
            ExpirationMode::Absolute => written_at,
            ExpirationMode::Sliding => last_access.max(written_at),
        };
        chrono::Duration::from_std(self.ttl)
            .ok()
            .and_then(|ttl| anchor.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Whether an entry written at `written_at` and last read at `last_access`
    /// has expired at `now`
    pub fn is_expired_at(
        &self,
        written_at: DateTime<Utc>,
        last_access: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> bool {
        now >= self.deadline(written_at, last_access)
    }
}
