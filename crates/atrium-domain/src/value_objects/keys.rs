//! Cache key derivation and id coercion
//!
//! Every cacheable type owns one region. Entries in that region are keyed
//! `{region}_{canonical id}`, so `Widget` id `7` lives at `Widget_7`.

use crate::constants::CACHE_KEY_SEPARATOR;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared primary-key kind of a cacheable type
///
/// Ids arrive as strings from the write path and from bulk callers; the key
/// kind turns them into one canonical spelling so `"007"` and `"7"` hit the
/// same entry for integer keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyKind {
    /// Free-form text ids (must be non-empty)
    #[default]
    Text,
    /// Signed 64-bit integer ids
    Integer,
    /// UUID ids, canonicalized to lowercase hyphenated form
    Uuid,
}

impl KeyKind {
    /// Coerce a raw id into its canonical form
    pub fn coerce(&self, type_name: &str, raw: &str) -> Result<String> {
        let trimmed = raw.trim();
        match self {
            Self::Text => {
                if trimmed.is_empty() {
                    Err(Error::conversion(type_name, raw, "id cannot be empty"))
                } else {
                    Ok(raw.to_string())
                }
            }
            Self::Integer => trimmed
                .parse::<i64>()
                .map(|n| n.to_string())
                .map_err(|e| Error::conversion(type_name, raw, e.to_string())),
            Self::Uuid => uuid::Uuid::parse_str(trimmed)
                .map(|u| u.hyphenated().to_string())
                .map_err(|e| Error::conversion(type_name, raw, e.to_string())),
        }
    }

    /// Canonical id string for a JSON primary-key value taken from a row
    pub fn coerce_value(&self, type_name: &str, value: &serde_json::Value) -> Result<String> {
        match value {
            serde_json::Value::String(s) => self.coerce(type_name, s),
            serde_json::Value::Number(n) => self.coerce(type_name, &n.to_string()),
            other => Err(Error::conversion(
                type_name,
                other.to_string(),
                "primary key must be a string or a number",
            )),
        }
    }
}

/// Fully qualified cache location: region plus raw key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    /// Region (namespace) the entry lives in
    pub region: String,
    /// Raw key inside the backend
    pub key: String,
}

impl CacheKey {
    /// Build the key for `id` inside `region`
    pub fn for_entry(region: &str, canonical_id: &str) -> Self {
        Self {
            region: region.to_string(),
            key: format!("{region}{CACHE_KEY_SEPARATOR}{canonical_id}"),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.region, self.key)
    }
}
