//! Cacheable type marker
//!
//! Typed callers describe their cached representation with [`CacheableType`].
//! The associated tag is what policies, regions and mappers are keyed by, so
//! the typed API and the tag-based JSON API address the same entries.

use serde::Serialize;
use serde::de::DeserializeOwned;

/// A type whose values can be stored in the cache
///
/// # Example
///
/// ```
/// use atrium_domain::CacheableType;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, Serialize, Deserialize)]
/// struct WidgetSummary {
///     id: i64,
///     name: String,
/// }
///
/// impl CacheableType for WidgetSummary {
///     const TYPE_NAME: &'static str = "WidgetSummary";
/// }
///
/// assert_eq!(WidgetSummary::TYPE_NAME, "WidgetSummary");
/// ```
pub trait CacheableType: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Type tag used for policy lookup, region naming and mapper lookup
    const TYPE_NAME: &'static str;
}
