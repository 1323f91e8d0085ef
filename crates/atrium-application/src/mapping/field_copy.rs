//! Default field-copy mapping

use atrium_domain::error::{Error, Result};
use atrium_domain::ports::providers::{BackingRow, CacheMapper};
use atrium_domain::value_objects::CachePolicy;
use serde_json::{Map, Value};

/// Copies the policy's `mapped_fields` from the row, or the whole row when
/// none are listed
///
/// Listed fields missing from the row are left out.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldCopyMapper;

impl CacheMapper for FieldCopyMapper {
    fn to_cache_representation(&self, row: &BackingRow, policy: &CachePolicy) -> Result<Value> {
        let Value::Object(fields) = row else {
            return Err(Error::invalid_argument(format!(
                "row for '{}' is not a JSON object",
                policy.type_name
            )));
        };
        if policy.mapped_fields.is_empty() {
            return Ok(row.clone());
        }
        let mapped: Map<String, Value> = policy
            .mapped_fields
            .iter()
            .filter_map(|field| fields.get(field).map(|v| (field.clone(), v.clone())))
            .collect();
        Ok(Value::Object(mapped))
    }
}
