//! Field access on document nodes, with missing fields reported as
//! [`MapperError::MissingRequiredField`].

use serde_json::{Map, Value};

use crate::core::types::Location;
use crate::error::MapperError;

/// Identifies the node being read, for error messages
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    pub entity: &'static str,
    pub key: &'a str,
}

impl<'a> NodeRef<'a> {
    #[must_use]
    pub fn new(entity: &'static str, key: &'a str) -> Self {
        Self { entity, key }
    }

    #[must_use]
    pub fn missing(&self, field: &str) -> MapperError {
        MapperError::missing(self.entity, self.key, field)
    }
}

/// A non-empty string field
///
/// # Errors
///
/// Returns `MissingRequiredField` if the field is absent, not a string, or empty.
pub fn required_str(node: &Value, field: &str, at: NodeRef<'_>) -> Result<String, MapperError> {
    non_empty_str(node, field).ok_or_else(|| at.missing(field))
}

/// A string field, kept as written (an empty string stays `Some("")`)
#[must_use]
pub fn optional_str(node: &Value, field: &str) -> Option<String> {
    node.get(field).and_then(Value::as_str).map(str::to_string)
}

/// A string field that must carry a value when present; empty reads as absent
#[must_use]
pub fn non_empty_str(node: &Value, field: &str) -> Option<String> {
    optional_str(node, field).filter(|s| !s.is_empty())
}

/// An array of strings; absent or non-array fields read as empty and
/// non-string entries are ignored
#[must_use]
pub fn string_list(node: &Value, field: &str) -> Vec<String> {
    node.get(field)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// An array of objects; absent fields read as empty
#[must_use]
pub fn object_list<'v>(node: &'v Value, field: &str) -> &'v [Value] {
    node.get(field)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// A required `{locationType, uri}` object at `node[field]`
///
/// # Errors
///
/// Returns `MissingRequiredField` if the field or its `uri` is absent.
pub fn required_location(
    node: &Value,
    field: &str,
    at: NodeRef<'_>,
) -> Result<Location, MapperError> {
    optional_location(node, field, at)?.ok_or_else(|| at.missing(field))
}

/// An optional location; present but without a `uri` is still an error
///
/// # Errors
///
/// Returns `MissingRequiredField` naming `field.uri` if the object has no uri.
pub fn optional_location(
    node: &Value,
    field: &str,
    at: NodeRef<'_>,
) -> Result<Option<Location>, MapperError> {
    let Some(location) = node.get(field).filter(|v| !v.is_null()) else {
        return Ok(None);
    };

    let uri = non_empty_str(location, "uri").ok_or_else(|| at.missing(&format!("{field}.uri")))?;
    Ok(Some(Location {
        location_type: optional_str(location, "locationType"),
        uri,
    }))
}

/// Serialize a location back into its document form
#[must_use]
pub fn location_value(location: &Location) -> Value {
    let mut map = Map::new();
    if let Some(location_type) = &location.location_type {
        map.insert("locationType".to_string(), Value::from(location_type.as_str()));
    }
    map.insert("uri".to_string(), Value::from(location.uri.as_str()));
    Value::Object(map)
}

/// Insert `key` only when `value` is present
pub fn insert_opt(map: &mut Map<String, Value>, key: &str, value: Option<Value>) {
    if let Some(value) = value {
        map.insert(key.to_string(), value);
    }
}

/// Insert a string list only when it is non-empty
pub fn insert_non_empty(map: &mut Map<String, Value>, key: &str, items: &[String]) {
    if !items.is_empty() {
        map.insert(key.to_string(), string_array(items));
    }
}

#[must_use]
pub fn string_array(items: &[String]) -> Value {
    Value::Array(items.iter().map(|s| Value::from(s.as_str())).collect())
}
