//! Displays and their renderers.
//!
//! A renderer is identified by its `type` and a renderer key (`"renderer"`
//! for the unnamed slot). Every other attribute is kept as an opaque
//! [`RendererPayload`] so renderer kinds can grow new options without the
//! mapper knowing about them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Key of the single unnamed renderer slot of a display
pub const DEFAULT_RENDERER_KEY: &str = "renderer";

/// A visual configuration attached to a track or an assembly's sequence
#[derive(Debug, Clone, PartialEq)]
pub struct Display {
    pub display_id: String,
    pub display_type: String,
    pub renderers: Vec<Renderer>,
}

/// One renderer of a display
#[derive(Debug, Clone, PartialEq)]
pub struct Renderer {
    /// `"renderer"` for the unnamed slot, otherwise the key under `renderers`
    pub key: String,
    pub renderer_type: String,
    pub payload: RendererPayload,
}

impl Renderer {
    #[must_use]
    pub fn is_unnamed(&self) -> bool {
        self.key == DEFAULT_RENDERER_KEY
    }
}

/// A renderer attribute value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RendererValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    List(Vec<RendererValue>),
    Map(BTreeMap<String, RendererValue>),
}

impl RendererValue {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<Value> for RendererValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => {
                Self::Map(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<RendererValue> for Value {
    fn from(value: RendererValue) -> Self {
        match value {
            RendererValue::Null => Value::Null,
            RendererValue::Bool(b) => Value::Bool(b),
            RendererValue::Number(n) => Value::Number(n),
            RendererValue::String(s) => Value::String(s),
            RendererValue::List(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            RendererValue::Map(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

/// Renderer attributes other than `type`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RendererPayload(pub BTreeMap<String, RendererValue>);

impl RendererPayload {
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<RendererValue>) {
        self.0.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&RendererValue> {
        self.0.get(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Attributes in key order, with null values left out
    pub fn non_null(&self) -> impl Iterator<Item = (&String, &RendererValue)> {
        self.0.iter().filter(|(_, value)| !value.is_null())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_conversion_preserves_types() {
        let original = json!({
            "height": 12,
            "ratio": 0.5,
            "showLabels": false,
            "color1": "jexl:get(feature,'strand')>0?'red':'blue'",
            "labels": {"name": "jexl:get(feature,'id')"},
            "palette": ["red", "blue"],
            "missing": null
        });

        let converted = RendererValue::from(original.clone());
        assert_eq!(Value::from(converted), original);
    }

    #[test]
    fn test_payload_json_text_roundtrip() {
        let mut payload = RendererPayload::default();
        payload.insert("height", RendererValue::Number(10.into()));
        payload.insert("color1", RendererValue::String("green".to_string()));
        payload.insert("outline", RendererValue::Null);

        let text = serde_json::to_string(&payload).unwrap();
        let decoded: RendererPayload = serde_json::from_str(&text).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn test_non_null_skips_nulls() {
        let mut payload = RendererPayload::default();
        payload.insert("height", RendererValue::Number(10.into()));
        payload.insert("outline", RendererValue::Null);

        let keys: Vec<_> = payload.non_null().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["height"]);
    }
}
