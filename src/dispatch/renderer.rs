//! Renderer dispatch.
//!
//! Renderers differ only in their payload, which is stored opaquely, so any
//! renderer with a `type` round-trips whether or not the mapper knows the
//! kind. A display holds either a single unnamed `renderer` or a
//! `renderers` map keyed by renderer key.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::core::display::{Renderer, RendererPayload, RendererValue, DEFAULT_RENDERER_KEY};
use crate::core::types::Resolution;
use crate::error::MapperError;
use crate::store::rows::DisplayRendererRow;

/// Attributes that never go into the stored payload
const RESERVED_KEYS: [&str; 2] = ["type", "key"];

/// The renderer nodes of a display as `(renderer key, node)`, the unnamed
/// slot first, then the named ones in document order
#[must_use]
pub fn renderer_nodes(display: &Value) -> Vec<(String, &Value)> {
    let mut nodes = Vec::new();
    if let Some(node) = display.get(DEFAULT_RENDERER_KEY).filter(|v| !v.is_null()) {
        nodes.push((DEFAULT_RENDERER_KEY.to_string(), node));
    }
    if let Some(named) = display.get("renderers").and_then(Value::as_object) {
        nodes.extend(named.iter().map(|(key, node)| (key.clone(), node)));
    }
    nodes
}

/// Dispatch one renderer node
///
/// A renderer without a `type` is skipped with a warning and an empty
/// `type_tag`; it never fails the run.
#[must_use]
pub fn import(node: &Value, key: &str, display_id: &str) -> Resolution<Renderer> {
    let Some(type_tag) = node
        .get("type")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
    else {
        warn!(display_id = %display_id, renderer_key = %key, "Skipping renderer without a type");
        return Resolution::Skipped {
            type_tag: String::new(),
        };
    };

    let mut payload = RendererPayload::default();
    if let Some(attributes) = node.as_object() {
        for (name, value) in attributes {
            if !RESERVED_KEYS.contains(&name.as_str()) {
                payload.insert(name.as_str(), RendererValue::from(value.clone()));
            }
        }
    }

    Resolution::Resolved(Renderer {
        key: key.to_string(),
        renderer_type: type_tag.to_string(),
        payload,
    })
}

/// Rebuild one renderer node from a joined display row
///
/// Returns `Ok(None)` for the all-null row of a display without renderers.
/// Null payload values are dropped.
///
/// # Errors
///
/// Returns `MissingRequiredField` for a stored renderer whose type is null
/// or empty.
pub fn export(row: &DisplayRendererRow) -> Result<Option<(String, Value)>, MapperError> {
    if row.renderer_row_id.is_none() {
        debug!(display_id = %row.display_id, "Display row has no renderer");
        return Ok(None);
    }
    let Some(type_tag) = row.renderer_type.as_deref().filter(|s| !s.is_empty()) else {
        return Err(MapperError::missing("renderer", row.display_id.as_str(), "type"));
    };

    let mut node = Map::new();
    node.insert("type".to_string(), Value::from(type_tag));
    if let Some(payload) = &row.renderer_details {
        for (name, value) in payload.non_null() {
            node.insert(name.clone(), Value::from(value.clone()));
        }
    }

    let key = row
        .renderer_key
        .clone()
        .unwrap_or_else(|| DEFAULT_RENDERER_KEY.to_string());
    Ok(Some((key, Value::Object(node))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(key: Option<&str>, renderer_type: Option<&str>, details: Value) -> DisplayRendererRow {
        let payload = match details {
            Value::Null => None,
            other => Some(RendererPayload(
                other
                    .as_object()
                    .unwrap()
                    .iter()
                    .map(|(k, v)| (k.clone(), RendererValue::from(v.clone())))
                    .collect(),
            )),
        };
        DisplayRendererRow {
            display_row_id: 1,
            parent_id: 1,
            display_id: "genes-LinearBasicDisplay".to_string(),
            display_type: "LinearBasicDisplay".to_string(),
            renderer_row_id: renderer_type.map(|_| 1),
            renderer_key: key.map(str::to_string),
            renderer_type: renderer_type.map(str::to_string),
            renderer_details: payload,
        }
    }

    #[test]
    fn test_renderer_nodes_order() {
        let display = json!({
            "type": "LinearBasicDisplay",
            "renderer": {"type": "SvgFeatureRenderer"},
            "renderers": {
                "color": {"type": "SvgFeatureRenderer"},
                "height": {"type": "CanvasFeatureRenderer"}
            }
        });
        let keys: Vec<_> = renderer_nodes(&display).into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["renderer", "color", "height"]);
    }

    #[test]
    fn test_import_strips_type_and_key() {
        let node = json!({
            "type": "SvgFeatureRenderer",
            "key": "leftover",
            "height": 12,
            "showLabels": false,
            "color1": "goldenrod"
        });
        let renderer = import(&node, "renderer", "genes-LinearBasicDisplay")
            .resolved()
            .unwrap();

        assert!(renderer.is_unnamed());
        assert_eq!(renderer.renderer_type, "SvgFeatureRenderer");
        assert_eq!(renderer.payload.len(), 3);
        assert!(renderer.payload.get("key").is_none());
        assert!(renderer.payload.get("type").is_none());
        assert_eq!(
            renderer.payload.get("showLabels"),
            Some(&RendererValue::Bool(false))
        );
    }

    #[test]
    fn test_import_keeps_unrecognized_renderer_types() {
        let node = json!({"type": "LinearManhattanRenderer", "color": "red"});
        let renderer = import(&node, "renderer", "gwas-LinearManhattanDisplay")
            .resolved()
            .unwrap();
        assert_eq!(renderer.renderer_type, "LinearManhattanRenderer");
        assert_eq!(
            renderer.payload.get("color"),
            Some(&RendererValue::from(json!("red")))
        );
    }

    #[test]
    fn test_import_untyped_is_skipped() {
        assert!(import(&json!({"height": 3}), "renderer", "d").is_skipped());
        assert!(import(&json!({"type": null}), "renderer", "d").is_skipped());
        assert!(import(&json!({"type": ""}), "renderer", "d").is_skipped());
    }

    #[test]
    fn test_export_drops_null_values() {
        let exported = export(&row(
            Some("renderer"),
            Some("SvgFeatureRenderer"),
            json!({"height": 10, "color2": null}),
        ))
        .unwrap()
        .unwrap();
        assert_eq!(
            exported,
            (
                "renderer".to_string(),
                json!({"type": "SvgFeatureRenderer", "height": 10})
            )
        );
    }

    #[test]
    fn test_export_null_renderer_row() {
        assert_eq!(export(&row(None, None, Value::Null)).unwrap(), None);
    }

    #[test]
    fn test_export_stored_renderer_without_type_is_an_error() {
        let mut untyped = row(Some("color"), None, json!({"height": 4}));
        untyped.renderer_row_id = Some(7);
        let err = export(&untyped).unwrap_err();
        assert!(matches!(err, MapperError::MissingRequiredField { .. }));
        assert!(err.to_string().contains("genes-LinearBasicDisplay"));
    }

    #[test]
    fn test_export_unrecognized_renderer_type() {
        let (key, node) = export(&row(
            Some("renderer"),
            Some("LinearManhattanRenderer"),
            json!({"color": "red"}),
        ))
        .unwrap()
        .unwrap();
        assert_eq!(key, "renderer");
        assert_eq!(node, json!({"type": "LinearManhattanRenderer", "color": "red"}));
    }

    #[test]
    fn test_export_named_renderer() {
        let (key, node) = export(&row(
            Some("color"),
            Some("PileupRenderer"),
            json!({"colorBy": {"type": "strand"}}),
        ))
        .unwrap()
        .unwrap();
        assert_eq!(key, "color");
        assert_eq!(node["colorBy"], json!({"type": "strand"}));
    }
}
