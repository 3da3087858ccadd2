//! Configuration document I/O and the merge utility.
//!
//! A document is a JSON object whose `assemblies` and `tracks` arrays are
//! what the pipelines read and write. Every other top-level key (plugins,
//! default session, ...) is carried along untouched in [`ConfigDocument::rest`].

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::MapperError;

/// A JBrowse configuration document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigDocument {
    #[serde(default)]
    pub assemblies: Vec<Value>,

    #[serde(default)]
    pub tracks: Vec<Value>,

    /// Top-level keys the mapper does not interpret
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

#[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
fn is_gzipped(path: &Path) -> bool {
    path.to_string_lossy().to_lowercase().ends_with(".gz")
}

impl ConfigDocument {
    /// A document holding only the two pipeline arrays
    #[must_use]
    pub fn from_fragments(assemblies: Vec<Value>, tracks: Vec<Value>) -> Self {
        Self {
            assemblies,
            tracks,
            rest: Map::new(),
        }
    }

    /// # Errors
    ///
    /// Returns `MapperError::Json` if `text` is not a JSON object of the
    /// expected shape.
    pub fn from_json(text: &str) -> Result<Self, MapperError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load a document, transparently decompressing `.gz` files
    ///
    /// # Errors
    ///
    /// Returns `MapperError::Io` if the file cannot be read or
    /// `MapperError::Json` if it does not parse.
    pub fn load_from_file(path: &Path) -> Result<Self, MapperError> {
        let file = File::open(path)?;
        let mut text = String::new();
        if is_gzipped(path) {
            GzDecoder::new(file).read_to_string(&mut text)?;
        } else {
            BufReader::new(file).read_to_string(&mut text)?;
        }

        let document = Self::from_json(&text)?;
        debug!(
            path = %path.display(),
            assemblies = document.assemblies.len(),
            tracks = document.tracks.len(),
            "Loaded configuration document"
        );
        Ok(document)
    }

    /// Indented JSON text
    ///
    /// # Errors
    ///
    /// Returns `MapperError::Json` if serialization fails.
    pub fn to_json(&self) -> Result<String, MapperError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the document atomically: it is serialized in full, written to
    /// a temporary file beside `path` and renamed over it, so a failure
    /// never leaves a partial file behind
    ///
    /// # Errors
    ///
    /// Returns `MapperError::Json` if serialization fails or
    /// `MapperError::Io` if the file cannot be written.
    pub fn write_to_file(&self, path: &Path) -> Result<(), MapperError> {
        let text = self.to_json()?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            writer.write_all(text.as_bytes())?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }
        tmp.persist(path).map_err(|e| MapperError::Io(e.error))?;

        debug!(path = %path.display(), "Wrote configuration document");
        Ok(())
    }

    /// Replace the `assemblies` and `tracks` of a base template with freshly
    /// exported fragments; every other key of the base is kept
    #[must_use]
    pub fn merge_fragments(base: Self, assemblies: Vec<Value>, tracks: Vec<Value>) -> Self {
        Self {
            assemblies,
            tracks,
            rest: base.rest,
        }
    }
}

/// Read a fragment file: either a bare JSON array or an object holding the
/// array under `key`
///
/// # Errors
///
/// Returns `MapperError::Io`/`Json` if the file cannot be read or parsed, or
/// `MissingRequiredField` if an object has no array under `key`.
pub fn load_fragment(path: &Path, key: &str) -> Result<Vec<Value>, MapperError> {
    let text = std::fs::read_to_string(path)?;
    match serde_json::from_str::<Value>(&text)? {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove(key) {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(MapperError::missing(
                "fragment",
                path.display().to_string(),
                key,
            )),
        },
        _ => Err(MapperError::missing(
            "fragment",
            path.display().to_string(),
            key,
        )),
    }
}

/// Whether export leaves `value` out of the document when stored under `key`
fn dropped_on_export(key: &str, value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(map) if key == "refNameAliases" => map
            .get("adapter")
            .and_then(|adapter| adapter.get("features"))
            .and_then(Value::as_array)
            .map_or(true, Vec::is_empty),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Paths at which `actual` differs from `expected`, ignoring key order and
/// the empty or null values that export never writes
#[must_use]
pub fn differences(expected: &Value, actual: &Value) -> Vec<String> {
    let mut found = Vec::new();
    collect_differences("$", expected, actual, &mut found);
    found
}

fn collect_differences(path: &str, expected: &Value, actual: &Value, found: &mut Vec<String>) {
    match (expected, actual) {
        (Value::Object(want), Value::Object(got)) => {
            for (key, want_value) in want {
                let child = format!("{path}.{key}");
                match got.get(key) {
                    Some(got_value) => collect_differences(&child, want_value, got_value, found),
                    None if dropped_on_export(key, want_value) => {}
                    None => found.push(format!("{child}: missing")),
                }
            }
            // Export always writes some lists, empty or not
            for (key, got_value) in got {
                if !want.contains_key(key) && !dropped_on_export(key, got_value) {
                    found.push(format!("{path}.{key}: unexpected"));
                }
            }
        }
        (Value::Array(want), Value::Array(got)) => {
            if want.len() != got.len() {
                found.push(format!("{path}: {} items, found {}", want.len(), got.len()));
                return;
            }
            for (index, (want_item, got_item)) in want.iter().zip(got).enumerate() {
                collect_differences(&format!("{path}[{index}]"), want_item, got_item, found);
            }
        }
        _ if expected != actual => found.push(format!("{path}: expected {expected}, found {actual}")),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "assemblies": [{"name": "hg38"}],
            "tracks": [{"trackId": "genes"}],
            "plugins": [{"name": "MyPlugin", "url": "plugin.js"}],
            "defaultSession": {"name": "session"}
        })
    }

    #[test]
    fn test_unknown_top_level_keys_are_kept() {
        let doc = ConfigDocument::from_json(&sample().to_string()).unwrap();
        assert_eq!(doc.assemblies.len(), 1);
        assert_eq!(doc.tracks.len(), 1);
        assert!(doc.rest.contains_key("plugins"));

        let back: Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
        assert_eq!(back, sample());
    }

    #[test]
    fn test_missing_arrays_default_to_empty() {
        let doc = ConfigDocument::from_json("{}").unwrap();
        assert!(doc.assemblies.is_empty());
        assert!(doc.tracks.is_empty());
    }

    #[test]
    fn test_load_gzipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json.gz");
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        encoder.write_all(sample().to_string().as_bytes()).unwrap();
        encoder.finish().unwrap();

        let doc = ConfigDocument::load_from_file(&path).unwrap();
        assert_eq!(doc.tracks[0]["trackId"], "genes");
    }

    #[test]
    fn test_write_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        std::fs::write(&path, "stale").unwrap();

        let doc = ConfigDocument::from_fragments(vec![json!({"name": "volvox"})], vec![]);
        doc.write_to_file(&path).unwrap();

        let reloaded = ConfigDocument::load_from_file(&path).unwrap();
        assert_eq!(reloaded, doc);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_merge_replaces_only_fragments() {
        let base = ConfigDocument::from_json(&sample().to_string()).unwrap();
        let merged = ConfigDocument::merge_fragments(
            base,
            vec![json!({"name": "mm10"})],
            vec![],
        );
        assert_eq!(merged.assemblies, vec![json!({"name": "mm10"})]);
        assert!(merged.tracks.is_empty());
        assert_eq!(merged.rest["defaultSession"], json!({"name": "session"}));
    }

    #[test]
    fn test_differences_ignore_dropped_values() {
        let expected = json!({
            "trackId": "genes",
            "category": [],
            "renderer": {"type": "SvgFeatureRenderer", "color2": null},
            "refNameAliases": {"adapter": {"type": "FromConfigAdapter", "features": []}}
        });
        let actual = json!({
            "renderer": {"type": "SvgFeatureRenderer"},
            "trackId": "genes"
        });
        assert!(differences(&expected, &actual).is_empty());
    }

    #[test]
    fn test_differences_report_paths() {
        let expected = json!({"tracks": [{"adapter": {"bamLocation": {"uri": "a.bam"}}}]});
        let actual = json!({"tracks": [{"adapter": {"bamLocation": {"uri": "b.bam"}}, "extra": 1}]});
        let found = differences(&expected, &actual);
        assert_eq!(found.len(), 2);
        assert!(found[0].starts_with("$.tracks[0].adapter.bamLocation.uri"));
        assert_eq!(found[1], "$.tracks[0].extra: unexpected");
    }

    #[test]
    fn test_load_fragment_shapes() {
        let dir = tempfile::tempdir().unwrap();
        let bare = dir.path().join("bare.json");
        let wrapped = dir.path().join("wrapped.json");
        std::fs::write(&bare, r#"[{"trackId": "a"}]"#).unwrap();
        std::fs::write(&wrapped, r#"{"tracks": [{"trackId": "b"}]}"#).unwrap();

        assert_eq!(load_fragment(&bare, "tracks").unwrap()[0]["trackId"], "a");
        assert_eq!(load_fragment(&wrapped, "tracks").unwrap()[0]["trackId"], "b");
        assert!(load_fragment(&wrapped, "assemblies").is_err());
    }
}
