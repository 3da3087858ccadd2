//! Sequence adapter handlers (`IndexedFastaAdapter`, `BgzipFastaAdapter`).

use serde_json::{Map, Value};
use tracing::warn;

use crate::core::assembly::{SequenceAdapter, SequenceAdapterKind};
use crate::core::types::{Location, Resolution};
use crate::dispatch::VariantFamily;
use crate::error::MapperError;
use crate::store::rows::SequenceAdapterRow;
use crate::utils::json::{
    insert_opt, location_value, optional_location, required_location, required_str, NodeRef,
};

type ImportFn = fn(&Value, NodeRef<'_>) -> Result<SequenceAdapter, MapperError>;
type ExportFn = fn(&SequenceAdapterRow) -> Result<Map<String, Value>, MapperError>;

/// Both directions of one sequence adapter variant
pub struct SequenceAdapterHandler {
    pub kind: SequenceAdapterKind,
    pub import: ImportFn,
    pub export: ExportFn,
}

pub static HANDLERS: [SequenceAdapterHandler; 2] = [
    SequenceAdapterHandler {
        kind: SequenceAdapterKind::IndexedFasta,
        import: |node, at| import_fasta(SequenceAdapterKind::IndexedFasta, node, at),
        export: |row| export_fasta(SequenceAdapterKind::IndexedFasta, row),
    },
    SequenceAdapterHandler {
        kind: SequenceAdapterKind::BgzipFasta,
        import: |node, at| import_fasta(SequenceAdapterKind::BgzipFasta, node, at),
        export: |row| export_fasta(SequenceAdapterKind::BgzipFasta, row),
    },
];

#[must_use]
pub fn handler(type_tag: &str) -> Option<&'static SequenceAdapterHandler> {
    HANDLERS.iter().find(|h| h.kind.tag() == type_tag)
}

/// Dispatch the `adapter` node of an assembly's sequence
///
/// An unknown `type` is skipped with a warning.
///
/// # Errors
///
/// Returns `MissingRequiredField` if `type` or a required location is absent.
pub fn import(adapter: &Value, assembly_name: &str) -> Result<Resolution<SequenceAdapter>, MapperError> {
    let at = NodeRef::new("sequence adapter", assembly_name);
    let type_tag = required_str(adapter, "type", at)?;

    match handler(&type_tag) {
        Some(h) => (h.import)(adapter, at).map(Resolution::Resolved),
        None => {
            warn!(assembly = %assembly_name, type_tag = %type_tag, "Skipping unknown sequence adapter");
            Ok(Resolution::Skipped { type_tag })
        }
    }
}

/// Rebuild the `sequence.adapter` node of an assembly
///
/// # Errors
///
/// Returns `UnknownVariant` for an unrecognized `adapter_type`, or
/// `MissingRequiredField` if a required location column is empty.
pub fn export(row: &SequenceAdapterRow) -> Result<Value, MapperError> {
    let handler = handler(&row.adapter_type).ok_or_else(|| MapperError::UnknownVariant {
        family: VariantFamily::SequenceAdapter,
        type_tag: row.adapter_type.clone(),
    })?;
    (handler.export)(row).map(Value::Object)
}

/// The copy of a sequence adapter embedded under an alignment adapter's
/// `sequenceAdapter`; it never carries `metadataLocation`
///
/// # Errors
///
/// Same as [`export`].
pub fn export_embedded(row: &SequenceAdapterRow) -> Result<Value, MapperError> {
    let mut node = export(row)?;
    if let Some(map) = node.as_object_mut() {
        map.remove("metadataLocation");
    }
    Ok(node)
}

fn import_fasta(
    kind: SequenceAdapterKind,
    node: &Value,
    at: NodeRef<'_>,
) -> Result<SequenceAdapter, MapperError> {
    let gzi_location = if kind.has_gzi() {
        optional_location(node, "gziLocation", at)?
    } else {
        None
    };

    Ok(SequenceAdapter {
        kind,
        fasta_location: required_location(node, "fastaLocation", at)?,
        fai_location: required_location(node, "faiLocation", at)?,
        gzi_location,
        metadata_location: optional_location(node, "metadataLocation", at)?,
    })
}

fn export_fasta(
    kind: SequenceAdapterKind,
    row: &SequenceAdapterRow,
) -> Result<Map<String, Value>, MapperError> {
    let key = format!("{} {}", row.adapter_type, row.id);
    let required = |location: &Option<Location>, field: &str| {
        location
            .as_ref()
            .map(location_value)
            .ok_or_else(|| MapperError::missing("sequence adapter", key.as_str(), field))
    };

    let mut node = Map::new();
    node.insert("type".to_string(), Value::from(kind.tag()));
    node.insert(
        "fastaLocation".to_string(),
        required(&row.fasta_location, "fastaLocation")?,
    );
    node.insert(
        "faiLocation".to_string(),
        required(&row.fai_location, "faiLocation")?,
    );
    if kind.has_gzi() {
        insert_opt(
            &mut node,
            "gziLocation",
            row.gzi_location.as_ref().map(location_value),
        );
    }
    insert_opt(
        &mut node,
        "metadataLocation",
        row.metadata_location.as_ref().map(location_value),
    );
    Ok(node)
}
