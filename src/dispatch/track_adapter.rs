//! Track adapter handlers.
//!
//! Variants share three shapes (see [`AdapterFamily`](crate::core::track::AdapterFamily)); a table entry names
//! the variant's data field and index placement and points at the family's
//! import and export functions.
//!
//! | Type | Data field | Index |
//! |------|------------|-------|
//! | `Gff3TabixAdapter` | `gffGzLocation` | `index.location` |
//! | `BedTabixAdapter` | `bedGzLocation` | `index.location` |
//! | `VcfTabixAdapter` | `vcfGzLocation` | `index.location` |
//! | `BamAdapter` | `bamLocation` | `index.location` |
//! | `CramAdapter` | `cramLocation` | `craiLocation` |
//! | `PAFAdapter` | `pafLocation` | none |
//! | `DeltaAdapter` | `deltaLocation` | none |

use serde_json::{Map, Value};
use tracing::warn;

use crate::core::assembly::SequenceAdapterKind;
use crate::core::track::{
    AlignmentAdapter, ComparativeAdapter, IndexLocation, TabixAdapter,
    TrackAdapter, TrackAdapterKind,
};
use crate::core::types::{Location, Resolution};
use crate::dispatch::{sequence_adapter, VariantFamily};
use crate::error::MapperError;
use crate::store::rows::TrackAdapterRow;
use crate::store::SequenceAdapterLookup;
use crate::utils::json::{
    insert_opt, location_value, non_empty_str, optional_str, required_location, string_array,
    string_list, NodeRef,
};
use crate::utils::lookup::{resolve_sequence_adapter, SequenceAdapterIndex};

/// Where a variant keeps its index file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexPlacement {
    /// `index: {location, indexType?}`
    Nested,
    /// A location directly on the adapter under the given key
    Flat(&'static str),
}

/// What an adapter import needs to know about its track
#[derive(Debug, Clone, Copy)]
pub struct AdapterInput<'a> {
    /// The track's `adapter` node
    pub node: &'a Value,
    pub track_id: &'a str,
    pub track_assembly_names: &'a [String],
}

type ImportFn = fn(
    &TrackAdapterHandler,
    &AdapterInput<'_>,
    &dyn SequenceAdapterLookup,
) -> Result<TrackAdapter, MapperError>;

type ExportFn = fn(
    &TrackAdapterHandler,
    &TrackAdapterRow,
    &SequenceAdapterIndex<'_>,
    &str,
) -> Result<Map<String, Value>, MapperError>;

/// Both directions of one track adapter variant
pub struct TrackAdapterHandler {
    pub kind: TrackAdapterKind,
    pub data_field: &'static str,
    pub index: Option<IndexPlacement>,
    import: ImportFn,
    export: ExportFn,
}

pub static HANDLERS: [TrackAdapterHandler; 7] = [
    TrackAdapterHandler {
        kind: TrackAdapterKind::Gff3Tabix,
        data_field: "gffGzLocation",
        index: Some(IndexPlacement::Nested),
        import: import_tabix,
        export: export_tabix,
    },
    TrackAdapterHandler {
        kind: TrackAdapterKind::BedTabix,
        data_field: "bedGzLocation",
        index: Some(IndexPlacement::Nested),
        import: import_tabix,
        export: export_tabix,
    },
    TrackAdapterHandler {
        kind: TrackAdapterKind::VcfTabix,
        data_field: "vcfGzLocation",
        index: Some(IndexPlacement::Nested),
        import: import_tabix,
        export: export_tabix,
    },
    TrackAdapterHandler {
        kind: TrackAdapterKind::Bam,
        data_field: "bamLocation",
        index: Some(IndexPlacement::Nested),
        import: import_alignment,
        export: export_alignment,
    },
    TrackAdapterHandler {
        kind: TrackAdapterKind::Cram,
        data_field: "cramLocation",
        index: Some(IndexPlacement::Flat("craiLocation")),
        import: import_alignment,
        export: export_alignment,
    },
    TrackAdapterHandler {
        kind: TrackAdapterKind::Paf,
        data_field: "pafLocation",
        index: None,
        import: import_comparative,
        export: export_comparative,
    },
    TrackAdapterHandler {
        kind: TrackAdapterKind::Delta,
        data_field: "deltaLocation",
        index: None,
        import: import_comparative,
        export: export_comparative,
    },
];

#[must_use]
pub fn handler(type_tag: &str) -> Option<&'static TrackAdapterHandler> {
    HANDLERS.iter().find(|h| h.kind.tag() == type_tag)
}

#[must_use]
pub fn handler_for(kind: TrackAdapterKind) -> Option<&'static TrackAdapterHandler> {
    HANDLERS.iter().find(|h| h.kind == kind)
}

/// Dispatch a track's `adapter` node on `type_tag`
///
/// An unknown tag is skipped with a warning.
///
/// # Errors
///
/// - `MissingRequiredField` / `AssemblyNamesCardinality` for a known tag with
///   a structurally required field absent
/// - `UnresolvedReference` when an alignment adapter's sequence adapter
///   cannot be found among the persisted assemblies
/// - `Store` if the lookup query fails
pub fn import(
    type_tag: &str,
    input: &AdapterInput<'_>,
    lookup: &dyn SequenceAdapterLookup,
) -> Result<Resolution<TrackAdapter>, MapperError> {
    match handler(type_tag) {
        Some(h) => (h.import)(h, input, lookup).map(Resolution::Resolved),
        None => {
            warn!(track_id = %input.track_id, type_tag = %type_tag, "Skipping unknown track adapter");
            Ok(Resolution::Skipped {
                type_tag: type_tag.to_string(),
            })
        }
    }
}

/// Rebuild a track's `adapter` node from its adapter row
///
/// # Errors
///
/// - `MissingRequiredField` if a required column is empty
/// - `UnresolvedReference` if an alignment adapter's sequence adapter row is gone
/// - `UnknownVariant` if `kind` has no handler
pub fn export(
    kind: TrackAdapterKind,
    row: &TrackAdapterRow,
    sequences: &SequenceAdapterIndex<'_>,
    track_id: &str,
) -> Result<Value, MapperError> {
    let handler = handler_for(kind).ok_or_else(|| MapperError::UnknownVariant {
        family: VariantFamily::TrackAdapter,
        type_tag: kind.tag().to_string(),
    })?;
    (handler.export)(handler, row, sequences, track_id).map(Value::Object)
}

fn adapter_ref<'a>(input: &AdapterInput<'a>) -> NodeRef<'a> {
    NodeRef::new("track adapter", input.track_id)
}

fn read_index(
    placement: Option<IndexPlacement>,
    node: &Value,
    at: NodeRef<'_>,
) -> Result<IndexLocation, MapperError> {
    match placement {
        Some(IndexPlacement::Flat(field)) => Ok(IndexLocation {
            location: required_location(node, field, at)?,
            index_type: None,
        }),
        Some(IndexPlacement::Nested) | None => {
            let index = node.get("index").ok_or_else(|| at.missing("index"))?;
            let location = required_location(index, "location", at)
                .map_err(|_| at.missing("index.location"))?;
            Ok(IndexLocation {
                location,
                index_type: optional_str(index, "indexType"),
            })
        }
    }
}

fn import_tabix(
    handler: &TrackAdapterHandler,
    input: &AdapterInput<'_>,
    _lookup: &dyn SequenceAdapterLookup,
) -> Result<TrackAdapter, MapperError> {
    let at = adapter_ref(input);
    check_cardinality(handler.kind, input.track_id, input.track_assembly_names)?;
    Ok(TrackAdapter::Tabix(TabixAdapter {
        kind: handler.kind,
        data_location: required_location(input.node, handler.data_field, at)?,
        index: read_index(handler.index, input.node, at)?,
    }))
}

fn check_cardinality(
    kind: TrackAdapterKind,
    track_id: &str,
    names: &[String],
) -> Result<(), MapperError> {
    let required = kind.min_assembly_names();
    if names.len() < required {
        return Err(MapperError::AssemblyNamesCardinality {
            track_id: track_id.to_string(),
            adapter_type: kind.tag().to_string(),
            required,
            found: names.len(),
        });
    }
    Ok(())
}

fn import_alignment(
    handler: &TrackAdapterHandler,
    input: &AdapterInput<'_>,
    lookup: &dyn SequenceAdapterLookup,
) -> Result<TrackAdapter, MapperError> {
    let at = adapter_ref(input);
    check_cardinality(handler.kind, input.track_id, input.track_assembly_names)?;
    let data_location = required_location(input.node, handler.data_field, at)?;
    let index = read_index(handler.index, input.node, at)?;

    let unresolved = |reference: String| MapperError::UnresolvedReference {
        track_id: input.track_id.to_string(),
        adapter_type: handler.kind.tag().to_string(),
        reference,
    };

    let Some(sequence_node) = input.node.get("sequenceAdapter").filter(|v| !v.is_null()) else {
        return Err(unresolved("a sequenceAdapter".to_string()));
    };
    let sequence_type =
        non_empty_str(sequence_node, "type").ok_or_else(|| at.missing("sequenceAdapter.type"))?;
    let sequence_kind = SequenceAdapterKind::from_tag(&sequence_type)
        .ok_or_else(|| unresolved(format!("sequence adapter type `{sequence_type}`")))?;

    // Alignment tracks bind to the first assembly they are drawn against
    let assembly_name = input
        .track_assembly_names
        .first()
        .ok_or_else(|| unresolved("an assembly name".to_string()))?;
    let sequence_adapter = resolve_sequence_adapter(lookup, assembly_name, sequence_kind)?
        .ok_or_else(|| unresolved(format!("{sequence_kind} of assembly `{assembly_name}`")))?;

    Ok(TrackAdapter::Alignment(AlignmentAdapter {
        kind: handler.kind,
        data_location,
        index,
        sequence_adapter,
    }))
}

fn import_comparative(
    handler: &TrackAdapterHandler,
    input: &AdapterInput<'_>,
    _lookup: &dyn SequenceAdapterLookup,
) -> Result<TrackAdapter, MapperError> {
    let at = adapter_ref(input);
    let assembly_names = string_list(input.node, "assemblyNames");
    check_cardinality(handler.kind, input.track_id, &assembly_names)?;

    Ok(TrackAdapter::Comparative(ComparativeAdapter {
        kind: handler.kind,
        data_location: required_location(input.node, handler.data_field, at)?,
        assembly_names,
    }))
}

fn required_column(
    location: Option<&Location>,
    track_id: &str,
    field: &str,
) -> Result<Value, MapperError> {
    location
        .map(location_value)
        .ok_or_else(|| MapperError::missing("track adapter", track_id, field))
}

/// `type`, the data location and the index, common to the indexed families
fn indexed_node(
    handler: &TrackAdapterHandler,
    row: &TrackAdapterRow,
    track_id: &str,
) -> Result<Map<String, Value>, MapperError> {
    let mut node = Map::new();
    node.insert("type".to_string(), Value::from(handler.kind.tag()));
    node.insert(
        handler.data_field.to_string(),
        required_column(row.data_location.as_ref(), track_id, handler.data_field)?,
    );

    match handler.index {
        Some(IndexPlacement::Flat(field)) => {
            node.insert(
                field.to_string(),
                required_column(row.index_location.as_ref(), track_id, field)?,
            );
        }
        Some(IndexPlacement::Nested) | None => {
            let mut index = Map::new();
            index.insert(
                "location".to_string(),
                required_column(row.index_location.as_ref(), track_id, "index.location")?,
            );
            insert_opt(
                &mut index,
                "indexType",
                row.index_type.as_deref().map(Value::from),
            );
            node.insert("index".to_string(), Value::Object(index));
        }
    }
    Ok(node)
}

fn export_tabix(
    handler: &TrackAdapterHandler,
    row: &TrackAdapterRow,
    _sequences: &SequenceAdapterIndex<'_>,
    track_id: &str,
) -> Result<Map<String, Value>, MapperError> {
    indexed_node(handler, row, track_id)
}

fn export_alignment(
    handler: &TrackAdapterHandler,
    row: &TrackAdapterRow,
    sequences: &SequenceAdapterIndex<'_>,
    track_id: &str,
) -> Result<Map<String, Value>, MapperError> {
    let mut node = indexed_node(handler, row, track_id)?;

    let referenced = match (&row.sequence_adapter_type, row.sequence_adapter_id) {
        (Some(adapter_type), Some(id)) => sequences.by_reference(adapter_type, id),
        _ => None,
    };
    let Some(referenced) = referenced else {
        return Err(MapperError::UnresolvedReference {
            track_id: track_id.to_string(),
            adapter_type: handler.kind.tag().to_string(),
            reference: format!(
                "sequence adapter row {} {}",
                row.sequence_adapter_type.as_deref().unwrap_or("?"),
                row.sequence_adapter_id.map_or_else(|| "?".to_string(), |id| id.to_string())
            ),
        });
    };

    node.insert(
        "sequenceAdapter".to_string(),
        sequence_adapter::export_embedded(referenced)?,
    );
    Ok(node)
}

fn export_comparative(
    handler: &TrackAdapterHandler,
    row: &TrackAdapterRow,
    _sequences: &SequenceAdapterIndex<'_>,
    track_id: &str,
) -> Result<Map<String, Value>, MapperError> {
    let assembly_names = row
        .assembly_names
        .as_deref()
        .ok_or_else(|| MapperError::missing("track adapter", track_id, "assemblyNames"))?;

    let mut node = Map::new();
    node.insert("type".to_string(), Value::from(handler.kind.tag()));
    node.insert("assemblyNames".to_string(), string_array(assembly_names));
    node.insert(
        handler.data_field.to_string(),
        required_column(row.data_location.as_ref(), track_id, handler.data_field)?,
    );
    Ok(node)
}
