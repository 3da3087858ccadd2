//! Document walker for the import direction.
//!
//! Each root node (assembly or track) is first parsed into the typed model,
//! then written parent-first so every child receives the generated identity
//! of the row it belongs to.

use serde_json::Value;
use tracing::{debug, warn};

use crate::core::assembly::{Assembly, Feature, RefNameAlias, Sequence};
use crate::core::display::Display;
use crate::core::track::Track;
use crate::core::types::{DisplayParent, Resolution, RowId};
use crate::dispatch::{renderer, sequence_adapter, track_adapter};
use crate::error::MapperError;
use crate::report::{ImportReport, SkippedRecord};
use crate::store::ConfigRepository;
use crate::utils::json::{non_empty_str, object_list, optional_str, required_str, string_list, NodeRef};

/// Key for a root node whose identifying field is itself missing
fn position_key(index: usize) -> String {
    format!("#{index}")
}

/// A non-empty string at a dotted path such as `sequence.adapter.type`
fn required_nested(node: &Value, path: &str, at: NodeRef<'_>) -> Result<String, MapperError> {
    let pointer = format!("/{}", path.replace('.', "/"));
    node.pointer(&pointer)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| at.missing(path))
}

/// Parse one display node
///
/// # Errors
///
/// Returns `MissingRequiredField` if `displayId` or `type` is absent.
pub fn parse_display(
    node: &Value,
    owner: &str,
    skipped: &mut Vec<SkippedRecord>,
) -> Result<Display, MapperError> {
    let display_id = required_str(node, "displayId", NodeRef::new("display", owner))?;
    let display_type = required_str(node, "type", NodeRef::new("display", &display_id))?;

    let mut renderers = Vec::new();
    for (key, renderer_node) in renderer::renderer_nodes(node) {
        match renderer::import(renderer_node, &key, &display_id) {
            Resolution::Resolved(r) => renderers.push(r),
            Resolution::Skipped { .. } => {
                let err = MapperError::missing("renderer", key, "type");
                skipped.push(SkippedRecord::from_error("renderer", display_id.clone(), &err));
            }
        }
    }

    Ok(Display {
        display_id,
        display_type,
        renderers,
    })
}

fn parse_displays(
    node: &Value,
    owner: &str,
    skipped: &mut Vec<SkippedRecord>,
) -> Result<Vec<Display>, MapperError> {
    object_list(node, "displays")
        .iter()
        .map(|display| parse_display(display, owner, skipped))
        .collect()
}

fn parse_ref_name_aliases(node: &Value, at: NodeRef<'_>) -> Result<Option<RefNameAlias>, MapperError> {
    let Some(adapter) = node
        .get("refNameAliases")
        .and_then(|aliases| aliases.get("adapter"))
    else {
        return Ok(None);
    };

    let adapter_type = non_empty_str(adapter, "type")
        .ok_or_else(|| at.missing("refNameAliases.adapter.type"))?;

    let features = object_list(adapter, "features")
        .iter()
        .map(|feature| {
            Ok(Feature {
                ref_name: non_empty_str(feature, "refName")
                    .ok_or_else(|| at.missing("refNameAliases.adapter.features.refName"))?,
                unique_id: optional_str(feature, "uniqueId"),
                aliases: string_list(feature, "aliases"),
            })
        })
        .collect::<Result<Vec<_>, MapperError>>()?;

    // An alias table without features is indistinguishable from none at all
    if features.is_empty() {
        return Ok(None);
    }

    Ok(Some(RefNameAlias {
        adapter_type,
        adapter_id: optional_str(adapter, "adapterId"),
        features,
    }))
}

/// Parse one assembly node
///
/// # Errors
///
/// Returns `MissingRequiredField` for an absent `name`, sequence field,
/// sequence adapter location, display field or feature `refName`.
pub fn parse_assembly(
    node: &Value,
    index: usize,
    skipped: &mut Vec<SkippedRecord>,
) -> Result<Assembly, MapperError> {
    let name = required_str(node, "name", NodeRef::new("assembly", &position_key(index)))?;
    let at = NodeRef::new("assembly", &name);

    let sequence_node = node.get("sequence").ok_or_else(|| at.missing("sequence"))?;
    let adapter_node = sequence_node
        .get("adapter")
        .ok_or_else(|| at.missing("sequence.adapter"))?;
    let adapter_type = required_nested(node, "sequence.adapter.type", at)?;

    let adapter = sequence_adapter::import(adapter_node, &name)?;
    if let Resolution::Skipped { type_tag } = &adapter {
        skipped.push(SkippedRecord::unknown("sequence adapter", name.clone(), type_tag));
    }

    let sequence = Sequence {
        track_id: required_nested(node, "sequence.trackId", at)?,
        sequence_type: required_nested(node, "sequence.type", at)?,
        adapter_type,
        adapter,
        displays: parse_displays(sequence_node, &name, skipped)?,
    };

    Ok(Assembly {
        display_name: optional_str(node, "displayName"),
        aliases: string_list(node, "aliases"),
        ref_name_aliases: parse_ref_name_aliases(node, at)?,
        sequence,
        name,
    })
}

/// Parse one track node, leaving its adapter to be dispatched once the
/// track row exists
///
/// # Errors
///
/// Returns `MissingRequiredField` for an absent `trackId`, `type`, `name`,
/// `adapter`, `adapter.type` or display field.
pub fn parse_track(
    node: &Value,
    index: usize,
    skipped: &mut Vec<SkippedRecord>,
) -> Result<Track, MapperError> {
    let track_id = required_str(node, "trackId", NodeRef::new("track", &position_key(index)))?;
    let at = NodeRef::new("track", &track_id);

    if node.get("adapter").is_none() {
        return Err(at.missing("adapter"));
    }

    Ok(Track {
        track_type: required_str(node, "type", at)?,
        name: required_str(node, "name", at)?,
        assembly_names: string_list(node, "assemblyNames"),
        category: string_list(node, "category"),
        adapter_type: required_nested(node, "adapter.type", at)?,
        displays: parse_displays(node, &track_id, skipped)?,
        track_id,
    })
}

/// Walks a document and writes it through a repository
pub struct DocumentWalker<'r, R: ConfigRepository> {
    repo: &'r mut R,
    report: ImportReport,
}

impl<'r, R: ConfigRepository> DocumentWalker<'r, R> {
    pub fn new(repo: &'r mut R) -> Self {
        Self {
            repo,
            report: ImportReport::start(),
        }
    }

    #[must_use]
    pub fn into_report(mut self) -> ImportReport {
        self.report.finish();
        self.report
    }

    /// Persist every assembly
    ///
    /// # Errors
    ///
    /// Returns the first fatal error.
    pub fn import_assemblies(&mut self, nodes: &[Value]) -> Result<(), MapperError> {
        for (index, node) in nodes.iter().enumerate() {
            let assembly = parse_assembly(node, index, &mut self.report.skipped)?;
            self.persist_assembly(&assembly)?;
        }
        Ok(())
    }

    /// Persist every track; assemblies must already be persisted so that
    /// alignment adapters can resolve their sequence adapter
    ///
    /// # Errors
    ///
    /// Returns the first fatal error.
    pub fn import_tracks(&mut self, nodes: &[Value]) -> Result<(), MapperError> {
        for (index, node) in nodes.iter().enumerate() {
            let track = parse_track(node, index, &mut self.report.skipped)?;
            let track_row = self.persist_track(&track)?;
            self.import_track_adapter(node, &track, track_row)?;
        }
        Ok(())
    }

    fn persist_assembly(&mut self, assembly: &Assembly) -> Result<RowId, MapperError> {
        let id = self.repo.insert_assembly(assembly)?;
        self.report.assemblies += 1;
        debug!(assembly = %assembly.name, id, "Inserted assembly");

        if let Resolution::Resolved(adapter) = &assembly.sequence.adapter {
            let adapter_id = self.repo.insert_sequence_adapter(id, adapter)?;
            self.report.sequence_adapters += 1;
            debug!(assembly = %assembly.name, adapter_type = %adapter.kind, adapter_id, "Inserted sequence adapter");
        }

        self.persist_displays(DisplayParent::assembly(id), &assembly.sequence.displays)?;

        if let Some(alias) = &assembly.ref_name_aliases {
            let alias_id = self.repo.insert_ref_name_alias(id, alias)?;
            for feature in &alias.features {
                self.repo.insert_feature(alias_id, feature)?;
                self.report.ref_name_alias_features += 1;
            }
        }
        Ok(id)
    }

    fn persist_track(&mut self, track: &Track) -> Result<RowId, MapperError> {
        let id = self.repo.insert_track(track)?;
        self.report.tracks += 1;
        debug!(track_id = %track.track_id, id, "Inserted track");

        self.persist_displays(DisplayParent::track(id), &track.displays)?;
        Ok(id)
    }

    fn import_track_adapter(
        &mut self,
        node: &Value,
        track: &Track,
        track_row: RowId,
    ) -> Result<(), MapperError> {
        let Some(adapter_node) = node.get("adapter") else {
            return Err(MapperError::missing("track", track.track_id.as_str(), "adapter"));
        };
        let input = track_adapter::AdapterInput {
            node: adapter_node,
            track_id: &track.track_id,
            track_assembly_names: &track.assembly_names,
        };

        match track_adapter::import(&track.adapter_type, &input, &*self.repo) {
            Ok(Resolution::Resolved(adapter)) => {
                let adapter_id = self.repo.insert_track_adapter(track_row, &adapter)?;
                self.report.track_adapters += 1;
                debug!(track_id = %track.track_id, adapter_type = %adapter.kind(), adapter_id, "Inserted track adapter");
            }
            Ok(Resolution::Skipped { type_tag }) => {
                self.report.skip(SkippedRecord::unknown(
                    "track adapter",
                    track.track_id.clone(),
                    &type_tag,
                ));
            }
            Err(err) if !err.is_fatal_to_run() => {
                warn!(track_id = %track.track_id, error = %err, "Track committed without its adapter");
                self.report.skip(SkippedRecord::from_error(
                    "track adapter",
                    track.track_id.clone(),
                    &err,
                ));
            }
            Err(err) => return Err(err),
        }
        Ok(())
    }

    fn persist_displays(&mut self, parent: DisplayParent, displays: &[Display]) -> Result<(), MapperError> {
        for display in displays {
            let display_row = self.repo.insert_display(parent, display)?;
            self.report.displays += 1;
            for renderer in &display.renderers {
                self.repo.insert_renderer(display_row, renderer)?;
                self.report.renderers += 1;
            }
        }
        Ok(())
    }
}
