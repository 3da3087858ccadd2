//! Export pipeline: relational store → document.
//!
//! Exporting is read-only. A record that cannot be rebuilt (unknown type,
//! missing column, dangling sequence adapter reference) is left out of the
//! document with a warning and listed in the [`ExportReport`]; only a store
//! failure stops the run. Nothing is written to disk here: callers write the
//! returned document once the whole transform has succeeded.

pub mod projection;

use serde_json::Value;
use tracing::{info, warn};

use crate::core::track::TrackAdapterKind;
use crate::core::types::ParentType;
use crate::dispatch::{sequence_adapter, track_adapter};
use crate::document::ConfigDocument;
use crate::error::MapperError;
use crate::report::{ExportReport, SkipReason, SkippedRecord};
use crate::store::rows::{AssemblyRow, TrackRow};
use crate::store::ConfigRepository;
use crate::utils::lookup::SequenceAdapterIndex;

/// The rebuilt document and what went into it
#[derive(Debug, Clone)]
pub struct ExportOutcome {
    pub document: ConfigDocument,
    pub report: ExportReport,
}

/// Rebuild the `assemblies` and `tracks` of a document from `repo`
///
/// # Errors
///
/// Returns `MapperError::Store` if a query fails.
pub fn export_config<R: ConfigRepository>(repo: &R) -> Result<ExportOutcome, MapperError> {
    let mut report = ExportReport::start();

    let sequence_rows = repo.sequence_adapters()?;
    let sequences = SequenceAdapterIndex::new(&sequence_rows);

    let mut assembly_displays =
        projection::displays_by_parent(repo.display_renderers(ParentType::Assembly)?);
    let mut track_displays =
        projection::displays_by_parent(repo.display_renderers(ParentType::Track)?);
    let mut ref_name_aliases =
        projection::ref_name_aliases_by_assembly(repo.ref_name_alias_features()?);

    let mut assemblies = Vec::new();
    for row in repo.assemblies()? {
        let adapter = export_sequence_adapter(&row, &sequences, &mut report);
        assemblies.push(projection::assembly_node(
            &row,
            adapter,
            assembly_displays.take(row.id),
            ref_name_aliases.remove(&row.id),
        ));
    }

    let mut tracks = Vec::new();
    for row in repo.tracks()? {
        let adapter = export_track_adapter(repo, &row, &sequences, &mut report)?;
        tracks.push(projection::track_node(
            &row,
            adapter,
            track_displays.take(row.id),
        ));
    }

    report.assemblies = assemblies.len();
    report.tracks = tracks.len();
    report.displays = assembly_displays.displays + track_displays.displays;
    report.renderers = assembly_displays.renderers + track_displays.renderers;
    for record in assembly_displays.omitted.drain(..).chain(track_displays.omitted.drain(..)) {
        omit(&mut report, record);
    }
    report.finish();

    info!(
        assemblies = report.assemblies,
        tracks = report.tracks,
        adapters = report.adapters,
        omitted = report.omitted.len(),
        "Export complete"
    );

    Ok(ExportOutcome {
        document: ConfigDocument::from_fragments(assemblies, tracks),
        report,
    })
}

fn omit(report: &mut ExportReport, record: SkippedRecord) {
    warn!(
        entity = record.entity,
        owner = %record.owner,
        reason = %record.reason,
        detail = %record.detail,
        "Omitting record from export"
    );
    report.omit(record);
}

fn export_sequence_adapter(
    row: &AssemblyRow,
    sequences: &SequenceAdapterIndex<'_>,
    report: &mut ExportReport,
) -> Option<Value> {
    let Some(adapter_type) = row.adapter_type.as_deref() else {
        omit(
            report,
            SkippedRecord::from_error(
                "sequence adapter",
                row.name.clone(),
                &MapperError::missing("assembly", row.name.as_str(), "sequence.adapter.type"),
            ),
        );
        return None;
    };

    if sequence_adapter::handler(adapter_type).is_none() {
        omit(
            report,
            SkippedRecord::unknown("sequence adapter", row.name.clone(), adapter_type),
        );
        return None;
    }

    let Some(adapter_row) = sequences.for_assembly(row.id, adapter_type) else {
        omit(
            report,
            SkippedRecord {
                entity: "sequence adapter",
                owner: row.name.clone(),
                reason: SkipReason::NotStored,
                detail: format!("no {adapter_type} row for assembly"),
            },
        );
        return None;
    };

    match sequence_adapter::export(adapter_row) {
        Ok(node) => {
            report.adapters += 1;
            Some(node)
        }
        Err(err) => {
            omit(
                report,
                SkippedRecord::from_error("sequence adapter", row.name.clone(), &err),
            );
            None
        }
    }
}

fn export_track_adapter<R: ConfigRepository>(
    repo: &R,
    row: &TrackRow,
    sequences: &SequenceAdapterIndex<'_>,
    report: &mut ExportReport,
) -> Result<Option<Value>, MapperError> {
    let Some(adapter_type) = repo.track_adapter_type(&row.track_id)? else {
        omit(
            report,
            SkippedRecord::from_error(
                "track adapter",
                row.track_id.clone(),
                &MapperError::missing("track", row.track_id.as_str(), "adapter.type"),
            ),
        );
        return Ok(None);
    };

    let Some(kind) = TrackAdapterKind::from_tag(&adapter_type) else {
        omit(
            report,
            SkippedRecord::unknown("track adapter", row.track_id.clone(), &adapter_type),
        );
        return Ok(None);
    };

    let Some(adapter_row) = repo.track_adapter(kind, row.id)? else {
        omit(
            report,
            SkippedRecord {
                entity: "track adapter",
                owner: row.track_id.clone(),
                reason: SkipReason::NotStored,
                detail: format!("no {kind} row for track"),
            },
        );
        return Ok(None);
    };

    match track_adapter::export(kind, &adapter_row, sequences, &row.track_id) {
        Ok(node) => {
            report.adapters += 1;
            Ok(Some(node))
        }
        Err(err) => {
            omit(
                report,
                SkippedRecord::from_error("track adapter", row.track_id.clone(), &err),
            );
            Ok(None)
        }
    }
}
