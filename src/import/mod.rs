//! Import pipeline: document → relational store.
//!
//! One run is a single all-or-nothing unit. Assemblies are written in a
//! first pass and tracks in a second, so an alignment track can always find
//! the sequence adapter of an assembly defined anywhere in the document.
//! Any fatal error rolls back every write of the run.

pub mod walker;

use tracing::{info, warn};

use crate::document::ConfigDocument;
use crate::error::MapperError;
use crate::report::ImportReport;
use crate::store::ConfigRepository;

pub use walker::DocumentWalker;

/// Import a configuration document into `repo`
///
/// # Errors
///
/// Returns the first fatal [`MapperError`]; nothing from the run is kept.
/// Unknown variants and unresolved alignment references are not errors and
/// are listed in the returned report instead.
pub fn import_config<R: ConfigRepository>(
    repo: &mut R,
    document: &ConfigDocument,
) -> Result<ImportReport, MapperError> {
    repo.begin()?;

    let mut walker = DocumentWalker::new(repo);
    let walked = walker
        .import_assemblies(&document.assemblies)
        .and_then(|()| walker.import_tracks(&document.tracks));
    let report = walker.into_report();

    if let Err(err) = walked {
        warn!(error = %err, "Import failed, rolling back");
        if let Err(rollback_err) = repo.rollback() {
            warn!(error = %rollback_err, "Rollback failed");
        }
        return Err(err);
    }

    repo.commit()?;
    info!(
        assemblies = report.assemblies,
        tracks = report.tracks,
        track_adapters = report.track_adapters,
        skipped = report.skipped.len(),
        "Import committed"
    );
    Ok(report)
}
