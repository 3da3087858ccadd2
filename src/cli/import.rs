//! Import command - load a configuration document into the database.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::cli::{print_skipped, OutputFormat, StoreArgs};
use crate::document::ConfigDocument;
use crate::import::import_config;
use crate::report::ImportReport;

/// Arguments for the import command
#[derive(Args)]
pub struct ImportArgs {
    /// Configuration file (.json or .json.gz)
    #[arg(required = true)]
    pub config: PathBuf,

    #[command(flatten)]
    pub store: StoreArgs,
}

/// Execute the import command
///
/// # Errors
///
/// Returns an error if the document cannot be read, the database cannot be
/// opened, or the import hits a fatal error (in which case nothing is kept).
#[allow(clippy::needless_pass_by_value)]
pub fn run(args: ImportArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let document = ConfigDocument::load_from_file(&args.config)
        .with_context(|| format!("Failed to load {}", args.config.display()))?;
    if verbose {
        eprintln!(
            "Loaded {}: {} assemblies, {} tracks",
            args.config.display(),
            document.assemblies.len(),
            document.tracks.len()
        );
    }

    let mut repo = args
        .store
        .config()
        .open()
        .with_context(|| format!("Failed to open database {}", args.store.database.display()))?;

    let report = import_config(&mut repo, &document)
        .with_context(|| format!("Import of {} rolled back", args.config.display()))?;

    match format {
        OutputFormat::Text => print_import_report(&report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(())
}

pub(crate) fn print_import_report(report: &ImportReport) {
    println!("\nImported:");
    println!(
        "   Assemblies: {} ({} sequence adapters, {} alias features)",
        report.assemblies, report.sequence_adapters, report.ref_name_alias_features
    );
    println!(
        "   Tracks: {} ({} adapters)",
        report.tracks, report.track_adapters
    );
    println!(
        "   Displays: {} ({} renderers)",
        report.displays, report.renderers
    );
    print_skipped("Skipped", &report.skipped);
}
