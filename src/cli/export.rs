//! Export command - rebuild a configuration document from the database.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::cli::{print_skipped, OutputFormat, StoreArgs};
use crate::document::ConfigDocument;
use crate::export::export_config;
use crate::report::ExportReport;

/// Arguments for the export command
#[derive(Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Where to write the configuration
    #[arg(short, long, required = true)]
    pub output: PathBuf,

    /// Template whose other top-level keys (plugins, session, ...) are kept
    #[arg(short, long)]
    pub base: Option<PathBuf>,
}

/// Execute the export command
///
/// # Errors
///
/// Returns an error if the database cannot be read or the output cannot be
/// written. The output file is untouched unless the whole export succeeds.
#[allow(clippy::needless_pass_by_value)]
pub fn run(args: ExportArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let repo = args
        .store
        .config()
        .open()
        .with_context(|| format!("Failed to open database {}", args.store.database.display()))?;

    let outcome = export_config(&repo).context("Export failed")?;

    let document = match &args.base {
        Some(base) => {
            let template = ConfigDocument::load_from_file(base)
                .with_context(|| format!("Failed to load template {}", base.display()))?;
            if verbose {
                eprintln!("Merging into template {}", base.display());
            }
            ConfigDocument::merge_fragments(
                template,
                outcome.document.assemblies,
                outcome.document.tracks,
            )
        }
        None => outcome.document,
    };

    document
        .write_to_file(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    match format {
        OutputFormat::Text => {
            println!("Wrote {}", args.output.display());
            print_export_report(&outcome.report);
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome.report)?),
    }

    Ok(())
}

pub(crate) fn print_export_report(report: &ExportReport) {
    println!("\nExported:");
    println!("   Assemblies: {}", report.assemblies);
    println!("   Tracks: {}", report.tracks);
    println!("   Adapters: {}", report.adapters);
    println!(
        "   Displays: {} ({} renderers)",
        report.displays, report.renderers
    );
    print_skipped("Omitted", &report.omitted);
}
