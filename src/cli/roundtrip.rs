//! Roundtrip command - import into memory, export back and compare.
//!
//! Nothing touches disk besides reading the input. Values export never
//! writes (nulls, empty lists, alias tables without features) do not count
//! as differences.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Args;
use serde_json::Value;

use crate::cli::export::print_export_report;
use crate::cli::import::print_import_report;
use crate::cli::OutputFormat;
use crate::document::{differences, ConfigDocument};
use crate::export::export_config;
use crate::import::import_config;
use crate::store::MemoryRepository;

/// Arguments for the roundtrip command
#[derive(Args)]
pub struct RoundtripArgs {
    /// Configuration file (.json or .json.gz)
    #[arg(required = true)]
    pub config: PathBuf,
}

/// Execute the roundtrip command
///
/// # Errors
///
/// Returns an error if the document cannot be read or imported, or if the
/// exported document differs from the input.
#[allow(clippy::needless_pass_by_value)]
pub fn run(args: RoundtripArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let document = ConfigDocument::load_from_file(&args.config)
        .with_context(|| format!("Failed to load {}", args.config.display()))?;

    let mut repo = MemoryRepository::new();
    let imported = import_config(&mut repo, &document).context("Import failed")?;
    let exported = export_config(&repo).context("Export failed")?;

    let expected = Value::Object(
        [
            ("assemblies".to_string(), Value::Array(document.assemblies)),
            ("tracks".to_string(), Value::Array(document.tracks)),
        ]
        .into_iter()
        .collect(),
    );
    let actual = Value::Object(
        [
            (
                "assemblies".to_string(),
                Value::Array(exported.document.assemblies),
            ),
            ("tracks".to_string(), Value::Array(exported.document.tracks)),
        ]
        .into_iter()
        .collect(),
    );
    let found = differences(&expected, &actual);

    match format {
        OutputFormat::Text => {
            print_import_report(&imported);
            print_export_report(&exported.report);
            if found.is_empty() {
                println!("\nRound trip: identical");
            } else {
                println!("\nRound trip: {} difference(s)", found.len());
                let shown = if verbose { found.len() } else { found.len().min(20) };
                for difference in &found[..shown] {
                    println!("   {difference}");
                }
            }
        }
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "import": &imported,
                "export": &exported.report,
                "differences": &found,
            }))?
        ),
    }

    if !found.is_empty() {
        bail!(
            "{} changed during the round trip",
            args.config.display()
        );
    }
    Ok(())
}
