//! Merge command - combine a template configuration with exported fragments.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::cli::OutputFormat;
use crate::document::{load_fragment, ConfigDocument};

/// Arguments for the merge command
#[derive(Args)]
pub struct MergeArgs {
    /// Template configuration
    #[arg(required = true)]
    pub base: PathBuf,

    /// File holding the new assemblies (a JSON array or `{"assemblies": [...]}`)
    #[arg(short, long)]
    pub assemblies: Option<PathBuf>,

    /// File holding the new tracks (a JSON array or `{"tracks": [...]}`)
    #[arg(short, long)]
    pub tracks: Option<PathBuf>,

    /// Where to write the merged configuration
    #[arg(short, long, required = true)]
    pub output: PathBuf,
}

/// Execute the merge command
///
/// A fragment that is not given keeps the template's own array.
///
/// # Errors
///
/// Returns an error if an input cannot be read or the output cannot be written.
#[allow(clippy::needless_pass_by_value)]
pub fn run(args: MergeArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let base = ConfigDocument::load_from_file(&args.base)
        .with_context(|| format!("Failed to load template {}", args.base.display()))?;

    let assemblies = match &args.assemblies {
        Some(path) => load_fragment(path, "assemblies")
            .with_context(|| format!("Failed to load assemblies from {}", path.display()))?,
        None => base.assemblies.clone(),
    };
    let tracks = match &args.tracks {
        Some(path) => load_fragment(path, "tracks")
            .with_context(|| format!("Failed to load tracks from {}", path.display()))?,
        None => base.tracks.clone(),
    };
    if verbose {
        eprintln!(
            "Merging {} assemblies and {} tracks into {}",
            assemblies.len(),
            tracks.len(),
            args.base.display()
        );
    }

    let merged = ConfigDocument::merge_fragments(base, assemblies, tracks);
    merged
        .write_to_file(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    match format {
        OutputFormat::Text => println!(
            "Wrote {} ({} assemblies, {} tracks)",
            args.output.display(),
            merged.assemblies.len(),
            merged.tracks.len()
        ),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "output": args.output.display().to_string(),
                "assemblies": merged.assemblies.len(),
                "tracks": merged.tracks.len(),
            }))?
        ),
    }

    Ok(())
}
