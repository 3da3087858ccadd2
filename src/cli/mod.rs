//! Command-line interface for jbrowse-config-sync.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **import**: Load a JBrowse configuration into the relational store
//! - **export**: Rebuild a configuration from the relational store
//! - **merge**: Replace the assemblies and tracks of a template configuration
//! - **roundtrip**: Import into memory, export back and compare with the input
//!
//! ## Usage
//!
//! ```text
//! # Create the schema and import a configuration
//! jbrowse-config-sync import config.json --database config.db --init-schema
//!
//! # Export into a fresh config.json, keeping plugins and session from a template
//! jbrowse-config-sync export --database config.db --output config.json --base template.json
//!
//! # Check that a configuration survives the mapping unchanged
//! jbrowse-config-sync roundtrip config.json --format json
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::StoreConfig;
use crate::report::SkippedRecord;

pub mod export;
pub mod import;
pub mod merge;
pub mod roundtrip;

#[derive(Parser)]
#[command(name = "jbrowse-config-sync")]
#[command(author = "Fulcrum Genomics")]
#[command(version)]
#[command(about = "Map JBrowse configurations to and from a relational store")]
#[command(
    long_about = "jbrowse-config-sync imports a JBrowse 2 config.json into a normalized SQLite database and exports it back.\n\nAssemblies, tracks, adapters, displays and renderers each get their own tables, so configurations can be queried and edited relationally and then regenerated:\n- Every adapter type maps to its own table\n- Alignment tracks are linked to the sequence adapter of their assembly\n- Renderer options are kept verbatim"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Import a configuration into the database
    Import(import::ImportArgs),

    /// Export the database as a configuration
    Export(export::ExportArgs),

    /// Merge exported assemblies and tracks into a template configuration
    Merge(merge::MergeArgs),

    /// Import into memory and export back, reporting any difference
    Roundtrip(roundtrip::RoundtripArgs),
}

/// Database options shared by the commands that open the store
#[derive(clap::Args)]
pub struct StoreArgs {
    /// SQLite database file
    #[arg(short, long, required = true)]
    pub database: PathBuf,

    /// Create the tables if they do not exist yet
    #[arg(long)]
    pub init_schema: bool,
}

impl StoreArgs {
    #[must_use]
    pub fn config(&self) -> StoreConfig {
        StoreConfig::new(self.database.clone()).with_init_schema(self.init_schema)
    }
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Print skipped or omitted records, one per line
pub(crate) fn print_skipped(heading: &str, records: &[SkippedRecord]) {
    if records.is_empty() {
        return;
    }
    println!("\n   {heading} ({}):", records.len());
    for record in records {
        println!(
            "   - {} of `{}`: {} ({})",
            record.entity, record.owner, record.reason, record.detail
        );
    }
}
