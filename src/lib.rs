//! # jbrowse-config-sync
//!
//! A library for mapping JBrowse 2 configuration documents to and from a
//! normalized relational store.
//!
//! A `config.json` nests assemblies, tracks, typed adapters, displays and
//! renderers several levels deep, with the shape of each node chosen by a
//! `type` tag. `jbrowse-config-sync` decomposes such a document into one
//! table per entity and per adapter variant, and rebuilds the exact document
//! shape from those tables.
//!
//! ## Features
//!
//! - **Typed dispatch**: one handler table per polymorphic family; an unknown
//!   `type` is skipped with a warning instead of failing the run
//! - **All-or-nothing import**: a fatal error rolls back every write of the run
//! - **Reference resolution**: Bam/Cram tracks are linked to the persisted
//!   sequence adapter of their assembly instead of storing a copy
//! - **Opaque renderers**: renderer options round-trip without the mapper
//!   knowing them
//! - **Pluggable store**: SQLite, or in memory for dry runs and tests
//!
//! ## Example
//!
//! ```rust,no_run
//! use jbrowse_config_sync::{export_config, import_config, ConfigDocument, MemoryRepository};
//!
//! let document = ConfigDocument::load_from_file("config.json".as_ref()).unwrap();
//!
//! let mut repo = MemoryRepository::new();
//! let report = import_config(&mut repo, &document).unwrap();
//! println!("{} tracks imported, {} skipped", report.tracks, report.skipped.len());
//!
//! let outcome = export_config(&repo).unwrap();
//! outcome.document.write_to_file("exported.json".as_ref()).unwrap();
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Typed model of assemblies, tracks, adapters, displays and renderers
//! - [`dispatch`]: Handler tables keyed by `type` tag
//! - [`import`]: Document walker and import pipeline
//! - [`export`]: Row reassembly and export pipeline
//! - [`store`]: Repository trait with SQLite and in-memory implementations
//! - [`document`]: Document I/O and template merging
//! - [`cli`]: Command-line interface implementation

pub mod cli;
pub mod config;
pub mod core;
pub mod dispatch;
pub mod document;
pub mod error;
pub mod export;
pub mod import;
pub mod report;
pub mod store;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::StoreConfig;
pub use document::ConfigDocument;
pub use error::{ErrorKind, MapperError};
pub use export::{export_config, ExportOutcome};
pub use import::import_config;
pub use report::{ExportReport, ImportReport, SkipReason, SkippedRecord};
pub use store::{ConfigRepository, MemoryRepository, SqliteRepository, StoreError};
