//! Relational store boundary.
//!
//! The mapper talks to storage only through [`ConfigRepository`]. Every
//! entity lives in its own table keyed by a generated [`RowId`]; every
//! adapter variant has its own table. Two implementations are provided:
//!
//! - [`SqliteRepository`](sqlite::SqliteRepository): SQLite database via `rusqlite`
//! - [`MemoryRepository`](memory::MemoryRepository): in-process tables, used for
//!   dry-run round trips and as the injected fake in tests
//!
//! Reads used by the export pipeline return flat joined rows (see [`rows`]);
//! grouping them back into nested documents is the job of
//! [`crate::export::projection`].

use thiserror::Error;

use crate::core::assembly::{Assembly, Feature, RefNameAlias, SequenceAdapter, SequenceAdapterKind};
use crate::core::display::{Display, Renderer};
use crate::core::track::{Track, TrackAdapter, TrackAdapterKind};
use crate::core::types::{DisplayParent, ParentType, RowId};

pub mod memory;
pub mod rows;
pub mod schema;
pub mod sqlite;

pub use memory::MemoryRepository;
pub use rows::{
    AssemblyRow, DisplayRendererRow, RefNameAliasFeatureRow, SequenceAdapterRow, TrackAdapterRow,
    TrackRow,
};
pub use sqlite::SqliteRepository;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Failed to encode or decode column: {0}")]
    Column(#[from] serde_json::Error),

    #[error("Constraint violated: {0}")]
    Constraint(String),

    #[error("No transaction in progress")]
    NoTransaction,
}

/// Resolves an assembly's persisted sequence adapter by `(name, type)`
pub trait SequenceAdapterLookup {
    /// Identity of the sequence adapter of `kind` belonging to assembly `assembly_name`
    ///
    /// # Errors
    ///
    /// Returns a `StoreError` if the store cannot be queried.
    fn find_sequence_adapter(
        &self,
        assembly_name: &str,
        kind: SequenceAdapterKind,
    ) -> Result<Option<RowId>, StoreError>;
}

/// Everything the import and export pipelines need from a relational store
pub trait ConfigRepository: SequenceAdapterLookup {
    /// Start the all-or-nothing unit that wraps one import run
    ///
    /// # Errors
    ///
    /// Returns a `StoreError` if the store rejects the operation.
    fn begin(&mut self) -> Result<(), StoreError>;

    /// # Errors
    ///
    /// Returns `StoreError::NoTransaction` if `begin` was not called, or the
    /// backend's error if the commit fails.
    fn commit(&mut self) -> Result<(), StoreError>;

    /// Discard every write made since `begin`
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NoTransaction` if `begin` was not called, or the
    /// backend's error if the rollback fails.
    fn rollback(&mut self) -> Result<(), StoreError>;

    /// # Errors
    ///
    /// Returns `StoreError::Constraint` if an assembly with the same name exists.
    fn insert_assembly(&mut self, assembly: &Assembly) -> Result<RowId, StoreError>;

    /// # Errors
    ///
    /// Returns a `StoreError` if the row cannot be written.
    fn insert_sequence_adapter(
        &mut self,
        assembly: RowId,
        adapter: &SequenceAdapter,
    ) -> Result<RowId, StoreError>;

    /// # Errors
    ///
    /// Returns a `StoreError` if the row cannot be written.
    fn insert_ref_name_alias(
        &mut self,
        assembly: RowId,
        alias: &RefNameAlias,
    ) -> Result<RowId, StoreError>;

    /// # Errors
    ///
    /// Returns a `StoreError` if the row cannot be written.
    fn insert_feature(&mut self, ref_name_alias: RowId, feature: &Feature)
        -> Result<RowId, StoreError>;

    /// # Errors
    ///
    /// Returns `StoreError::Constraint` if a track with the same `trackId` exists.
    fn insert_track(&mut self, track: &Track) -> Result<RowId, StoreError>;

    /// # Errors
    ///
    /// Returns a `StoreError` if the row cannot be written.
    fn insert_track_adapter(
        &mut self,
        track: RowId,
        adapter: &TrackAdapter,
    ) -> Result<RowId, StoreError>;

    /// # Errors
    ///
    /// Returns a `StoreError` if the row cannot be written.
    fn insert_display(&mut self, parent: DisplayParent, display: &Display)
        -> Result<RowId, StoreError>;

    /// # Errors
    ///
    /// Returns a `StoreError` if the row cannot be written.
    fn insert_renderer(&mut self, display: RowId, renderer: &Renderer)
        -> Result<RowId, StoreError>;

    /// The adapter `type` tag recorded for a track, looked up by `trackId`
    ///
    /// # Errors
    ///
    /// Returns a `StoreError` if the store cannot be queried.
    fn track_adapter_type(&self, track_id: &str) -> Result<Option<String>, StoreError>;

    /// The adapter row of `kind` owned by a track row
    ///
    /// # Errors
    ///
    /// Returns a `StoreError` if the store cannot be queried.
    fn track_adapter(
        &self,
        kind: TrackAdapterKind,
        track: RowId,
    ) -> Result<Option<TrackAdapterRow>, StoreError>;

    /// All assemblies, lowest identity first
    ///
    /// # Errors
    ///
    /// Returns a `StoreError` if the store cannot be queried.
    fn assemblies(&self) -> Result<Vec<AssemblyRow>, StoreError>;

    /// Sequence adapter rows of every variant
    ///
    /// # Errors
    ///
    /// Returns a `StoreError` if the store cannot be queried.
    fn sequence_adapters(&self) -> Result<Vec<SequenceAdapterRow>, StoreError>;

    /// All tracks, lowest identity first
    ///
    /// # Errors
    ///
    /// Returns a `StoreError` if the store cannot be queried.
    fn tracks(&self) -> Result<Vec<TrackRow>, StoreError>;

    /// Displays of one parent type left-joined with their renderers.
    ///
    /// A display without renderers yields one row whose renderer columns are
    /// all `None`.
    ///
    /// # Errors
    ///
    /// Returns a `StoreError` if the store cannot be queried.
    fn display_renderers(&self, parent: ParentType)
        -> Result<Vec<DisplayRendererRow>, StoreError>;

    /// Reference-name alias rows left-joined with their features
    ///
    /// # Errors
    ///
    /// Returns a `StoreError` if the store cannot be queried.
    fn ref_name_alias_features(&self) -> Result<Vec<RefNameAliasFeatureRow>, StoreError>;
}
