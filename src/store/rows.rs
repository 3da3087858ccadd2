//! Rows as they come back from the store.
//!
//! Columns that a well-formed import always fills are plain values; columns
//! that may legitimately be empty, or that come from the nullable side of a
//! LEFT JOIN, are `Option`s. The export dispatcher decides what a missing
//! required column means.

use crate::core::display::RendererPayload;
use crate::core::types::{Location, RowId};

#[derive(Debug, Clone, PartialEq)]
pub struct AssemblyRow {
    pub id: RowId,
    pub name: String,
    pub display_name: Option<String>,
    pub aliases: Vec<String>,
    pub sequence_track_id: String,
    pub sequence_type: String,
    /// Tag of the sequence adapter found at import, known or not
    pub adapter_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SequenceAdapterRow {
    pub id: RowId,
    pub assembly_id: RowId,
    pub adapter_type: String,
    pub fasta_location: Option<Location>,
    pub fai_location: Option<Location>,
    pub gzi_location: Option<Location>,
    pub metadata_location: Option<Location>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackRow {
    pub id: RowId,
    pub track_id: String,
    pub track_type: String,
    pub name: String,
    pub assembly_names: Vec<String>,
    pub category: Vec<String>,
    pub adapter_type: Option<String>,
}

/// One row of any track adapter table; columns a family lacks stay `None`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackAdapterRow {
    pub id: RowId,
    pub track_id: RowId,
    pub data_location: Option<Location>,
    pub index_location: Option<Location>,
    pub index_type: Option<String>,
    pub sequence_adapter_id: Option<RowId>,
    pub sequence_adapter_type: Option<String>,
    pub assembly_names: Option<Vec<String>>,
}

/// `displays LEFT JOIN renderers`
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayRendererRow {
    pub display_row_id: RowId,
    pub parent_id: RowId,
    pub display_id: String,
    pub display_type: String,
    pub renderer_row_id: Option<RowId>,
    pub renderer_key: Option<String>,
    pub renderer_type: Option<String>,
    pub renderer_details: Option<RendererPayload>,
}

/// `ref_name_aliases LEFT JOIN ref_name_alias_features`
#[derive(Debug, Clone, PartialEq)]
pub struct RefNameAliasFeatureRow {
    pub alias_row_id: RowId,
    pub assembly_id: RowId,
    pub adapter_type: String,
    pub adapter_id: Option<String>,
    pub feature_row_id: Option<RowId>,
    pub ref_name: Option<String>,
    pub unique_id: Option<String>,
    pub aliases: Option<Vec<String>>,
}
