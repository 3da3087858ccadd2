use serde::{Deserialize, Serialize};

use crate::core::assembly::SequenceAdapterKind;
use crate::core::display::Display;
use crate::core::types::{Location, RowId};

/// How a track adapter variant decomposes into relational columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterFamily {
    /// Compressed data file plus a tabix/CSI index
    Tabix,
    /// Alignment file plus index, bound to an assembly's sequence adapter
    Alignment,
    /// Pairwise alignment between assemblies, no index
    Comparative,
}

/// Track adapter variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TrackAdapterKind {
    Gff3Tabix,
    BedTabix,
    VcfTabix,
    Bam,
    Cram,
    Paf,
    Delta,
}

impl TrackAdapterKind {
    pub const ALL: [Self; 7] = [
        Self::Gff3Tabix,
        Self::BedTabix,
        Self::VcfTabix,
        Self::Bam,
        Self::Cram,
        Self::Paf,
        Self::Delta,
    ];

    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::Gff3Tabix => "Gff3TabixAdapter",
            Self::BedTabix => "BedTabixAdapter",
            Self::VcfTabix => "VcfTabixAdapter",
            Self::Bam => "BamAdapter",
            Self::Cram => "CramAdapter",
            Self::Paf => "PAFAdapter",
            Self::Delta => "DeltaAdapter",
        }
    }

    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    #[must_use]
    pub fn family(self) -> AdapterFamily {
        match self {
            Self::Gff3Tabix | Self::BedTabix | Self::VcfTabix => AdapterFamily::Tabix,
            Self::Bam | Self::Cram => AdapterFamily::Alignment,
            Self::Paf | Self::Delta => AdapterFamily::Comparative,
        }
    }

    #[must_use]
    pub fn table(self) -> &'static str {
        match self {
            Self::Gff3Tabix => "gff3_tabix_adapters",
            Self::BedTabix => "bed_tabix_adapters",
            Self::VcfTabix => "vcf_tabix_adapters",
            Self::Bam => "bam_adapters",
            Self::Cram => "cram_adapters",
            Self::Paf => "paf_adapters",
            Self::Delta => "delta_adapters",
        }
    }

    /// Minimum number of assembly names the variant needs; comparative
    /// adapters count their own `assemblyNames`, the rest count the track's
    #[must_use]
    pub fn min_assembly_names(self) -> usize {
        match self.family() {
            AdapterFamily::Tabix | AdapterFamily::Alignment => 1,
            AdapterFamily::Comparative => 2,
        }
    }
}

impl std::fmt::Display for TrackAdapterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// An index file plus its optional `indexType` (e.g. `CSI`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexLocation {
    pub location: Location,
    pub index_type: Option<String>,
}

/// A persisted sequence adapter resolved by assembly name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceAdapterRef {
    pub kind: SequenceAdapterKind,
    pub id: RowId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabixAdapter {
    pub kind: TrackAdapterKind,
    pub data_location: Location,
    pub index: IndexLocation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentAdapter {
    pub kind: TrackAdapterKind,
    pub data_location: Location,
    pub index: IndexLocation,
    pub sequence_adapter: SequenceAdapterRef,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparativeAdapter {
    pub kind: TrackAdapterKind,
    pub data_location: Location,
    pub assembly_names: Vec<String>,
}

/// A resolved track adapter ready to persist
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackAdapter {
    Tabix(TabixAdapter),
    Alignment(AlignmentAdapter),
    Comparative(ComparativeAdapter),
}

impl TrackAdapter {
    #[must_use]
    pub fn kind(&self) -> TrackAdapterKind {
        match self {
            Self::Tabix(a) => a.kind,
            Self::Alignment(a) => a.kind,
            Self::Comparative(a) => a.kind,
        }
    }

    #[must_use]
    pub fn data_location(&self) -> &Location {
        match self {
            Self::Tabix(a) => &a.data_location,
            Self::Alignment(a) => &a.data_location,
            Self::Comparative(a) => &a.data_location,
        }
    }
}

/// A data track. The adapter is dispatched separately because alignment
/// adapters need a store lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub track_id: String,
    pub track_type: String,
    pub name: String,
    pub assembly_names: Vec<String>,
    pub category: Vec<String>,
    /// The adapter's `type` tag as found in the document
    pub adapter_type: String,
    pub displays: Vec<Display>,
}
