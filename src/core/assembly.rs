//! Assembly-side entities: the reference sequence, its FASTA adapter and the
//! optional reference-name alias table.

use serde::{Deserialize, Serialize};

use crate::core::display::Display;
use crate::core::types::{Location, Resolution};

/// FASTA adapter variants an assembly's reference sequence can use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SequenceAdapterKind {
    /// Uncompressed FASTA with a `.fai` index
    IndexedFasta,
    /// bgzip-compressed FASTA with `.fai` and `.gzi` indexes
    BgzipFasta,
}

impl SequenceAdapterKind {
    pub const ALL: [Self; 2] = [Self::IndexedFasta, Self::BgzipFasta];

    /// The document `type` tag
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::IndexedFasta => "IndexedFastaAdapter",
            Self::BgzipFasta => "BgzipFastaAdapter",
        }
    }

    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    /// Table holding rows of this variant
    #[must_use]
    pub fn table(self) -> &'static str {
        match self {
            Self::IndexedFasta => "indexed_fasta_adapters",
            Self::BgzipFasta => "bgzip_fasta_adapters",
        }
    }

    /// Only the bgzip variant carries a `gziLocation`
    #[must_use]
    pub fn has_gzi(self) -> bool {
        matches!(self, Self::BgzipFasta)
    }
}

impl std::fmt::Display for SequenceAdapterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Where an assembly's FASTA and its indexes live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceAdapter {
    pub kind: SequenceAdapterKind,
    pub fasta_location: Location,
    pub fai_location: Location,
    /// Always `None` for [`SequenceAdapterKind::IndexedFasta`]
    pub gzi_location: Option<Location>,
    pub metadata_location: Option<Location>,
}

/// The reference sequence track of an assembly
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    pub track_id: String,
    pub sequence_type: String,
    /// The adapter's `type` tag as found in the document
    pub adapter_type: String,
    pub adapter: Resolution<SequenceAdapter>,
    pub displays: Vec<Display>,
}

/// One row of a reference-name alias table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    pub ref_name: String,
    pub unique_id: Option<String>,
    pub aliases: Vec<String>,
}

/// Alternate contig names for an assembly
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefNameAlias {
    pub adapter_type: String,
    pub adapter_id: Option<String>,
    pub features: Vec<Feature>,
}

/// A named reference genome
#[derive(Debug, Clone, PartialEq)]
pub struct Assembly {
    pub name: String,
    pub display_name: Option<String>,
    pub aliases: Vec<String>,
    pub sequence: Sequence,
    pub ref_name_aliases: Option<RefNameAlias>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tag_roundtrip() {
        for kind in SequenceAdapterKind::ALL {
            assert_eq!(SequenceAdapterKind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(SequenceAdapterKind::from_tag("TwoBitAdapter"), None);
    }

    #[test]
    fn test_only_bgzip_has_gzi() {
        assert!(SequenceAdapterKind::BgzipFasta.has_gzi());
        assert!(!SequenceAdapterKind::IndexedFasta.has_gzi());
    }
}
