//! Cross-entity reference resolution.
//!
//! Alignment adapters refer to an assembly's sequence adapter. On import the
//! reference is resolved by `(assembly name, adapter type)` through the store;
//! on export it is followed back by `(adapter type, row id)` through an index
//! over the sequence adapter rows.

use std::collections::HashMap;

use tracing::debug;

use crate::core::assembly::SequenceAdapterKind;
use crate::core::track::SequenceAdapterRef;
use crate::core::types::RowId;
use crate::store::rows::SequenceAdapterRow;
use crate::store::{SequenceAdapterLookup, StoreError};

/// Resolve the persisted sequence adapter of `kind` for assembly `assembly_name`
///
/// # Errors
///
/// Returns a `StoreError` if the lookup query fails.
pub fn resolve_sequence_adapter(
    lookup: &dyn SequenceAdapterLookup,
    assembly_name: &str,
    kind: SequenceAdapterKind,
) -> Result<Option<SequenceAdapterRef>, StoreError> {
    let found = lookup.find_sequence_adapter(assembly_name, kind)?;
    debug!(assembly = %assembly_name, adapter_type = %kind, found = ?found, "Resolved sequence adapter");
    Ok(found.map(|id| SequenceAdapterRef { kind, id }))
}

/// Sequence adapter rows indexed both ways
pub struct SequenceAdapterIndex<'a> {
    by_reference: HashMap<(&'a str, RowId), &'a SequenceAdapterRow>,
    by_assembly: HashMap<(RowId, &'a str), &'a SequenceAdapterRow>,
}

impl<'a> SequenceAdapterIndex<'a> {
    /// Index the rows; when an assembly has several rows of one type the
    /// lowest identity wins
    #[must_use]
    pub fn new(rows: &'a [SequenceAdapterRow]) -> Self {
        let mut by_reference = HashMap::new();
        let mut by_assembly: HashMap<(RowId, &'a str), &'a SequenceAdapterRow> = HashMap::new();

        for row in rows {
            by_reference.insert((row.adapter_type.as_str(), row.id), row);
            by_assembly
                .entry((row.assembly_id, row.adapter_type.as_str()))
                .and_modify(|current| {
                    if row.id < current.id {
                        *current = row;
                    }
                })
                .or_insert(row);
        }

        Self {
            by_reference,
            by_assembly,
        }
    }

    /// The row an alignment adapter points at
    #[must_use]
    pub fn by_reference(&self, adapter_type: &str, id: RowId) -> Option<&'a SequenceAdapterRow> {
        self.by_reference.get(&(adapter_type, id)).copied()
    }

    /// The adapter row of an assembly, matched on the type recorded for it
    #[must_use]
    pub fn for_assembly(&self, assembly: RowId, adapter_type: &str) -> Option<&'a SequenceAdapterRow> {
        self.by_assembly.get(&(assembly, adapter_type)).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Location;

    fn row(id: RowId, assembly_id: RowId, adapter_type: &str) -> SequenceAdapterRow {
        SequenceAdapterRow {
            id,
            assembly_id,
            adapter_type: adapter_type.to_string(),
            fasta_location: Some(Location::new(format!("{id}.fa"))),
            fai_location: Some(Location::new(format!("{id}.fa.fai"))),
            gzi_location: None,
            metadata_location: None,
        }
    }

    #[test]
    fn test_ids_are_scoped_by_type() {
        let rows = vec![
            row(1, 1, "IndexedFastaAdapter"),
            row(1, 2, "BgzipFastaAdapter"),
        ];
        let index = SequenceAdapterIndex::new(&rows);

        assert_eq!(
            index.by_reference("BgzipFastaAdapter", 1).map(|r| r.assembly_id),
            Some(2)
        );
        assert_eq!(
            index.by_reference("IndexedFastaAdapter", 1).map(|r| r.assembly_id),
            Some(1)
        );
        assert!(index.by_reference("IndexedFastaAdapter", 2).is_none());
    }

    #[test]
    fn test_for_assembly_prefers_lowest_id() {
        let rows = vec![
            row(4, 1, "IndexedFastaAdapter"),
            row(2, 1, "IndexedFastaAdapter"),
        ];
        let index = SequenceAdapterIndex::new(&rows);

        assert_eq!(
            index.for_assembly(1, "IndexedFastaAdapter").map(|r| r.id),
            Some(2)
        );
        assert!(index.for_assembly(1, "BgzipFastaAdapter").is_none());
    }
}
