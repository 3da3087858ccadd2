//! In-process [`ConfigRepository`] with the same contract as the SQLite one.
//!
//! Each table is a vector; identities are assigned per table starting at 1.
//! A transaction snapshots every table and restores the snapshot on rollback.

use crate::core::assembly::{Assembly, Feature, RefNameAlias, SequenceAdapter, SequenceAdapterKind};
use crate::core::display::{Display, Renderer};
use crate::core::track::{Track, TrackAdapter, TrackAdapterKind};
use crate::core::types::{DisplayParent, ParentType, RowId};
use crate::store::rows::{
    AssemblyRow, DisplayRendererRow, RefNameAliasFeatureRow, SequenceAdapterRow, TrackAdapterRow,
    TrackRow,
};
use crate::store::{ConfigRepository, SequenceAdapterLookup, StoreError};

#[derive(Debug, Clone)]
struct AliasRow {
    id: RowId,
    assembly_id: RowId,
    adapter_type: String,
    adapter_id: Option<String>,
}

#[derive(Debug, Clone)]
struct FeatureRow {
    id: RowId,
    alias_id: RowId,
    feature: Feature,
}

#[derive(Debug, Clone)]
struct DisplayRow {
    id: RowId,
    parent: DisplayParent,
    display_id: String,
    display_type: String,
}

#[derive(Debug, Clone)]
struct RendererRow {
    id: RowId,
    display_id: RowId,
    renderer: Renderer,
}

#[derive(Debug, Clone, Default)]
struct Tables {
    assemblies: Vec<AssemblyRow>,
    sequence_adapters: Vec<(SequenceAdapterKind, SequenceAdapterRow)>,
    aliases: Vec<AliasRow>,
    features: Vec<FeatureRow>,
    tracks: Vec<TrackRow>,
    track_adapters: Vec<(TrackAdapterKind, TrackAdapterRow)>,
    displays: Vec<DisplayRow>,
    renderers: Vec<RendererRow>,
}

/// Next identity for a table holding `len` rows
fn next_id(len: usize) -> RowId {
    RowId::try_from(len).map_or(RowId::MAX, |n| n + 1)
}

/// A configuration store that lives only as long as the process
#[derive(Debug, Default)]
pub struct MemoryRepository {
    tables: Tables,
    snapshot: Option<Tables>,
}

impl MemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SequenceAdapterLookup for MemoryRepository {
    fn find_sequence_adapter(
        &self,
        assembly_name: &str,
        kind: SequenceAdapterKind,
    ) -> Result<Option<RowId>, StoreError> {
        let Some(assembly) = self.tables.assemblies.iter().find(|a| a.name == assembly_name)
        else {
            return Ok(None);
        };

        Ok(self
            .tables
            .sequence_adapters
            .iter()
            .filter(|(k, row)| *k == kind && row.assembly_id == assembly.id)
            .map(|(_, row)| row.id)
            .min())
    }
}

impl ConfigRepository for MemoryRepository {
    fn begin(&mut self) -> Result<(), StoreError> {
        self.snapshot = Some(self.tables.clone());
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        self.snapshot.take().ok_or(StoreError::NoTransaction)?;
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), StoreError> {
        self.tables = self.snapshot.take().ok_or(StoreError::NoTransaction)?;
        Ok(())
    }

    fn insert_assembly(&mut self, assembly: &Assembly) -> Result<RowId, StoreError> {
        if self.tables.assemblies.iter().any(|a| a.name == assembly.name) {
            return Err(StoreError::Constraint(format!(
                "duplicate assembly `{}`",
                assembly.name
            )));
        }

        let id = next_id(self.tables.assemblies.len());
        self.tables.assemblies.push(AssemblyRow {
            id,
            name: assembly.name.clone(),
            display_name: assembly.display_name.clone(),
            aliases: assembly.aliases.clone(),
            sequence_track_id: assembly.sequence.track_id.clone(),
            sequence_type: assembly.sequence.sequence_type.clone(),
            adapter_type: Some(assembly.sequence.adapter_type.clone()),
        });
        Ok(id)
    }

    fn insert_sequence_adapter(
        &mut self,
        assembly: RowId,
        adapter: &SequenceAdapter,
    ) -> Result<RowId, StoreError> {
        let existing = self
            .tables
            .sequence_adapters
            .iter()
            .filter(|(kind, _)| *kind == adapter.kind)
            .count();
        let id = next_id(existing);

        self.tables.sequence_adapters.push((
            adapter.kind,
            SequenceAdapterRow {
                id,
                assembly_id: assembly,
                adapter_type: adapter.kind.tag().to_string(),
                fasta_location: Some(adapter.fasta_location.clone()),
                fai_location: Some(adapter.fai_location.clone()),
                gzi_location: adapter.gzi_location.clone(),
                metadata_location: adapter.metadata_location.clone(),
            },
        ));
        Ok(id)
    }

    fn insert_ref_name_alias(
        &mut self,
        assembly: RowId,
        alias: &RefNameAlias,
    ) -> Result<RowId, StoreError> {
        let id = next_id(self.tables.aliases.len());
        self.tables.aliases.push(AliasRow {
            id,
            assembly_id: assembly,
            adapter_type: alias.adapter_type.clone(),
            adapter_id: alias.adapter_id.clone(),
        });
        Ok(id)
    }

    fn insert_feature(
        &mut self,
        ref_name_alias: RowId,
        feature: &Feature,
    ) -> Result<RowId, StoreError> {
        let id = next_id(self.tables.features.len());
        self.tables.features.push(FeatureRow {
            id,
            alias_id: ref_name_alias,
            feature: feature.clone(),
        });
        Ok(id)
    }

    fn insert_track(&mut self, track: &Track) -> Result<RowId, StoreError> {
        if self.tables.tracks.iter().any(|t| t.track_id == track.track_id) {
            return Err(StoreError::Constraint(format!(
                "duplicate track `{}`",
                track.track_id
            )));
        }

        let id = next_id(self.tables.tracks.len());
        self.tables.tracks.push(TrackRow {
            id,
            track_id: track.track_id.clone(),
            track_type: track.track_type.clone(),
            name: track.name.clone(),
            assembly_names: track.assembly_names.clone(),
            category: track.category.clone(),
            adapter_type: Some(track.adapter_type.clone()),
        });
        Ok(id)
    }

    fn insert_track_adapter(
        &mut self,
        track: RowId,
        adapter: &TrackAdapter,
    ) -> Result<RowId, StoreError> {
        let kind = adapter.kind();
        let existing = self
            .tables
            .track_adapters
            .iter()
            .filter(|(k, _)| *k == kind)
            .count();

        let mut row = TrackAdapterRow {
            id: next_id(existing),
            track_id: track,
            data_location: Some(adapter.data_location().clone()),
            ..TrackAdapterRow::default()
        };
        match adapter {
            TrackAdapter::Tabix(a) => {
                row.index_location = Some(a.index.location.clone());
                row.index_type.clone_from(&a.index.index_type);
            }
            TrackAdapter::Alignment(a) => {
                row.index_location = Some(a.index.location.clone());
                row.index_type.clone_from(&a.index.index_type);
                row.sequence_adapter_id = Some(a.sequence_adapter.id);
                row.sequence_adapter_type = Some(a.sequence_adapter.kind.tag().to_string());
            }
            TrackAdapter::Comparative(a) => {
                row.assembly_names = Some(a.assembly_names.clone());
            }
        }

        let id = row.id;
        self.tables.track_adapters.push((kind, row));
        Ok(id)
    }

    fn insert_display(
        &mut self,
        parent: DisplayParent,
        display: &Display,
    ) -> Result<RowId, StoreError> {
        let id = next_id(self.tables.displays.len());
        self.tables.displays.push(DisplayRow {
            id,
            parent,
            display_id: display.display_id.clone(),
            display_type: display.display_type.clone(),
        });
        Ok(id)
    }

    fn insert_renderer(&mut self, display: RowId, renderer: &Renderer) -> Result<RowId, StoreError> {
        let id = next_id(self.tables.renderers.len());
        self.tables.renderers.push(RendererRow {
            id,
            display_id: display,
            renderer: renderer.clone(),
        });
        Ok(id)
    }

    fn track_adapter_type(&self, track_id: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .tables
            .tracks
            .iter()
            .find(|t| t.track_id == track_id)
            .and_then(|t| t.adapter_type.clone()))
    }

    fn track_adapter(
        &self,
        kind: TrackAdapterKind,
        track: RowId,
    ) -> Result<Option<TrackAdapterRow>, StoreError> {
        Ok(self
            .tables
            .track_adapters
            .iter()
            .filter(|(k, row)| *k == kind && row.track_id == track)
            .map(|(_, row)| row)
            .min_by_key(|row| row.id)
            .cloned())
    }

    fn assemblies(&self) -> Result<Vec<AssemblyRow>, StoreError> {
        Ok(self.tables.assemblies.clone())
    }

    fn sequence_adapters(&self) -> Result<Vec<SequenceAdapterRow>, StoreError> {
        Ok(self
            .tables
            .sequence_adapters
            .iter()
            .map(|(_, row)| row.clone())
            .collect())
    }

    fn tracks(&self) -> Result<Vec<TrackRow>, StoreError> {
        Ok(self.tables.tracks.clone())
    }

    fn display_renderers(
        &self,
        parent: ParentType,
    ) -> Result<Vec<DisplayRendererRow>, StoreError> {
        let mut rows = Vec::new();

        for display in self
            .tables
            .displays
            .iter()
            .filter(|d| d.parent.parent_type == parent)
        {
            let base = DisplayRendererRow {
                display_row_id: display.id,
                parent_id: display.parent.id,
                display_id: display.display_id.clone(),
                display_type: display.display_type.clone(),
                renderer_row_id: None,
                renderer_key: None,
                renderer_type: None,
                renderer_details: None,
            };

            let renderers: Vec<_> = self
                .tables
                .renderers
                .iter()
                .filter(|r| r.display_id == display.id)
                .collect();

            if renderers.is_empty() {
                rows.push(base);
                continue;
            }

            for r in renderers {
                rows.push(DisplayRendererRow {
                    renderer_row_id: Some(r.id),
                    renderer_key: Some(r.renderer.key.clone()),
                    renderer_type: Some(r.renderer.renderer_type.clone()),
                    renderer_details: Some(r.renderer.payload.clone()),
                    ..base.clone()
                });
            }
        }

        rows.sort_by_key(|r| (r.parent_id, r.display_row_id, r.renderer_row_id));
        Ok(rows)
    }

    fn ref_name_alias_features(&self) -> Result<Vec<RefNameAliasFeatureRow>, StoreError> {
        let mut rows = Vec::new();

        for alias in &self.tables.aliases {
            let base = RefNameAliasFeatureRow {
                alias_row_id: alias.id,
                assembly_id: alias.assembly_id,
                adapter_type: alias.adapter_type.clone(),
                adapter_id: alias.adapter_id.clone(),
                feature_row_id: None,
                ref_name: None,
                unique_id: None,
                aliases: None,
            };

            let features: Vec<_> = self
                .tables
                .features
                .iter()
                .filter(|f| f.alias_id == alias.id)
                .collect();

            if features.is_empty() {
                rows.push(base);
                continue;
            }

            for f in features {
                rows.push(RefNameAliasFeatureRow {
                    feature_row_id: Some(f.id),
                    ref_name: Some(f.feature.ref_name.clone()),
                    unique_id: f.feature.unique_id.clone(),
                    aliases: Some(f.feature.aliases.clone()),
                    ..base.clone()
                });
            }
        }

        rows.sort_by_key(|r| (r.assembly_id, r.alias_row_id, r.feature_row_id));
        Ok(rows)
    }
}
