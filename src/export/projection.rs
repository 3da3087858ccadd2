//! Reassembly of flat joined rows into nested document nodes.
//!
//! Joined reads return one row per (parent, child) pair, and a parent with no
//! children still yields one row with null child columns. Rows are grouped by
//! parent identity in a [`BTreeMap`], so siblings always come out lowest
//! identity first regardless of the order the store returned them in.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::core::display::DEFAULT_RENDERER_KEY;
use crate::core::types::RowId;
use crate::dispatch::renderer;
use crate::report::SkippedRecord;
use crate::store::rows::{AssemblyRow, DisplayRendererRow, RefNameAliasFeatureRow, TrackRow};
use crate::utils::json::{insert_non_empty, insert_opt, string_array};

/// Group rows under a parent key, ordered by key; each group keeps the
/// relative order of its rows
pub fn group_by_parent<T, K, F>(rows: impl IntoIterator<Item = T>, key: F) -> BTreeMap<K, Vec<T>>
where
    K: Ord,
    F: Fn(&T) -> K,
{
    let mut groups: BTreeMap<K, Vec<T>> = BTreeMap::new();
    for row in rows {
        groups.entry(key(&row)).or_default().push(row);
    }
    groups
}

/// Display nodes of every parent, plus the number of renderers emitted and
/// the stored renderers that could not be rebuilt
#[derive(Debug, Default)]
pub struct ProjectedDisplays {
    pub by_parent: BTreeMap<RowId, Vec<Value>>,
    pub displays: usize,
    pub renderers: usize,
    pub omitted: Vec<SkippedRecord>,
}

impl ProjectedDisplays {
    /// Remove and return the displays of one parent
    pub fn take(&mut self, parent: RowId) -> Vec<Value> {
        self.by_parent.remove(&parent).unwrap_or_default()
    }
}

/// Collapse `displays LEFT JOIN renderers` rows into display nodes per parent.
///
/// The unnamed renderer is emitted under `renderer`, named ones under the
/// `renderers` map. The null-renderer row of a display without renderers
/// contributes nothing; a stored renderer that cannot be rebuilt is left
/// out of its display and recorded in `omitted`.
#[must_use]
pub fn displays_by_parent(rows: Vec<DisplayRendererRow>) -> ProjectedDisplays {
    let mut projected = ProjectedDisplays::default();

    for (parent, parent_rows) in group_by_parent(rows, |row| row.parent_id) {
        let mut nodes = Vec::new();
        for (_, display_rows) in group_by_parent(parent_rows, |row| row.display_row_id) {
            let Some(first) = display_rows.first() else {
                continue;
            };

            let mut node = Map::new();
            node.insert("type".to_string(), Value::from(first.display_type.as_str()));
            node.insert("displayId".to_string(), Value::from(first.display_id.as_str()));

            let mut named = Map::new();
            let mut ordered = display_rows.iter().collect::<Vec<_>>();
            ordered.sort_by_key(|row| row.renderer_row_id);
            for row in ordered {
                let (key, renderer_node) = match renderer::export(row) {
                    Ok(Some(exported)) => exported,
                    Ok(None) => continue,
                    Err(err) => {
                        projected.omitted.push(SkippedRecord::from_error(
                            "renderer",
                            row.display_id.clone(),
                            &err,
                        ));
                        continue;
                    }
                };
                projected.renderers += 1;
                if key == DEFAULT_RENDERER_KEY {
                    node.insert(DEFAULT_RENDERER_KEY.to_string(), renderer_node);
                } else {
                    named.insert(key, renderer_node);
                }
            }
            if !named.is_empty() {
                node.insert("renderers".to_string(), Value::Object(named));
            }

            nodes.push(Value::Object(node));
            projected.displays += 1;
        }
        projected.by_parent.insert(parent, nodes);
    }

    projected
}

/// Collapse `ref_name_aliases LEFT JOIN features` rows into one
/// `refNameAliases` node per assembly. An alias table without features
/// produces no node; when an assembly has several tables the lowest
/// identity wins.
#[must_use]
pub fn ref_name_aliases_by_assembly(rows: Vec<RefNameAliasFeatureRow>) -> BTreeMap<RowId, Value> {
    let mut by_assembly = BTreeMap::new();

    for (assembly, assembly_rows) in group_by_parent(rows, |row| row.assembly_id) {
        let Some((_, alias_rows)) = group_by_parent(assembly_rows, |row| row.alias_row_id)
            .into_iter()
            .next()
        else {
            continue;
        };

        let mut ordered = alias_rows.iter().collect::<Vec<_>>();
        ordered.sort_by_key(|row| row.feature_row_id);
        let features: Vec<Value> = ordered.into_iter().filter_map(feature_node).collect();
        if features.is_empty() {
            continue;
        }

        let Some(first) = alias_rows.first() else {
            continue;
        };
        let mut adapter = Map::new();
        adapter.insert("type".to_string(), Value::from(first.adapter_type.as_str()));
        insert_opt(
            &mut adapter,
            "adapterId",
            first.adapter_id.as_deref().map(Value::from),
        );
        adapter.insert("features".to_string(), Value::Array(features));

        let mut node = Map::new();
        node.insert("adapter".to_string(), Value::Object(adapter));
        by_assembly.insert(assembly, Value::Object(node));
    }

    by_assembly
}

fn feature_node(row: &RefNameAliasFeatureRow) -> Option<Value> {
    row.feature_row_id?;
    let ref_name = row.ref_name.as_deref()?;

    let mut node = Map::new();
    node.insert("refName".to_string(), Value::from(ref_name));
    insert_opt(&mut node, "uniqueId", row.unique_id.as_deref().map(Value::from));
    insert_non_empty(&mut node, "aliases", row.aliases.as_deref().unwrap_or_default());
    Some(Value::Object(node))
}

/// Build an assembly node. `aliases` is always present; empty sequence
/// displays and an absent alias table are left out.
#[must_use]
pub fn assembly_node(
    row: &AssemblyRow,
    adapter: Option<Value>,
    displays: Vec<Value>,
    ref_name_aliases: Option<Value>,
) -> Value {
    let mut sequence = Map::new();
    sequence.insert("type".to_string(), Value::from(row.sequence_type.as_str()));
    sequence.insert("trackId".to_string(), Value::from(row.sequence_track_id.as_str()));
    insert_opt(&mut sequence, "adapter", adapter);
    if !displays.is_empty() {
        sequence.insert("displays".to_string(), Value::Array(displays));
    }

    let mut node = Map::new();
    node.insert("name".to_string(), Value::from(row.name.as_str()));
    insert_opt(
        &mut node,
        "displayName",
        row.display_name.as_deref().map(Value::from),
    );
    node.insert("aliases".to_string(), string_array(&row.aliases));
    node.insert("sequence".to_string(), Value::Object(sequence));
    insert_opt(&mut node, "refNameAliases", ref_name_aliases);
    Value::Object(node)
}

/// Build a track node. `assemblyNames` and `displays` are always present;
/// an empty `category` is left out.
#[must_use]
pub fn track_node(row: &TrackRow, adapter: Option<Value>, displays: Vec<Value>) -> Value {
    let mut node = Map::new();
    node.insert("type".to_string(), Value::from(row.track_type.as_str()));
    node.insert("trackId".to_string(), Value::from(row.track_id.as_str()));
    node.insert("name".to_string(), Value::from(row.name.as_str()));
    node.insert("assemblyNames".to_string(), string_array(&row.assembly_names));
    insert_non_empty(&mut node, "category", &row.category);
    insert_opt(&mut node, "adapter", adapter);
    node.insert("displays".to_string(), Value::Array(displays));
    Value::Object(node)
}
