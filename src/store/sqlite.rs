//! SQLite-backed [`ConfigRepository`].
//!
//! List, location and renderer payload columns are stored as JSON text.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::core::assembly::{Assembly, Feature, RefNameAlias, SequenceAdapter, SequenceAdapterKind};
use crate::core::display::{Display, Renderer};
use crate::core::track::{AdapterFamily, Track, TrackAdapter, TrackAdapterKind};
use crate::core::types::{DisplayParent, Location, ParentType, RowId};
use crate::store::rows::{
    AssemblyRow, DisplayRendererRow, RefNameAliasFeatureRow, SequenceAdapterRow, TrackAdapterRow,
    TrackRow,
};
use crate::store::schema::init_schema;
use crate::store::{ConfigRepository, SequenceAdapterLookup, StoreError};

fn to_json_text<T: Serialize + ?Sized>(value: &T) -> Result<String, StoreError> {
    Ok(serde_json::to_string(value)?)
}

fn from_json_text<T: DeserializeOwned>(text: Option<String>) -> Result<Option<T>, StoreError> {
    text.map(|t| serde_json::from_str(&t))
        .transpose()
        .map_err(StoreError::from)
}

fn list_from_json_text(text: String) -> Result<Vec<String>, StoreError> {
    Ok(serde_json::from_str(&text)?)
}

fn location_text(location: Option<&Location>) -> Result<Option<String>, StoreError> {
    location.map(to_json_text).transpose()
}

/// Map a UNIQUE violation to `StoreError::Constraint`
fn constraint_or(err: rusqlite::Error, what: &str) -> StoreError {
    match err {
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            StoreError::Constraint(what.to_string())
        }
        other => StoreError::Sqlite(other),
    }
}

/// A configuration database in a SQLite file
pub struct SqliteRepository {
    conn: Connection,
    in_transaction: bool,
}

impl SqliteRepository {
    /// Open (or create) a database file
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Sqlite` if the file cannot be opened.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// A private in-memory database with the schema already created
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Sqlite` if SQLite cannot be initialized.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let repo = Self::from_connection(Connection::open_in_memory()?)?;
        repo.init_schema()?;
        Ok(repo)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self {
            conn,
            in_transaction: false,
        })
    }

    /// Create tables that do not exist yet
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Sqlite` if the DDL fails.
    pub fn init_schema(&self) -> Result<(), StoreError> {
        init_schema(&self.conn)?;
        debug!("Configuration schema initialized");
        Ok(())
    }

    fn insert_returning_id(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<RowId, StoreError> {
        self.conn.execute(sql, params)?;
        Ok(self.conn.last_insert_rowid())
    }
}

impl SequenceAdapterLookup for SqliteRepository {
    fn find_sequence_adapter(
        &self,
        assembly_name: &str,
        kind: SequenceAdapterKind,
    ) -> Result<Option<RowId>, StoreError> {
        let sql = format!(
            "SELECT a.id FROM {} a JOIN assemblies asm ON a.assembly_id = asm.id \
             WHERE asm.name = ?1 ORDER BY a.id LIMIT 1",
            kind.table()
        );
        Ok(self
            .conn
            .query_row(&sql, params![assembly_name], |row| row.get(0))
            .optional()?)
    }
}

impl ConfigRepository for SqliteRepository {
    fn begin(&mut self) -> Result<(), StoreError> {
        self.conn.execute_batch("BEGIN")?;
        self.in_transaction = true;
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        if !self.in_transaction {
            return Err(StoreError::NoTransaction);
        }
        self.conn.execute_batch("COMMIT")?;
        self.in_transaction = false;
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), StoreError> {
        if !self.in_transaction {
            return Err(StoreError::NoTransaction);
        }
        self.conn.execute_batch("ROLLBACK")?;
        self.in_transaction = false;
        Ok(())
    }

    fn insert_assembly(&mut self, assembly: &Assembly) -> Result<RowId, StoreError> {
        self.conn
            .execute(
                "INSERT INTO assemblies \
                 (name, display_name, aliases, sequence_track_id, sequence_type, adapter_type) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    assembly.name,
                    assembly.display_name,
                    to_json_text(&assembly.aliases)?,
                    assembly.sequence.track_id,
                    assembly.sequence.sequence_type,
                    assembly.sequence.adapter_type,
                ],
            )
            .map_err(|e| constraint_or(e, &format!("duplicate assembly `{}`", assembly.name)))?;
        Ok(self.conn.last_insert_rowid())
    }

    fn insert_sequence_adapter(
        &mut self,
        assembly: RowId,
        adapter: &SequenceAdapter,
    ) -> Result<RowId, StoreError> {
        let sql = format!(
            "INSERT INTO {} \
             (assembly_id, fasta_location, fai_location, gzi_location, metadata_location) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            adapter.kind.table()
        );
        self.insert_returning_id(
            &sql,
            params![
                assembly,
                to_json_text(&adapter.fasta_location)?,
                to_json_text(&adapter.fai_location)?,
                location_text(adapter.gzi_location.as_ref())?,
                location_text(adapter.metadata_location.as_ref())?,
            ],
        )
    }

    fn insert_ref_name_alias(
        &mut self,
        assembly: RowId,
        alias: &RefNameAlias,
    ) -> Result<RowId, StoreError> {
        self.insert_returning_id(
            "INSERT INTO ref_name_aliases (assembly_id, adapter_type, adapter_id) \
             VALUES (?1, ?2, ?3)",
            params![assembly, alias.adapter_type, alias.adapter_id],
        )
    }

    fn insert_feature(
        &mut self,
        ref_name_alias: RowId,
        feature: &Feature,
    ) -> Result<RowId, StoreError> {
        self.insert_returning_id(
            "INSERT INTO ref_name_alias_features \
             (ref_name_alias_id, ref_name, unique_id, aliases) VALUES (?1, ?2, ?3, ?4)",
            params![
                ref_name_alias,
                feature.ref_name,
                feature.unique_id,
                to_json_text(&feature.aliases)?,
            ],
        )
    }

    fn insert_track(&mut self, track: &Track) -> Result<RowId, StoreError> {
        self.conn
            .execute(
                "INSERT INTO tracks \
                 (track_id, track_type, name, assembly_names, category, adapter_type) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    track.track_id,
                    track.track_type,
                    track.name,
                    to_json_text(&track.assembly_names)?,
                    to_json_text(&track.category)?,
                    track.adapter_type,
                ],
            )
            .map_err(|e| constraint_or(e, &format!("duplicate track `{}`", track.track_id)))?;
        Ok(self.conn.last_insert_rowid())
    }

    fn insert_track_adapter(
        &mut self,
        track: RowId,
        adapter: &TrackAdapter,
    ) -> Result<RowId, StoreError> {
        let table = adapter.kind().table();
        match adapter {
            TrackAdapter::Tabix(a) => self.insert_returning_id(
                &format!(
                    "INSERT INTO {table} (track_id, data_location, index_location, index_type) \
                     VALUES (?1, ?2, ?3, ?4)"
                ),
                params![
                    track,
                    to_json_text(&a.data_location)?,
                    to_json_text(&a.index.location)?,
                    a.index.index_type,
                ],
            ),
            TrackAdapter::Alignment(a) => self.insert_returning_id(
                &format!(
                    "INSERT INTO {table} (track_id, data_location, index_location, index_type, \
                     sequence_adapter_id, sequence_adapter_type) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"
                ),
                params![
                    track,
                    to_json_text(&a.data_location)?,
                    to_json_text(&a.index.location)?,
                    a.index.index_type,
                    a.sequence_adapter.id,
                    a.sequence_adapter.kind.tag(),
                ],
            ),
            TrackAdapter::Comparative(a) => self.insert_returning_id(
                &format!(
                    "INSERT INTO {table} (track_id, data_location, assembly_names) \
                     VALUES (?1, ?2, ?3)"
                ),
                params![
                    track,
                    to_json_text(&a.data_location)?,
                    to_json_text(&a.assembly_names)?,
                ],
            ),
        }
    }

    fn insert_display(
        &mut self,
        parent: DisplayParent,
        display: &Display,
    ) -> Result<RowId, StoreError> {
        self.insert_returning_id(
            "INSERT INTO displays (parent_id, parent_type, display_id, display_type) \
             VALUES (?1, ?2, ?3, ?4)",
            params![
                parent.id,
                parent.parent_type.as_str(),
                display.display_id,
                display.display_type,
            ],
        )
    }

    fn insert_renderer(&mut self, display: RowId, renderer: &Renderer) -> Result<RowId, StoreError> {
        self.insert_returning_id(
            "INSERT INTO renderers (display_id, renderer_key, renderer_type, renderer_details) \
             VALUES (?1, ?2, ?3, ?4)",
            params![
                display,
                renderer.key,
                renderer.renderer_type,
                to_json_text(&renderer.payload)?,
            ],
        )
    }

    fn track_adapter_type(&self, track_id: &str) -> Result<Option<String>, StoreError> {
        let adapter_type: Option<Option<String>> = self
            .conn
            .query_row(
                "SELECT adapter_type FROM tracks WHERE track_id = ?1",
                params![track_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(adapter_type.flatten())
    }

    fn track_adapter(
        &self,
        kind: TrackAdapterKind,
        track: RowId,
    ) -> Result<Option<TrackAdapterRow>, StoreError> {
        let table = kind.table();
        let columns = match kind.family() {
            AdapterFamily::Tabix => {
                "id, track_id, data_location, index_location, index_type, \
                 NULL, NULL, NULL"
            }
            AdapterFamily::Alignment => {
                "id, track_id, data_location, index_location, index_type, \
                 sequence_adapter_id, sequence_adapter_type, NULL"
            }
            AdapterFamily::Comparative => {
                "id, track_id, data_location, NULL, NULL, NULL, NULL, assembly_names"
            }
        };
        let sql =
            format!("SELECT {columns} FROM {table} WHERE track_id = ?1 ORDER BY id LIMIT 1");

        #[allow(clippy::type_complexity)]
        let raw: Option<(
            RowId,
            RowId,
            Option<String>,
            Option<String>,
            Option<String>,
            Option<RowId>,
            Option<String>,
            Option<String>,
        )> = self
            .conn
            .query_row(&sql, params![track], |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                    row.get(6)?,
                    row.get(7)?,
                ))
            })
            .optional()?;

        let Some((id, track_id, data, index, index_type, seq_id, seq_type, names)) = raw else {
            return Ok(None);
        };

        Ok(Some(TrackAdapterRow {
            id,
            track_id,
            data_location: from_json_text(data)?,
            index_location: from_json_text(index)?,
            index_type,
            sequence_adapter_id: seq_id,
            sequence_adapter_type: seq_type,
            assembly_names: from_json_text(names)?,
        }))
    }

    fn assemblies(&self) -> Result<Vec<AssemblyRow>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, display_name, aliases, sequence_track_id, sequence_type, \
             adapter_type FROM assemblies ORDER BY id",
        )?;
        let raw = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, RowId>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, Option<String>>(6)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        raw.into_iter()
            .map(
                |(id, name, display_name, aliases, sequence_track_id, sequence_type, adapter_type)| {
                    Ok(AssemblyRow {
                        id,
                        name,
                        display_name,
                        aliases: list_from_json_text(aliases)?,
                        sequence_track_id,
                        sequence_type,
                        adapter_type,
                    })
                },
            )
            .collect()
    }

    fn sequence_adapters(&self) -> Result<Vec<SequenceAdapterRow>, StoreError> {
        let mut rows = Vec::new();

        for kind in SequenceAdapterKind::ALL {
            let sql = format!(
                "SELECT id, assembly_id, fasta_location, fai_location, gzi_location, \
                 metadata_location FROM {} ORDER BY id",
                kind.table()
            );
            let mut stmt = self.conn.prepare(&sql)?;
            let raw = stmt
                .query_map([], |row| {
                    Ok((
                        row.get::<_, RowId>(0)?,
                        row.get::<_, RowId>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, Option<String>>(3)?,
                        row.get::<_, Option<String>>(4)?,
                        row.get::<_, Option<String>>(5)?,
                    ))
                })?
                .collect::<Result<Vec<_>, _>>()?;

            for (id, assembly_id, fasta, fai, gzi, metadata) in raw {
                rows.push(SequenceAdapterRow {
                    id,
                    assembly_id,
                    adapter_type: kind.tag().to_string(),
                    fasta_location: from_json_text(fasta)?,
                    fai_location: from_json_text(fai)?,
                    gzi_location: from_json_text(gzi)?,
                    metadata_location: from_json_text(metadata)?,
                });
            }
        }

        Ok(rows)
    }

    fn tracks(&self) -> Result<Vec<TrackRow>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, track_id, track_type, name, assembly_names, category, adapter_type \
             FROM tracks ORDER BY id",
        )?;
        let raw = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, RowId>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, Option<String>>(6)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        raw.into_iter()
            .map(
                |(id, track_id, track_type, name, assembly_names, category, adapter_type)| {
                    Ok(TrackRow {
                        id,
                        track_id,
                        track_type,
                        name,
                        assembly_names: list_from_json_text(assembly_names)?,
                        category: list_from_json_text(category)?,
                        adapter_type,
                    })
                },
            )
            .collect()
    }

    fn display_renderers(
        &self,
        parent: ParentType,
    ) -> Result<Vec<DisplayRendererRow>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT d.id, d.parent_id, d.display_id, d.display_type, \
                    r.id, r.renderer_key, r.renderer_type, r.renderer_details \
             FROM displays d \
             LEFT JOIN renderers r ON r.display_id = d.id \
             WHERE d.parent_type = ?1 \
             ORDER BY d.parent_id, d.id, r.id",
        )?;
        let raw = stmt
            .query_map(params![parent.as_str()], |row| {
                Ok((
                    row.get::<_, RowId>(0)?,
                    row.get::<_, RowId>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, Option<RowId>>(4)?,
                    row.get::<_, Option<String>>(5)?,
                    row.get::<_, Option<String>>(6)?,
                    row.get::<_, Option<String>>(7)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        raw.into_iter()
            .map(|(display_row_id, parent_id, display_id, display_type, r_id, key, r_type, details)| {
                Ok(DisplayRendererRow {
                    display_row_id,
                    parent_id,
                    display_id,
                    display_type,
                    renderer_row_id: r_id,
                    renderer_key: key,
                    renderer_type: r_type,
                    renderer_details: from_json_text(details)?,
                })
            })
            .collect()
    }

    fn ref_name_alias_features(&self) -> Result<Vec<RefNameAliasFeatureRow>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT a.id, a.assembly_id, a.adapter_type, a.adapter_id, \
                    f.id, f.ref_name, f.unique_id, f.aliases \
             FROM ref_name_aliases a \
             LEFT JOIN ref_name_alias_features f ON f.ref_name_alias_id = a.id \
             ORDER BY a.assembly_id, a.id, f.id",
        )?;
        let raw = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, RowId>(0)?,
                    row.get::<_, RowId>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, Option<RowId>>(4)?,
                    row.get::<_, Option<String>>(5)?,
                    row.get::<_, Option<String>>(6)?,
                    row.get::<_, Option<String>>(7)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        raw.into_iter()
            .map(|(alias_row_id, assembly_id, adapter_type, adapter_id, f_id, ref_name, unique_id, aliases)| {
                Ok(RefNameAliasFeatureRow {
                    alias_row_id,
                    assembly_id,
                    adapter_type,
                    adapter_id,
                    feature_row_id: f_id,
                    ref_name,
                    unique_id,
                    aliases: from_json_text(aliases)?,
                })
            })
            .collect()
    }
}
