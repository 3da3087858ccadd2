//! SQLite schema for the relational projection

use rusqlite::Connection;

use crate::core::assembly::SequenceAdapterKind;
use crate::core::track::{AdapterFamily, TrackAdapterKind};
use crate::store::StoreError;

const BASE_TABLES: &str = r"
    CREATE TABLE IF NOT EXISTS assemblies (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        display_name TEXT,
        aliases TEXT NOT NULL DEFAULT '[]',      -- JSON array
        sequence_track_id TEXT NOT NULL,
        sequence_type TEXT NOT NULL,
        adapter_type TEXT
    );

    CREATE TABLE IF NOT EXISTS ref_name_aliases (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        assembly_id INTEGER NOT NULL,
        adapter_type TEXT NOT NULL,
        adapter_id TEXT,
        FOREIGN KEY(assembly_id) REFERENCES assemblies(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS ref_name_alias_features (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        ref_name_alias_id INTEGER NOT NULL,
        ref_name TEXT NOT NULL,
        unique_id TEXT,
        aliases TEXT NOT NULL DEFAULT '[]',      -- JSON array
        FOREIGN KEY(ref_name_alias_id) REFERENCES ref_name_aliases(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS tracks (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        track_id TEXT NOT NULL UNIQUE,
        track_type TEXT NOT NULL,
        name TEXT NOT NULL,
        assembly_names TEXT NOT NULL DEFAULT '[]', -- JSON array
        category TEXT NOT NULL DEFAULT '[]',       -- JSON array
        adapter_type TEXT
    );

    -- parent_id points at assemblies(id) or tracks(id) depending on parent_type
    CREATE TABLE IF NOT EXISTS displays (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        parent_id INTEGER NOT NULL,
        parent_type TEXT NOT NULL CHECK (parent_type IN ('Assembly', 'Track')),
        display_id TEXT NOT NULL,
        display_type TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS renderers (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        display_id INTEGER NOT NULL,
        renderer_key TEXT NOT NULL,
        renderer_type TEXT,
        renderer_details TEXT NOT NULL DEFAULT '{}', -- JSON object
        FOREIGN KEY(display_id) REFERENCES displays(id) ON DELETE CASCADE
    );

    CREATE INDEX IF NOT EXISTS idx_displays_parent ON displays(parent_type, parent_id);
    CREATE INDEX IF NOT EXISTS idx_renderers_display ON renderers(display_id);
    CREATE INDEX IF NOT EXISTS idx_features_alias ON ref_name_alias_features(ref_name_alias_id);
";

/// DDL for one sequence adapter table. Locations are JSON objects.
fn sequence_adapter_table(kind: SequenceAdapterKind) -> String {
    format!(
        r"
        CREATE TABLE IF NOT EXISTS {table} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            assembly_id INTEGER NOT NULL,
            fasta_location TEXT,
            fai_location TEXT,
            gzi_location TEXT,
            metadata_location TEXT,
            FOREIGN KEY(assembly_id) REFERENCES assemblies(id) ON DELETE CASCADE
        );
        CREATE INDEX IF NOT EXISTS idx_{table}_assembly ON {table}(assembly_id);
        ",
        table = kind.table()
    )
}

/// DDL for one track adapter table, with the columns of its family
fn track_adapter_table(kind: TrackAdapterKind) -> String {
    let family_columns = match kind.family() {
        AdapterFamily::Tabix => {
            "index_location TEXT,
            index_type TEXT,"
        }
        AdapterFamily::Alignment => {
            "index_location TEXT,
            index_type TEXT,
            sequence_adapter_id INTEGER,
            sequence_adapter_type TEXT,"
        }
        AdapterFamily::Comparative => "assembly_names TEXT NOT NULL DEFAULT '[]',",
    };

    format!(
        r"
        CREATE TABLE IF NOT EXISTS {table} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            track_id INTEGER NOT NULL,
            data_location TEXT,
            {family_columns}
            FOREIGN KEY(track_id) REFERENCES tracks(id) ON DELETE CASCADE
        );
        CREATE INDEX IF NOT EXISTS idx_{table}_track ON {table}(track_id);
        ",
        table = kind.table()
    )
}

/// Create every table and index; safe to run on an existing database
///
/// # Errors
///
/// Returns `StoreError::Sqlite` if any statement fails.
pub fn init_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(BASE_TABLES)?;

    for kind in SequenceAdapterKind::ALL {
        conn.execute_batch(&sequence_adapter_table(kind))?;
    }

    for kind in TrackAdapterKind::ALL {
        conn.execute_batch(&track_adapter_table(kind))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_names(conn: &Connection) -> Vec<String> {
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap();

        stmt.query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn test_init_schema() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        let tables = table_names(&conn);
        for expected in [
            "assemblies",
            "ref_name_aliases",
            "ref_name_alias_features",
            "tracks",
            "displays",
            "renderers",
        ] {
            assert!(tables.contains(&expected.to_string()), "missing {expected}");
        }
        for kind in SequenceAdapterKind::ALL {
            assert!(tables.contains(&kind.table().to_string()));
        }
        for kind in TrackAdapterKind::ALL {
            assert!(tables.contains(&kind.table().to_string()));
        }
    }

    #[test]
    fn test_schema_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        init_schema(&conn).unwrap();
        let result = init_schema(&conn);

        assert!(result.is_ok());
    }

    #[test]
    fn test_comparative_table_has_no_index_column() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        let result = conn.prepare("SELECT index_location FROM paf_adapters");
        assert!(result.is_err());
        assert!(conn.prepare("SELECT assembly_names FROM paf_adapters").is_ok());
    }
}
