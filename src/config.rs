//! Store configuration passed explicitly to the pipeline entry points.

use std::path::PathBuf;

use crate::store::{SqliteRepository, StoreError};

/// Where the relational store lives and how to open it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// SQLite database file
    pub database: PathBuf,
    /// Create any missing tables on open
    pub init_schema: bool,
}

impl StoreConfig {
    pub fn new(database: impl Into<PathBuf>) -> Self {
        Self {
            database: database.into(),
            init_schema: false,
        }
    }

    #[must_use]
    pub fn with_init_schema(mut self, init_schema: bool) -> Self {
        self.init_schema = init_schema;
        self
    }

    /// Open the configured database
    ///
    /// # Errors
    ///
    /// Returns a `StoreError` if the database cannot be opened or the schema
    /// cannot be created.
    pub fn open(&self) -> Result<SqliteRepository, StoreError> {
        let repo = SqliteRepository::open(&self.database)?;
        if self.init_schema {
            repo.init_schema()?;
        }
        Ok(repo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ConfigRepository;

    #[test]
    fn test_open_with_schema() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::new(dir.path().join("config.db")).with_init_schema(true);
        let repo = config.open().unwrap();
        assert!(repo.assemblies().unwrap().is_empty());
    }

    #[test]
    fn test_open_without_schema_fails_on_query() {
        let dir = tempfile::tempdir().unwrap();
        let repo = StoreConfig::new(dir.path().join("empty.db")).open().unwrap();
        assert!(repo.assemblies().is_err());
    }
}
