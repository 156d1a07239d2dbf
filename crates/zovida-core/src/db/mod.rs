//! Artifact store: reference dataset, curated rules and trained model artifacts.

mod artifacts;
mod reference;
mod rules;
mod schema;

pub use artifacts::*;
pub use rules::RULES_VERSION_KEY;
pub use schema::*;

use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use thiserror::Error;

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Invalid record: {0}")]
    Invalid(String),
}

pub type DbResult<T> = Result<T, DbError>;

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open database at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Create in-memory database (for testing).
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Initialize schema.
    fn initialize(&self) -> DbResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Get raw connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Read a metadata value.
    pub fn get_metadata(&self, key: &str) -> DbResult<Option<String>> {
        Ok(self
            .conn
            .query_row(
                "SELECT value FROM store_metadata WHERE key = ?",
                [key],
                |row| row.get(0),
            )
            .optional()?)
    }

    /// Write a metadata value.
    pub fn set_metadata(&self, key: &str, value: &str) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO store_metadata (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = datetime('now')
            "#,
            [key, value],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn test_schema_initialized() {
        let db = Database::open_in_memory().unwrap();

        let tables: Vec<String> = db
            .conn()
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert!(tables.contains(&"reference_pairs".to_string()));
        assert!(tables.contains(&"override_rules".to_string()));
        assert!(tables.contains(&"typo_corrections".to_string()));
        assert!(tables.contains(&"lifestyle_rules".to_string()));
        assert!(tables.contains(&"model_artifacts".to_string()));
        assert!(tables.contains(&"store_metadata".to_string()));
    }

    #[test]
    fn test_metadata_round_trip() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.get_metadata("rules_version").unwrap(), Some(String::new()));
        assert_eq!(db.get_metadata("missing").unwrap(), None);

        db.set_metadata("rules_version", "2024-06-01").unwrap();
        assert_eq!(
            db.get_metadata("rules_version").unwrap(),
            Some("2024-06-01".to_string())
        );
    }

    #[test]
    fn test_open_on_disk_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.db");

        {
            let db = Database::open(&path).unwrap();
            db.set_metadata("model_version", "v7").unwrap();
        }

        let db = Database::open(&path).unwrap();
        assert_eq!(db.get_metadata("model_version").unwrap(), Some("v7".into()));
    }
}
