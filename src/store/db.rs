use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use tracing::debug;

use crate::matching::engine::SimilarityEngine;

use super::registry::SequenceRegistry;
use super::schema;
use super::shingles::ShingleStore;
use super::StoreError;

/// How long a writer waits for another process's lock before failing
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-backed store of sequences and shingles
#[derive(Debug)]
pub struct GenomeDb {
    conn: Connection,
    path: Option<PathBuf>,
}

impl GenomeDb {
    /// Open (or create) a store at the given path.
    ///
    /// A store whose schema is already current is opened without taking the
    /// write lock, so read-only commands work while another process writes.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the parent directory cannot be created and
    /// `StoreError::Unavailable` if the database cannot be opened or initialized.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        let db = Self {
            conn,
            path: Some(path.to_path_buf()),
        };
        db.initialize()?;
        debug!("Opened genome store at {}", path.display());
        Ok(db)
    }

    /// Create an in-memory store.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if SQLite cannot be initialized.
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn, path: None };
        db.initialize()?;
        Ok(db)
    }

    fn initialize(&self) -> Result<(), StoreError> {
        self.conn.busy_timeout(BUSY_TIMEOUT)?;
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        if self.schema_is_current()? {
            return Ok(());
        }

        let tx = self.immediate_transaction()?;
        tx.execute_batch(schema::SCHEMA_SQL)?;
        tx.execute_batch(schema::SEED_ID_SEQUENCES_SQL)?;
        tx.execute(
            "INSERT OR IGNORE INTO meta (key, value) VALUES ('schema_version', ?1)",
            params![schema::SCHEMA_VERSION.to_string()],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn schema_is_current(&self) -> Result<bool, StoreError> {
        let (tables, legacy_indexes): (i64, i64) =
            self.conn.query_row(schema::SELECT_SCHEMA_OBJECTS, [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })?;
        if tables != schema::TABLE_COUNT || legacy_indexes != 0 {
            return Ok(false);
        }

        // One counter per IdSequence entity
        let (counters, version): (i64, Option<String>) =
            self.conn.query_row(schema::SELECT_SEEDED_STATE, [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })?;
        Ok(counters == 2 && version == Some(schema::SCHEMA_VERSION.to_string()))
    }

    /// Path of the backing file, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Schema version recorded in the database
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidRow` if the stored version is missing or not a number.
    pub fn schema_version(&self) -> Result<i64, StoreError> {
        let value: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM meta WHERE key = 'schema_version'",
                [],
                |row| row.get(0),
            )
            .optional()?;

        value
            .as_deref()
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| StoreError::InvalidRow("missing schema_version".to_string()))
    }

    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Begin a transaction holding the write lock from its first statement.
    pub(crate) fn immediate_transaction(&self) -> Result<Transaction<'_>, StoreError> {
        Ok(Transaction::new_unchecked(
            &self.conn,
            TransactionBehavior::Immediate,
        )?)
    }

    /// Name-to-id registry over this store
    pub fn registry(&self) -> SequenceRegistry<'_> {
        SequenceRegistry::new(self)
    }

    /// Shingle sets over this store
    pub fn shingles(&self) -> ShingleStore<'_> {
        ShingleStore::new(self)
    }

    /// Similarity queries over this store
    pub fn similarity(&self) -> SimilarityEngine<'_> {
        SimilarityEngine::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ShingleLength;
    use crate::shingling::extract;
    use crate::store::ids::IdSequence;
    use tempfile::TempDir;

    #[test]
    fn test_in_memory_initializes_schema() {
        let db = GenomeDb::in_memory().unwrap();
        assert_eq!(db.schema_version().unwrap(), schema::SCHEMA_VERSION);
        assert!(db.path().is_none());
        assert_eq!(IdSequence::Sequences.peek(db.connection()).unwrap(), 1);
        assert_eq!(IdSequence::Shingles.peek(db.connection()).unwrap(), 1);
    }

    #[test]
    fn test_open_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("genomes.sqlite");

        let db = GenomeDb::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(db.path(), Some(path.as_path()));
    }

    #[test]
    fn test_reopen_keeps_data_and_counters() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("genomes.sqlite");
        let k = ShingleLength::new(3).unwrap();

        {
            let db = GenomeDb::open(&path).unwrap();
            let id = db.registry().resolve_or_create("a.txt").unwrap();
            db.shingles().ingest(id, k, &extract("ACGTT", k)).unwrap();
        }

        let db = GenomeDb::open(&path).unwrap();
        let id = db.registry().lookup("a.txt").unwrap().unwrap();
        assert_eq!(id.get(), 1);
        assert_eq!(db.shingles().shingle_count(id, k).unwrap(), 3);
        assert_eq!(IdSequence::Sequences.peek(db.connection()).unwrap(), 2);
        assert_eq!(IdSequence::Shingles.peek(db.connection()).unwrap(), 4);
    }

    #[test]
    fn test_counters_seeded_from_existing_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("legacy.sqlite");

        // A database populated before the counter table existed
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch(schema::SCHEMA_SQL).unwrap();
            conn.execute_batch(
                "DROP TABLE id_sequences;
                 INSERT INTO sequences (id, name, created_at) VALUES (7, 'old.txt', 'then');
                 INSERT INTO shingles (id, source_id, value, length) VALUES (41, 7, 'ACG', 3);",
            )
            .unwrap();
        }

        let db = GenomeDb::open(&path).unwrap();
        assert_eq!(IdSequence::Sequences.peek(db.connection()).unwrap(), 8);
        assert_eq!(IdSequence::Shingles.peek(db.connection()).unwrap(), 42);
        assert_eq!(db.registry().resolve_or_create("new.txt").unwrap().get(), 8);
    }

    #[test]
    fn test_open_rejects_non_database_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("junk.sqlite");
        std::fs::write(&path, "not a database\n".repeat(100)).unwrap();

        let result = GenomeDb::open(&path);
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }

    #[test]
    fn test_open_current_store_while_another_writer_holds_lock() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("genomes.sqlite");
        {
            let db = GenomeDb::open(&path).unwrap();
            db.registry().resolve_or_create("a.txt").unwrap();
        }

        let writer = Connection::open(&path).unwrap();
        writer.execute_batch("BEGIN IMMEDIATE;").unwrap();

        let db = GenomeDb::open(&path).unwrap();
        assert_eq!(db.registry().list().unwrap().len(), 1);

        writer.execute_batch("ROLLBACK;").unwrap();
    }

    #[test]
    fn test_redundant_shingle_index_is_dropped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("genomes.sqlite");
        {
            let db = GenomeDb::open(&path).unwrap();
            db.connection()
                .execute_batch(
                    "CREATE INDEX idx_shingles_source_length ON shingles (source_id, length);",
                )
                .unwrap();
        }

        let db = GenomeDb::open(&path).unwrap();
        let indexes: i64 = db
            .connection()
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE name = 'idx_shingles_source_length'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(indexes, 0);

        let plan: Vec<String> = db
            .connection()
            .prepare(&format!("EXPLAIN QUERY PLAN {}", schema::COUNT_SHINGLES))
            .unwrap()
            .query_map(params![1, 3], |row| row.get(3))
            .unwrap()
            .collect::<rusqlite::Result<_>>()
            .unwrap();
        assert!(plan.iter().any(|d| d.contains("sqlite_autoindex_shingles_1")));
    }
}
