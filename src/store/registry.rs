use rusqlite::{params, Connection, OptionalExtension};
use tracing::{info, warn};

use crate::core::sequence::SequenceRecord;
use crate::core::types::{PipelineState, ShingleLength, SourceId};
use crate::utils::validation::validate_sequence_name;

use super::db::GenomeDb;
use super::ids::IdSequence;
use super::{count_from_i64, schema, StoreError};

/// Maps sequence names to stable numeric source ids
pub struct SequenceRegistry<'a> {
    db: &'a GenomeDb,
}

impl<'a> SequenceRegistry<'a> {
    pub fn new(db: &'a GenomeDb) -> Self {
        Self { db }
    }

    /// Look up the id registered for `name`
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the store cannot be queried.
    pub fn lookup(&self, name: &str) -> Result<Option<SourceId>, StoreError> {
        Ok(find_by_name(self.db.connection(), name)?.map(|record| record.id))
    }

    /// Fetch a full record by id
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the store cannot be queried.
    pub fn get(&self, id: SourceId) -> Result<Option<SequenceRecord>, StoreError> {
        Ok(self
            .db
            .connection()
            .query_row(schema::SELECT_SEQUENCE_BY_ID, params![id.get()], row_to_record)
            .optional()?)
    }

    /// Return the id for `name`, registering it with the next free id if unknown.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Validation` for an unusable name and
    /// `StoreError::Unavailable` if the store cannot be read or written.
    pub fn resolve_or_create(&self, name: &str) -> Result<SourceId, StoreError> {
        self.resolve_or_create_with_digest(name, None)
    }

    /// Like [`resolve_or_create`](Self::resolve_or_create), recording the MD5 of
    /// the normalized sequence on first registration.
    ///
    /// Records are never updated: if `name` is already registered with a
    /// different digest, the existing id is returned and a warning is logged.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Validation` for an unusable name and
    /// `StoreError::Unavailable` if the store cannot be read or written.
    pub fn resolve_or_create_with_digest(
        &self,
        name: &str,
        digest: Option<&str>,
    ) -> Result<SourceId, StoreError> {
        validate_sequence_name(name)?;

        let tx = self.db.immediate_transaction()?;

        if let Some(existing) = find_by_name(&tx, name)? {
            if let (Some(stored), Some(current)) = (existing.md5.as_deref(), digest) {
                if stored != current {
                    warn!(
                        "Sequence '{}' changed since it was registered as {}; stored shingles reflect the earlier content",
                        name, existing.id
                    );
                }
            }
            return Ok(existing.id);
        }

        let id = IdSequence::Sequences.reserve(&tx, 1)?;
        tx.execute(
            schema::INSERT_SEQUENCE,
            params![id, name, digest, chrono::Utc::now().to_rfc3339()],
        )?;
        tx.commit()?;

        info!("Registered sequence '{}' as {}", name, id);
        Ok(SourceId(id))
    }

    /// All registered sequences ordered by id
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the store cannot be queried.
    pub fn list(&self) -> Result<Vec<SequenceRecord>, StoreError> {
        let mut stmt = self
            .db
            .connection()
            .prepare_cached(schema::SELECT_ALL_SEQUENCES)?;
        let records = stmt
            .query_map([], row_to_record)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    /// Pipeline state of `name` for shingle length `length`
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the store cannot be queried.
    pub fn state(&self, name: &str, length: ShingleLength) -> Result<PipelineState, StoreError> {
        let Some(id) = self.lookup(name)? else {
            return Ok(PipelineState::Unregistered);
        };

        let count: i64 = self.db.connection().query_row(
            schema::COUNT_SHINGLES,
            params![id.get(), length.as_i64()],
            |row| row.get(0),
        )?;

        if count_from_i64(count)? > 0 {
            Ok(PipelineState::Shingled(id, length))
        } else {
            Ok(PipelineState::Registered(id))
        }
    }
}

fn find_by_name(conn: &Connection, name: &str) -> Result<Option<SequenceRecord>, StoreError> {
    Ok(conn
        .query_row(schema::SELECT_SEQUENCE_BY_NAME, params![name], row_to_record)
        .optional()?)
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<SequenceRecord> {
    Ok(SequenceRecord {
        id: SourceId(row.get(0)?),
        name: row.get(1)?,
        md5: row.get(2)?,
        created_at: row.get(3)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shingling::extract;

    #[test]
    fn test_resolve_or_create_allocates_monotonic_ids() {
        let db = GenomeDb::in_memory().unwrap();
        let registry = db.registry();

        assert_eq!(registry.resolve_or_create("Genome_1.txt").unwrap(), SourceId(1));
        assert_eq!(registry.resolve_or_create("Genome_2.txt").unwrap(), SourceId(2));
        assert_eq!(registry.resolve_or_create("Genome_3.txt").unwrap(), SourceId(3));
    }

    #[test]
    fn test_resolve_or_create_is_stable() {
        let db = GenomeDb::in_memory().unwrap();
        let registry = db.registry();

        let first = registry.resolve_or_create("Genome_1.txt").unwrap();
        registry.resolve_or_create("Genome_2.txt").unwrap();
        assert_eq!(registry.resolve_or_create("Genome_1.txt").unwrap(), first);
        assert_eq!(registry.list().unwrap().len(), 2);
    }

    #[test]
    fn test_lookup_unknown_name() {
        let db = GenomeDb::in_memory().unwrap();
        assert!(db.registry().lookup("missing.txt").unwrap().is_none());
        assert!(db.registry().get(SourceId(1)).unwrap().is_none());
    }

    #[test]
    fn test_digest_recorded_and_never_updated() {
        let db = GenomeDb::in_memory().unwrap();
        let registry = db.registry();

        let id = registry
            .resolve_or_create_with_digest("a.txt", Some("aaaa"))
            .unwrap();
        let again = registry
            .resolve_or_create_with_digest("a.txt", Some("bbbb"))
            .unwrap();
        assert_eq!(id, again);

        let record = registry.get(id).unwrap().unwrap();
        assert_eq!(record.name, "a.txt");
        assert_eq!(record.md5.as_deref(), Some("aaaa"));
        assert!(chrono::DateTime::parse_from_rfc3339(&record.created_at).is_ok());
    }

    #[test]
    fn test_rejects_empty_name() {
        let db = GenomeDb::in_memory().unwrap();
        let result = db.registry().resolve_or_create("");
        assert!(matches!(result, Err(StoreError::Validation(_))));
        assert!(db.registry().list().unwrap().is_empty());
    }

    #[test]
    fn test_pipeline_state_transitions() {
        let db = GenomeDb::in_memory().unwrap();
        let registry = db.registry();
        let k9 = ShingleLength::new(9).unwrap();
        let k3 = ShingleLength::new(3).unwrap();

        assert_eq!(
            registry.state("a.txt", k9).unwrap(),
            PipelineState::Unregistered
        );

        let id = registry.resolve_or_create("a.txt").unwrap();
        assert_eq!(
            registry.state("a.txt", k9).unwrap(),
            PipelineState::Registered(id)
        );

        db.shingles()
            .ingest(id, k9, &extract("AAAAAAAAAT", k9))
            .unwrap();
        assert_eq!(
            registry.state("a.txt", k9).unwrap(),
            PipelineState::Shingled(id, k9)
        );
        // Each length is shingled independently
        assert_eq!(
            registry.state("a.txt", k3).unwrap(),
            PipelineState::Registered(id)
        );
    }
}
