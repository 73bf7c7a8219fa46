use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::core::sequence::{Shingle, ShingledLength};
use crate::core::types::{IngestOutcome, ShingleId, ShingleLength, SourceId};
use crate::shingling::ShingleSet;

use super::db::GenomeDb;
use super::ids::IdSequence;
use super::{count_from_i64, schema, StoreError};

/// Persisted shingle sets, one per `(source, length)` pair
pub struct ShingleStore<'a> {
    db: &'a GenomeDb,
}

impl<'a> ShingleStore<'a> {
    pub fn new(db: &'a GenomeDb) -> Self {
        Self { db }
    }

    /// Persist `shingles` for `(source, length)` unless that pair already has rows.
    ///
    /// A pair that already has shingles is left untouched and reported as
    /// skipped. Otherwise one row per shingle is written under a contiguous
    /// block of fresh ids, all in one transaction. An empty set writes nothing
    /// and is not reported as skipped.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::UnknownSource` if `source` is not registered,
    /// `StoreError::Conflict` if a row collides with one already stored and
    /// `StoreError::Unavailable` on database failure. On any error nothing
    /// from the batch has been written and no ids are consumed.
    pub fn ingest(
        &self,
        source: SourceId,
        length: ShingleLength,
        shingles: &ShingleSet,
    ) -> Result<IngestOutcome, StoreError> {
        let tx = self.db.immediate_transaction()?;

        if !source_exists(&tx, source)? {
            return Err(StoreError::UnknownSource(source));
        }

        let existing = count(&tx, source, length)?;
        if existing != 0 {
            info!(
                "Source {} already has {} shingles for k = {}, skipping",
                source, existing, length
            );
            return Ok(IngestOutcome::skipped());
        }

        if shingles.is_empty() {
            debug!("No shingles to store for source {} at k = {}", source, length);
            return Ok(IngestOutcome::inserted(0));
        }

        // Sorted so a given set always maps to the same ids
        let mut values: Vec<&str> = shingles.iter().map(String::as_str).collect();
        values.sort_unstable();

        let first = IdSequence::Shingles.reserve(&tx, values.len())?;
        {
            let mut stmt = tx.prepare_cached(schema::INSERT_SHINGLE)?;
            for (id, value) in (first..).zip(&values) {
                stmt.execute(params![id, source.get(), value, length.as_i64()])?;
            }
        }
        tx.commit()?;

        info!(
            "Stored {} shingles for source {} at k = {}",
            values.len(),
            source,
            length
        );
        Ok(IngestOutcome::inserted(values.len()))
    }

    /// The persisted shingle values for `(source, length)`.
    ///
    /// A pair that was never ingested yields an empty set.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the store cannot be queried.
    pub fn shingle_set(
        &self,
        source: SourceId,
        length: ShingleLength,
    ) -> Result<ShingleSet, StoreError> {
        let mut stmt = self
            .db
            .connection()
            .prepare_cached(schema::SELECT_SHINGLE_VALUES)?;
        let values = stmt
            .query_map(params![source.get(), length.as_i64()], |row| row.get(0))?
            .collect::<rusqlite::Result<ShingleSet>>()?;
        Ok(values)
    }

    /// Full rows for `(source, length)` ordered by id
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the store cannot be queried or
    /// `StoreError::InvalidRow` if a stored length is not a valid shingle length.
    pub fn rows(&self, source: SourceId, length: ShingleLength) -> Result<Vec<Shingle>, StoreError> {
        let mut stmt = self
            .db
            .connection()
            .prepare_cached(schema::SELECT_SHINGLE_ROWS)?;
        let raw = stmt
            .query_map(params![source.get(), length.as_i64()], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, i64>(3)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        raw.into_iter()
            .map(|(id, source_id, value, stored_length)| {
                Ok(Shingle {
                    id: ShingleId(id),
                    source_id: SourceId(source_id),
                    value,
                    length: length_from_i64(stored_length)?,
                })
            })
            .collect()
    }

    /// Number of persisted shingles for `(source, length)`
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the store cannot be queried.
    pub fn shingle_count(&self, source: SourceId, length: ShingleLength) -> Result<usize, StoreError> {
        count(self.db.connection(), source, length)
    }

    /// Every length `source` has been shingled for, with its shingle count
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the store cannot be queried or
    /// `StoreError::InvalidRow` for a corrupt length or count.
    pub fn ingested_lengths(&self, source: SourceId) -> Result<Vec<ShingledLength>, StoreError> {
        let mut stmt = self
            .db
            .connection()
            .prepare_cached(schema::SELECT_SHINGLED_LENGTHS)?;
        let raw = stmt
            .query_map(params![source.get()], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        raw.into_iter()
            .map(|(length, count)| {
                Ok(ShingledLength {
                    length: length_from_i64(length)?,
                    count: count_from_i64(count)?,
                })
            })
            .collect()
    }
}

fn count(conn: &Connection, source: SourceId, length: ShingleLength) -> Result<usize, StoreError> {
    let count: i64 = conn.query_row(
        schema::COUNT_SHINGLES,
        params![source.get(), length.as_i64()],
        |row| row.get(0),
    )?;
    count_from_i64(count)
}

fn source_exists(conn: &Connection, source: SourceId) -> Result<bool, StoreError> {
    Ok(conn
        .query_row(
            "SELECT 1 FROM sequences WHERE id = ?1",
            params![source.get()],
            |_| Ok(()),
        )
        .optional()?
        .is_some())
}

fn length_from_i64(length: i64) -> Result<ShingleLength, StoreError> {
    usize::try_from(length)
        .ok()
        .and_then(|k| ShingleLength::new(k).ok())
        .ok_or_else(|| StoreError::InvalidRow(format!("invalid shingle length {length}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shingling::extract;

    fn k(n: usize) -> ShingleLength {
        ShingleLength::new(n).unwrap()
    }

    fn setup(names: &[&str]) -> (GenomeDb, Vec<SourceId>) {
        let db = GenomeDb::in_memory().unwrap();
        let ids = names
            .iter()
            .map(|name| db.registry().resolve_or_create(name).unwrap())
            .collect();
        (db, ids)
    }

    #[test]
    fn test_ingest_persists_exact_set() {
        let (db, ids) = setup(&["a.txt"]);
        let shingles = extract("ACGTACGTTT", k(4));

        let outcome = db.shingles().ingest(ids[0], k(4), &shingles).unwrap();
        assert_eq!(outcome, IngestOutcome::inserted(shingles.len()));
        assert_eq!(db.shingles().shingle_set(ids[0], k(4)).unwrap(), shingles);
    }

    #[test]
    fn test_ingest_is_idempotent() {
        let (db, ids) = setup(&["a.txt"]);
        let shingles = extract("AAAAAAAAAT", k(9));

        let first = db.shingles().ingest(ids[0], k(9), &shingles).unwrap();
        assert_eq!(first, IngestOutcome::inserted(2));

        let second = db.shingles().ingest(ids[0], k(9), &shingles).unwrap();
        assert_eq!(second, IngestOutcome::skipped());
        assert_eq!(db.shingles().shingle_set(ids[0], k(9)).unwrap(), shingles);
        assert_eq!(db.shingles().shingle_count(ids[0], k(9)).unwrap(), 2);
    }

    #[test]
    fn test_reingest_with_different_set_is_skipped() {
        let (db, ids) = setup(&["a.txt"]);

        db.shingles()
            .ingest(ids[0], k(3), &extract("ACGT", k(3)))
            .unwrap();
        let outcome = db
            .shingles()
            .ingest(ids[0], k(3), &extract("TTTTTT", k(3)))
            .unwrap();

        assert!(outcome.skipped);
        assert_eq!(
            db.shingles().shingle_set(ids[0], k(3)).unwrap(),
            extract("ACGT", k(3))
        );
    }

    #[test]
    fn test_ids_are_contiguous_across_batches() {
        let (db, ids) = setup(&["a.txt", "b.txt"]);

        db.shingles()
            .ingest(ids[0], k(3), &extract("ACGTAC", k(3)))
            .unwrap();
        db.shingles()
            .ingest(ids[1], k(3), &extract("GGGCCC", k(3)))
            .unwrap();

        let first: Vec<i64> = db
            .shingles()
            .rows(ids[0], k(3))
            .unwrap()
            .iter()
            .map(|s| s.id.0)
            .collect();
        let second: Vec<i64> = db
            .shingles()
            .rows(ids[1], k(3))
            .unwrap()
            .iter()
            .map(|s| s.id.0)
            .collect();

        assert_eq!(first, vec![1, 2, 3, 4]);
        assert_eq!(second, vec![5, 6, 7, 8]);
    }

    #[test]
    fn test_rows_carry_source_and_length() {
        let (db, ids) = setup(&["a.txt"]);
        db.shingles()
            .ingest(ids[0], k(2), &extract("ACG", k(2)))
            .unwrap();

        let rows = db.shingles().rows(ids[0], k(2)).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows
            .iter()
            .all(|s| s.source_id == ids[0] && s.length == k(2) && s.value.len() == 2));
    }

    #[test]
    fn test_empty_set_is_not_skipped() {
        let (db, ids) = setup(&["short.txt"]);

        let outcome = db
            .shingles()
            .ingest(ids[0], k(9), &ShingleSet::new())
            .unwrap();
        assert_eq!(outcome, IngestOutcome::inserted(0));

        // Nothing was persisted, so the pair still looks unshingled
        let again = db
            .shingles()
            .ingest(ids[0], k(9), &ShingleSet::new())
            .unwrap();
        assert_eq!(again, IngestOutcome::inserted(0));
        assert_eq!(IdSequence::Shingles.peek(db.connection()).unwrap(), 1);
    }

    #[test]
    fn test_lengths_are_independent() {
        let (db, ids) = setup(&["a.txt"]);
        let text = "ACGTACGTAC";

        db.shingles()
            .ingest(ids[0], k(3), &extract(text, k(3)))
            .unwrap();
        let outcome = db
            .shingles()
            .ingest(ids[0], k(5), &extract(text, k(5)))
            .unwrap();
        assert!(!outcome.skipped);

        let lengths = db.shingles().ingested_lengths(ids[0]).unwrap();
        assert_eq!(
            lengths,
            vec![
                ShingledLength {
                    length: k(3),
                    count: extract(text, k(3)).len()
                },
                ShingledLength {
                    length: k(5),
                    count: extract(text, k(5)).len()
                },
            ]
        );
    }

    #[test]
    fn test_never_ingested_pair_is_empty() {
        let (db, ids) = setup(&["a.txt"]);
        assert!(db.shingles().shingle_set(ids[0], k(9)).unwrap().is_empty());
        assert!(db.shingles().shingle_set(SourceId(99), k(9)).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_source_rejected() {
        let db = GenomeDb::in_memory().unwrap();
        let result = db
            .shingles()
            .ingest(SourceId(42), k(3), &extract("ACGT", k(3)));
        assert!(matches!(result, Err(StoreError::UnknownSource(SourceId(42)))));
        assert_eq!(IdSequence::Shingles.peek(db.connection()).unwrap(), 1);
    }

    #[test]
    fn test_failed_batch_writes_nothing() {
        let (db, ids) = setup(&["a.txt", "b.txt"]);

        // Occupy id 3 without advancing the counter, so the batch fails midway
        db.connection()
            .execute(
                "INSERT INTO shingles (id, source_id, value, length) VALUES (3, ?1, 'TT', 2)",
                params![ids[1].get()],
            )
            .unwrap();

        let shingles = extract("ACGTAC", k(3));
        assert_eq!(shingles.len(), 4);
        let result = db.shingles().ingest(ids[0], k(3), &shingles);

        assert!(matches!(result, Err(StoreError::Conflict(_))));
        assert_eq!(db.shingles().shingle_count(ids[0], k(3)).unwrap(), 0);
        assert_eq!(IdSequence::Shingles.peek(db.connection()).unwrap(), 1);
        assert_eq!(db.shingles().shingle_count(ids[1], k(2)).unwrap(), 1);
    }
}
