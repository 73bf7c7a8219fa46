use rusqlite::{params, Connection, Transaction};
use tracing::debug;

use super::StoreError;

/// Counters owned by the store, one per entity with numeric ids.
///
/// Ids are handed out in contiguous, strictly increasing blocks and are never
/// reused. Reservation happens inside the caller's immediate transaction, so
/// two writers can never receive overlapping blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdSequence {
    Sequences,
    Shingles,
}

impl IdSequence {
    #[must_use]
    pub fn entity(self) -> &'static str {
        match self {
            Self::Sequences => "sequences",
            Self::Shingles => "shingles",
        }
    }

    /// Reserve `count` consecutive ids and return the first one.
    ///
    /// Reserving zero ids returns the next id without consuming it.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` on database failure or
    /// `StoreError::IdOverflow` if the block cannot be represented.
    pub fn reserve(self, tx: &Transaction<'_>, count: usize) -> Result<i64, StoreError> {
        let first = self.peek(tx)?;
        if count == 0 {
            return Ok(first);
        }

        let step = i64::try_from(count)
            .ok()
            .filter(|step| first.checked_add(*step).is_some())
            .ok_or(StoreError::IdOverflow(self.entity(), count))?;

        tx.execute(
            "UPDATE id_sequences SET next_id = next_id + ?2 WHERE entity = ?1",
            params![self.entity(), step],
        )?;
        debug!(
            "Reserved {} {} ids starting at {}",
            count,
            self.entity(),
            first
        );
        Ok(first)
    }

    /// Next id that would be handed out
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the counter cannot be read.
    pub fn peek(self, conn: &Connection) -> Result<i64, StoreError> {
        Ok(conn.query_row(
            "SELECT next_id FROM id_sequences WHERE entity = ?1",
            params![self.entity()],
            |row| row.get(0),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::GenomeDb;

    #[test]
    fn test_reserve_hands_out_contiguous_blocks() {
        let db = GenomeDb::in_memory().unwrap();

        let tx = db.immediate_transaction().unwrap();
        assert_eq!(IdSequence::Shingles.reserve(&tx, 5).unwrap(), 1);
        assert_eq!(IdSequence::Shingles.reserve(&tx, 3).unwrap(), 6);
        tx.commit().unwrap();

        assert_eq!(IdSequence::Shingles.peek(db.connection()).unwrap(), 9);
    }

    #[test]
    fn test_reserve_zero_does_not_consume() {
        let db = GenomeDb::in_memory().unwrap();

        let tx = db.immediate_transaction().unwrap();
        assert_eq!(IdSequence::Sequences.reserve(&tx, 0).unwrap(), 1);
        assert_eq!(IdSequence::Sequences.reserve(&tx, 1).unwrap(), 1);
        tx.commit().unwrap();

        assert_eq!(IdSequence::Sequences.peek(db.connection()).unwrap(), 2);
    }

    #[test]
    fn test_counters_are_independent() {
        let db = GenomeDb::in_memory().unwrap();

        let tx = db.immediate_transaction().unwrap();
        IdSequence::Shingles.reserve(&tx, 10).unwrap();
        assert_eq!(IdSequence::Sequences.reserve(&tx, 1).unwrap(), 1);
        tx.commit().unwrap();
    }

    #[test]
    fn test_rolled_back_reservation_is_released() {
        let db = GenomeDb::in_memory().unwrap();

        {
            let tx = db.immediate_transaction().unwrap();
            IdSequence::Shingles.reserve(&tx, 4).unwrap();
            // dropped without commit
        }

        assert_eq!(IdSequence::Shingles.peek(db.connection()).unwrap(), 1);
    }
}
