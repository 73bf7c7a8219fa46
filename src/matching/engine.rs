use rusqlite::params;
use thiserror::Error;
use tracing::debug;

use crate::core::types::{ShingleLength, SourceId};
use crate::matching::scoring::{Overlap, SimilarityScore};
use crate::store::{count_from_i64, schema, GenomeDb, StoreError};

#[derive(Error, Debug)]
pub enum SimilarityError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(
        "Similarity undefined: sources {source_a} and {source_b} have no shingles of length {length}"
    )]
    Undefined {
        source_a: SourceId,
        source_b: SourceId,
        length: ShingleLength,
    },
}

/// Computes Jaccard similarity over shingle sets persisted in a [`GenomeDb`]
pub struct SimilarityEngine<'a> {
    db: &'a GenomeDb,
}

impl<'a> SimilarityEngine<'a> {
    pub fn new(db: &'a GenomeDb) -> Self {
        Self { db }
    }

    /// Intersection and union sizes of the two stored sets, counted by SQLite
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the store cannot be queried.
    pub fn overlap(
        &self,
        source_a: SourceId,
        source_b: SourceId,
        length: ShingleLength,
    ) -> Result<Overlap, StoreError> {
        let (intersection, union): (i64, i64) = self.db.connection().query_row(
            schema::SELECT_OVERLAP,
            params![source_a.get(), source_b.get(), length.as_i64()],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let overlap = Overlap {
            intersection: count_from_i64(intersection)?,
            union: count_from_i64(union)?,
        };
        debug!(
            "Overlap of {} and {} at k = {}: {} / {}",
            source_a, source_b, length, overlap.intersection, overlap.union
        );
        Ok(overlap)
    }

    /// Jaccard ratio of the two stored sets.
    ///
    /// # Errors
    ///
    /// Returns `SimilarityError::Undefined` when neither source has any shingles
    /// of this length, and `SimilarityError::Store` on database failure.
    pub fn jaccard(
        &self,
        source_a: SourceId,
        source_b: SourceId,
        length: ShingleLength,
    ) -> Result<f64, SimilarityError> {
        Ok(self.score(source_a, source_b, length)?.jaccard)
    }

    /// Jaccard ratio together with the counts it was computed from.
    ///
    /// # Errors
    ///
    /// Same as [`jaccard`](Self::jaccard).
    pub fn score(
        &self,
        source_a: SourceId,
        source_b: SourceId,
        length: ShingleLength,
    ) -> Result<SimilarityScore, SimilarityError> {
        let overlap = self.overlap(source_a, source_b, length)?;
        let jaccard = overlap.ratio().ok_or(SimilarityError::Undefined {
            source_a,
            source_b,
            length,
        })?;

        Ok(SimilarityScore {
            source_a,
            source_b,
            shingle_length: length,
            intersection: overlap.intersection,
            union: overlap.union,
            jaccard,
        })
    }
}
