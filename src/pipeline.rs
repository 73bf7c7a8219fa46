//! End-to-end similarity computation: extract, register, ingest, compare.
//!
//! Both sequences are fully registered and ingested before either is queried,
//! so the comparison never reads a partially written set.

use std::path::Path;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::core::types::{IngestOutcome, ShingleLength, SourceId};
use crate::matching::engine::SimilarityError;
use crate::matching::scoring::SimilarityScore;
use crate::parsing::{load_sequence, LoadError};
use crate::shingling::{extract_normalized, normalize};
use crate::store::{GenomeDb, StoreError};
use crate::utils::validation::sequence_digest;

#[derive(Error, Debug)]
pub enum JaccardError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(
        "Similarity undefined: sources {source_a} and {source_b} have no shingles of length {length}"
    )]
    UndefinedSimilarity {
        source_a: SourceId,
        source_b: SourceId,
        length: ShingleLength,
    },
}

impl From<SimilarityError> for JaccardError {
    fn from(err: SimilarityError) -> Self {
        match err {
            SimilarityError::Store(e) => Self::Store(e),
            SimilarityError::Undefined {
                source_a,
                source_b,
                length,
            } => Self::UndefinedSimilarity {
                source_a,
                source_b,
                length,
            },
        }
    }
}

/// A named sequence whose raw text is already in memory
#[derive(Debug, Clone, Copy)]
pub struct SequenceInput<'a> {
    pub name: &'a str,
    pub text: &'a str,
}

impl<'a> SequenceInput<'a> {
    pub fn new(name: &'a str, text: &'a str) -> Self {
        Self { name, text }
    }
}

/// What happened when one sequence was ingested
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub name: String,
    pub source_id: SourceId,
    pub shingle_length: ShingleLength,
    /// Distinct shingles extracted from the input
    pub extracted: usize,
    #[serde(flatten)]
    pub outcome: IngestOutcome,
}

/// Register a sequence and persist its shingles for `length`.
///
/// # Errors
///
/// Returns `JaccardError::Store` if the store cannot be read or written.
pub fn ingest_sequence(
    db: &GenomeDb,
    input: SequenceInput<'_>,
    length: ShingleLength,
) -> Result<IngestReport, JaccardError> {
    let normalized = normalize(input.text);
    let shingles = extract_normalized(&normalized, length);
    debug!(
        "Extracted {} distinct shingles of length {} from '{}' ({} residues)",
        shingles.len(),
        length,
        input.name,
        normalized.chars().count()
    );

    let digest = sequence_digest(&normalized);
    let source_id = db
        .registry()
        .resolve_or_create_with_digest(input.name, Some(&digest))?;
    let outcome = db.shingles().ingest(source_id, length, &shingles)?;

    Ok(IngestReport {
        name: input.name.to_string(),
        source_id,
        shingle_length: length,
        extracted: shingles.len(),
        outcome,
    })
}

/// Load a sequence file and ingest it under its path.
///
/// # Errors
///
/// Returns `JaccardError::Load` if the file cannot be loaded and
/// `JaccardError::Store` if the store cannot be read or written.
pub fn ingest_file(
    db: &GenomeDb,
    path: &Path,
    length: ShingleLength,
) -> Result<IngestReport, JaccardError> {
    let text = load_sequence(path)?;
    let name = path.display().to_string();
    ingest_sequence(db, SequenceInput::new(&name, &text), length)
}

/// Jaccard similarity of two sequences at shingle length `length`.
///
/// # Errors
///
/// Returns `JaccardError::UndefinedSimilarity` when neither sequence yields any
/// shingle of this length, and `JaccardError::Store` on database failure.
pub fn calc_jaccard(
    db: &GenomeDb,
    a: SequenceInput<'_>,
    b: SequenceInput<'_>,
    length: ShingleLength,
) -> Result<SimilarityScore, JaccardError> {
    let report_a = ingest_sequence(db, a, length)?;
    let report_b = ingest_sequence(db, b, length)?;
    compare_ingested(db, &report_a, &report_b)
}

/// [`calc_jaccard`] over two sequence files, each registered under its path.
///
/// # Errors
///
/// Returns `JaccardError::Load` if either file cannot be loaded, otherwise the
/// same errors as [`calc_jaccard`].
pub fn calc_jaccard_files(
    db: &GenomeDb,
    path_a: &Path,
    path_b: &Path,
    length: ShingleLength,
) -> Result<(IngestReport, IngestReport, SimilarityScore), JaccardError> {
    let report_a = ingest_file(db, path_a, length)?;
    let report_b = ingest_file(db, path_b, length)?;
    let score = compare_ingested(db, &report_a, &report_b)?;
    Ok((report_a, report_b, score))
}

fn compare_ingested(
    db: &GenomeDb,
    a: &IngestReport,
    b: &IngestReport,
) -> Result<SimilarityScore, JaccardError> {
    Ok(db
        .similarity()
        .score(a.source_id, b.source_id, a.shingle_length)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn k(n: usize) -> ShingleLength {
        ShingleLength::new(n).unwrap()
    }

    #[test]
    fn test_ingest_sequence_reports_outcome() {
        let db = GenomeDb::in_memory().unwrap();

        let first = ingest_sequence(&db, SequenceInput::new("a.txt", "AAAAAAAAAT"), k(9)).unwrap();
        assert_eq!(first.source_id, SourceId(1));
        assert_eq!(first.extracted, 2);
        assert_eq!(first.outcome, IngestOutcome::inserted(2));

        let second = ingest_sequence(&db, SequenceInput::new("a.txt", "AAAAAAAAAT"), k(9)).unwrap();
        assert_eq!(second.source_id, SourceId(1));
        assert_eq!(second.outcome, IngestOutcome::skipped());
    }

    #[test]
    fn test_ingest_records_digest_of_normalized_text() {
        let db = GenomeDb::in_memory().unwrap();
        let report = ingest_sequence(&db, SequenceInput::new("a.txt", "AC GT\n"), k(2)).unwrap();

        let record = db.registry().get(report.source_id).unwrap().unwrap();
        assert_eq!(record.md5, Some(sequence_digest("ACGT")));
    }

    #[test]
    fn test_calc_jaccard_half_overlap() {
        let db = GenomeDb::in_memory().unwrap();
        let score = calc_jaccard(
            &db,
            SequenceInput::new("a.txt", "AAAAAAAAAT"),
            SequenceInput::new("b.txt", "AAAAAAAAAA"),
            k(9),
        )
        .unwrap();

        assert_eq!(score.source_a, SourceId(1));
        assert_eq!(score.source_b, SourceId(2));
        assert_eq!(score.jaccard, 0.5);
    }

    #[test]
    fn test_calc_jaccard_undefined() {
        let db = GenomeDb::in_memory().unwrap();
        let result = calc_jaccard(
            &db,
            SequenceInput::new("a.txt", "ACGT"),
            SequenceInput::new("b.txt", "TTGA"),
            k(9),
        );
        assert!(matches!(
            result,
            Err(JaccardError::UndefinedSimilarity { .. })
        ));
    }

    #[test]
    fn test_ingest_report_json_is_flat() {
        let db = GenomeDb::in_memory().unwrap();
        let report = ingest_sequence(&db, SequenceInput::new("a.txt", "ACGT"), k(2)).unwrap();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["inserted"], 3);
        assert_eq!(json["skipped"], false);
        assert_eq!(json["shingle_length"], 2);
    }
}
