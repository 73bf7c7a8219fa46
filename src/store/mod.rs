//! Persistent storage of registered sequences and their shingle sets.
//!
//! Everything lives in a single SQLite database:
//!
//! - [`registry`]: maps a sequence name to a stable [`SourceId`]
//! - [`shingles`]: the deduplicated shingle set per `(source, length)` pair
//! - [`ids`]: counters that hand out row ids for both entities
//!
//! Registration and batch ingestion each run in one `BEGIN IMMEDIATE`
//! transaction, so id reservation is atomic across processes and a batch
//! either lands completely or not at all.
//!
//! ## Example
//!
//! ```rust
//! use genome_jaccard::core::ShingleLength;
//! use genome_jaccard::shingling::extract;
//! use genome_jaccard::store::GenomeDb;
//!
//! let db = GenomeDb::in_memory().unwrap();
//! let k = ShingleLength::new(9).unwrap();
//!
//! let id = db.registry().resolve_or_create("Genome_1.txt").unwrap();
//! let outcome = db.shingles().ingest(id, k, &extract("AAAAAAAAAT", k)).unwrap();
//! assert_eq!(outcome.inserted, 2);
//!
//! // Re-ingesting the same pair is a no-op
//! let again = db.shingles().ingest(id, k, &extract("AAAAAAAAAT", k)).unwrap();
//! assert!(again.skipped);
//! ```

use thiserror::Error;

use crate::core::types::SourceId;
use crate::utils::validation::ValidationError;

pub mod db;
pub mod ids;
pub mod registry;
pub mod schema;
pub mod shingles;

pub use db::GenomeDb;
pub use ids::IdSequence;
pub use registry::SequenceRegistry;
pub use shingles::ShingleStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(#[source] rusqlite::Error),

    /// A write collided with an existing row
    #[error("Store conflict: {0}")]
    Conflict(#[source] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid stored row: {0}")]
    InvalidRow(String),

    #[error("Unknown source id: {0}")]
    UnknownSource(SourceId),

    #[error("Id sequence '{0}' cannot reserve {1} ids")]
    IdOverflow(&'static str, usize),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match err.sqlite_error_code() {
            Some(rusqlite::ErrorCode::ConstraintViolation) => Self::Conflict(err),
            _ => Self::Unavailable(err),
        }
    }
}

/// Convert a stored count to `usize`, rejecting negative values
pub(crate) fn count_from_i64(count: i64) -> Result<usize, StoreError> {
    usize::try_from(count).map_err(|_| StoreError::InvalidRow(format!("negative count {count}")))
}
