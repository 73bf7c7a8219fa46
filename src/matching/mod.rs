//! Jaccard similarity over persisted shingle sets.
//!
//! - [`SimilarityEngine`]: Queries intersection and union sizes from the store
//! - [`Overlap`]: The two cardinalities a ratio is computed from
//! - [`jaccard_similarity`]: The same computation over in-memory sets
//!
//! ## Undefined similarity
//!
//! When both compared sets are empty the union is empty too. This is reported
//! as [`SimilarityError::Undefined`] rather than a numeric 0 or 1.
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
//! let a = db.registry().resolve_or_create("a.txt").unwrap();
//! let b = db.registry().resolve_or_create("b.txt").unwrap();
//! db.shingles().ingest(a, k, &extract("AAAAAAAAAT", k)).unwrap();
//! db.shingles().ingest(b, k, &extract("AAAAAAAAAA", k)).unwrap();
//!
//! assert_eq!(db.similarity().jaccard(a, b, k).unwrap(), 0.5);
//! ```

pub mod engine;
pub mod scoring;

pub use engine::{SimilarityEngine, SimilarityError};
pub use scoring::{jaccard_similarity, Overlap, SimilarityScore};
