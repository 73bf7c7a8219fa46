//! # genome-jaccard
//!
//! A library for estimating how similar two genome sequences are without
//! aligning them.
//!
//! Each sequence is cut into every overlapping substring of a fixed length k
//! (its shingles, or k-mers). The distinct shingles are stored per sequence and
//! per k in a SQLite database, and two stored sets are compared with the
//! Jaccard index `|A ∩ B| / |A ∪ B|`.
//!
//! ## Features
//!
//! - **Idempotent ingestion**: a sequence is registered once per name and
//!   shingled once per k; repeating the request changes nothing
//! - **Atomic id allocation**: row ids come from store-owned counters reserved
//!   inside the same transaction as the rows they number
//! - **Explicit undefined results**: comparing two empty sets is an error, never
//!   a silent 0 or 1
//! - **Text and FASTA input**: plain text files or (gzipped) FASTA
//!
//! ## Example
//!
//! ```rust
//! use genome_jaccard::core::ShingleLength;
//! use genome_jaccard::pipeline::{calc_jaccard, SequenceInput};
//! use genome_jaccard::store::GenomeDb;
//!
//! let db = GenomeDb::in_memory().unwrap();
//! let k = ShingleLength::new(9).unwrap();
//!
//! let score = calc_jaccard(
//!     &db,
//!     SequenceInput::new("a.txt", "AAAAAAAAAT"),
//!     SequenceInput::new("b.txt", "AAAAAAAAAA"),
//!     k,
//! )
//! .unwrap();
//!
//! assert_eq!(score.intersection, 1);
//! assert_eq!(score.union, 2);
//! assert_eq!(score.jaccard, 0.5);
//! ```
//!
//! ## Modules
//!
//! - [`shingling`]: Sequence normalization and k-mer extraction
//! - [`store`]: Sequence registry and shingle persistence
//! - [`matching`]: Jaccard similarity over stored sets
//! - [`pipeline`]: The end-to-end ingest-and-compare flow
//! - [`parsing`]: Loaders for text and FASTA files
//! - [`cli`]: Command-line interface implementation

pub mod cli;
pub mod config;
pub mod core;
pub mod matching;
pub mod parsing;
pub mod pipeline;
pub mod shingling;
pub mod store;
pub mod utils;

// Re-export commonly used types for convenience
pub use crate::core::types::*;
pub use matching::engine::{SimilarityEngine, SimilarityError};
pub use pipeline::{calc_jaccard, JaccardError, SequenceInput};
pub use store::GenomeDb;
