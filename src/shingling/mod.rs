//! Decomposition of sequence text into k-mer shingles.
//!
//! ## Example
//!
//! ```rust
//! use genome_jaccard::core::ShingleLength;
//! use genome_jaccard::shingling::extract;
//!
//! let k = ShingleLength::new(9).unwrap();
//! let shingles = extract("AAAAAAAAAT", k);
//!
//! assert_eq!(shingles.len(), 2);
//! assert!(shingles.contains("AAAAAAAAA"));
//! assert!(shingles.contains("AAAAAAAAT"));
//! ```

pub mod extract;

pub use extract::{extract, extract_normalized, normalize, ShingleSet};
