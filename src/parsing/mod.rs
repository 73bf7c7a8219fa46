//! Loaders that turn a sequence file into raw sequence text.
//!
//! - **FASTA files** (`.fa`, `.fasta`, `.fna`, optionally gzipped): record
//!   sequences are concatenated in file order
//! - **Anything else**: read as plain UTF-8 text
//!
//! The returned text is not normalized; shingle extraction does that.
//!
//! ## Example
//!
//! ```rust,no_run
//! use genome_jaccard::parsing::load_sequence;
//! use std::path::Path;
//!
//! let text = load_sequence(Path::new("Genome_1.txt")).unwrap();
//! ```

use std::path::Path;

pub mod fasta;
pub mod text;

pub use text::LoadError;

/// Load a sequence file, choosing the loader from its extension.
///
/// # Errors
///
/// Returns a `LoadError` if the file cannot be read or decoded.
pub fn load_sequence(path: &Path) -> Result<String, LoadError> {
    if fasta::is_fasta_file(path) {
        fasta::load_fasta_file(path)
    } else {
        text::load_text_file(path)
    }
}
