//! Loader for plain-text sequence files.
//!
//! The whole file is read as UTF-8. Line breaks and spaces are left in place;
//! removing them is the job of [`crate::shingling::normalize`].

use std::path::Path;

use thiserror::Error;

use crate::utils::validation::check_sequence_size;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed sequence input: {0}")]
    Malformed(String),

    #[error("{0}")]
    TooLarge(String),
}

/// Read a plain-text sequence file into memory.
///
/// # Errors
///
/// Returns `LoadError::Io` if the file cannot be read, `LoadError::TooLarge` if
/// it exceeds the size limit, or `LoadError::Malformed` if it is not valid UTF-8.
pub fn load_text_file(path: &Path) -> Result<String, LoadError> {
    let size = std::fs::metadata(path)?.len();
    if let Some(msg) = check_sequence_size(size) {
        return Err(LoadError::TooLarge(msg));
    }

    let bytes = std::fs::read(path)?;
    String::from_utf8(bytes).map_err(|e| {
        LoadError::Malformed(format!("{} is not valid UTF-8: {e}", path.display()))
    })
}
