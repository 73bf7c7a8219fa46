//! Loader for FASTA files using noodles.
//!
//! The sequences of all records are concatenated in file order into one
//! sequence text; record names and descriptions are dropped.
//! Supports both uncompressed and gzip/bgzip compressed files.
//!
//! Supported extensions:
//! - `.fa`, `.fasta`, `.fna` (uncompressed)
//! - `.fa.gz`, `.fasta.gz`, `.fna.gz` (gzip compressed)
//! - `.fa.bgz`, `.fasta.bgz`, `.fna.bgz` (bgzip compressed)

use std::ffi::OsStr;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use noodles::fasta;
use tracing::debug;

use crate::parsing::text::LoadError;
use crate::utils::validation::{check_sequence_size, MAX_SEQUENCE_BYTES};

/// Check if the path has a FASTA extension
pub fn is_fasta_file(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();

    // Check for gzipped FASTA
    if path_str.ends_with(".fa.gz")
        || path_str.ends_with(".fasta.gz")
        || path_str.ends_with(".fna.gz")
        || path_str.ends_with(".fa.bgz")
        || path_str.ends_with(".fasta.bgz")
        || path_str.ends_with(".fna.bgz")
    {
        return true;
    }

    // Check for uncompressed FASTA
    matches!(
        path.extension()
            .and_then(OsStr::to_str)
            .map(str::to_lowercase)
            .as_deref(),
        Some("fa" | "fasta" | "fna")
    )
}

/// Check if the path is a gzipped file
#[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".bgz")
}

/// Load a FASTA file as a single sequence text.
///
/// # Errors
///
/// Returns `LoadError::Io` if the file cannot be read, `LoadError::Malformed` if
/// a record cannot be parsed, is not UTF-8 or no records are found, and
/// `LoadError::TooLarge` if the sequence exceeds the size limit.
pub fn load_fasta_file(path: &Path) -> Result<String, LoadError> {
    let file = std::fs::File::open(path)?;
    if let Some(msg) = check_sequence_size(file.metadata()?.len()) {
        return Err(LoadError::TooLarge(msg));
    }

    if is_gzipped(path) {
        let reader = BufReader::new(MultiGzDecoder::new(file));
        load_fasta_reader(&mut fasta::io::Reader::new(reader))
    } else {
        let reader = BufReader::new(file);
        load_fasta_reader(&mut fasta::io::Reader::new(reader))
    }
}

/// Concatenate the sequences of every record from a noodles FASTA reader
fn load_fasta_reader<R: BufRead>(reader: &mut fasta::io::Reader<R>) -> Result<String, LoadError> {
    let mut sequence = String::new();
    let mut records = 0usize;

    for result in reader.records() {
        let record = result
            .map_err(|e| LoadError::Malformed(format!("Failed to parse FASTA record: {e}")))?;

        let residues = std::str::from_utf8(record.sequence().as_ref()).map_err(|e| {
            LoadError::Malformed(format!(
                "FASTA record {} is not valid UTF-8: {e}",
                String::from_utf8_lossy(record.name())
            ))
        })?;

        if (sequence.len() + residues.len()) as u64 > MAX_SEQUENCE_BYTES {
            return Err(LoadError::TooLarge(format!(
                "FASTA sequence exceeds maximum of {MAX_SEQUENCE_BYTES} bytes"
            )));
        }

        sequence.push_str(residues);
        records += 1;
    }

    if records == 0 {
        return Err(LoadError::Malformed(
            "No sequences found in FASTA file".to_string(),
        ));
    }

    debug!(
        "Loaded {} FASTA records ({} residues)",
        records,
        sequence.len()
    );
    Ok(sequence)
}
