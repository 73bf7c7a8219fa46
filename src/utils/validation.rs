//! Centralized validation and helper functions.

/// Maximum raw sequence size accepted by the loaders (DOS protection)
pub const MAX_SEQUENCE_BYTES: u64 = 1 << 30;

/// Longest sequence name stored in the registry
pub const MAX_NAME_LENGTH: usize = 4096;

/// Validation error types
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Shingle length must be at least 1")]
    ZeroShingleLength,
    #[error("Empty sequence name provided")]
    EmptyName,
    #[error("Sequence name too long: exceeds {MAX_NAME_LENGTH} characters")]
    NameTooLong,
    #[error("Sequence name contains a null byte")]
    InvalidName,
}

/// Validate a sequence name before it is registered.
///
/// Names are opaque identifiers (usually file paths), so only empty names,
/// embedded null bytes and absurd lengths are rejected.
///
/// # Errors
///
/// Returns `ValidationError::EmptyName`, `ValidationError::NameTooLong` or
/// `ValidationError::InvalidName`.
pub fn validate_sequence_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err(ValidationError::NameTooLong);
    }
    if name.contains('\0') {
        return Err(ValidationError::InvalidName);
    }
    Ok(())
}

/// Check a raw input size against [`MAX_SEQUENCE_BYTES`].
///
/// Returns an error message if the size is over the limit, None if safe to load.
#[must_use]
pub fn check_sequence_size(bytes: u64) -> Option<String> {
    if bytes > MAX_SEQUENCE_BYTES {
        Some(format!(
            "Sequence input of {bytes} bytes exceeds maximum of {MAX_SEQUENCE_BYTES}"
        ))
    } else {
        None
    }
}

/// MD5 digest of a normalized sequence, as lowercase hex.
///
/// # Examples
///
/// ```
/// use genome_jaccard::utils::validation::sequence_digest;
///
/// assert_eq!(sequence_digest("ACGT"), "f1f8f4bf413b16ad135722aa4591043e");
/// ```
#[must_use]
pub fn sequence_digest(normalized: &str) -> String {
    format!("{:x}", md5::compute(normalized.as_bytes()))
}
