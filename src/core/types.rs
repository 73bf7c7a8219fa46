use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::utils::validation::ValidationError;

/// Reference shingle length used when none is configured
pub const DEFAULT_SHINGLE_LENGTH: usize = 9;

/// Stable numeric id of a registered sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SourceId(pub i64);

impl SourceId {
    #[must_use]
    pub fn get(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// Numeric id of a single persisted shingle row
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ShingleId(pub i64);

impl std::fmt::Display for ShingleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// The k in k-mer: length of every shingle taken from a sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct ShingleLength(NonZeroUsize);

impl ShingleLength {
    /// Create a shingle length, rejecting zero.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::ZeroShingleLength` if `k` is zero.
    pub fn new(k: usize) -> Result<Self, ValidationError> {
        NonZeroUsize::new(k)
            .map(Self)
            .ok_or(ValidationError::ZeroShingleLength)
    }

    #[must_use]
    pub fn get(self) -> usize {
        self.0.get()
    }

    /// Value as stored in the database
    #[must_use]
    pub fn as_i64(self) -> i64 {
        #[allow(clippy::cast_possible_wrap)]
        {
            self.0.get() as i64
        }
    }
}

impl Default for ShingleLength {
    fn default() -> Self {
        Self(NonZeroUsize::new(DEFAULT_SHINGLE_LENGTH).unwrap_or(NonZeroUsize::MIN))
    }
}

impl TryFrom<usize> for ShingleLength {
    type Error = ValidationError;

    fn try_from(k: usize) -> Result<Self, Self::Error> {
        Self::new(k)
    }
}

impl From<ShingleLength> for usize {
    fn from(length: ShingleLength) -> Self {
        length.get()
    }
}

impl std::fmt::Display for ShingleLength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// Result of an ingestion request for one (source, length) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestOutcome {
    /// Number of shingle rows written by this call
    pub inserted: usize,
    /// True when the pair was already shingled and nothing was written
    pub skipped: bool,
}

impl IngestOutcome {
    #[must_use]
    pub fn inserted(count: usize) -> Self {
        Self {
            inserted: count,
            skipped: false,
        }
    }

    #[must_use]
    pub fn skipped() -> Self {
        Self {
            inserted: 0,
            skipped: true,
        }
    }
}

/// Where a sequence stands in the ingestion pipeline for a given length.
///
/// There is no transition back: records and shingles are never removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Unregistered,
    Registered(SourceId),
    Shingled(SourceId, ShingleLength),
}
