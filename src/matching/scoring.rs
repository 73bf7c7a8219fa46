use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::core::types::{ShingleLength, SourceId};

/// Convert a set cardinality to f64 for ratio calculations
#[inline]
fn count_to_f64(count: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        count as f64
    }
}

/// Intersection and union cardinalities of two shingle sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overlap {
    pub intersection: usize,
    pub union: usize,
}

impl Overlap {
    /// Count the overlap of two in-memory sets
    #[must_use]
    #[allow(clippy::implicit_hasher)]
    pub fn from_sets<T: Eq + std::hash::Hash>(a: &HashSet<T>, b: &HashSet<T>) -> Self {
        let intersection = a.intersection(b).count();
        // |A ∪ B| = |A| + |B| - |A ∩ B|
        let union = a.len() + b.len() - intersection;
        Self {
            intersection,
            union,
        }
    }

    /// Jaccard ratio `|A ∩ B| / |A ∪ B|`, or `None` when both sets are empty.
    ///
    /// Computed in full double precision with no rounding.
    #[must_use]
    pub fn ratio(&self) -> Option<f64> {
        if self.union == 0 {
            None
        } else {
            Some(count_to_f64(self.intersection) / count_to_f64(self.union))
        }
    }
}

/// Jaccard similarity: |A ∩ B| / |A ∪ B|
///
/// Returns `None` when both sets are empty: the ratio is undefined there and
/// must not be mistaken for either 0 or 1.
#[must_use]
#[allow(clippy::implicit_hasher)]
pub fn jaccard_similarity<T: Eq + std::hash::Hash>(a: &HashSet<T>, b: &HashSet<T>) -> Option<f64> {
    Overlap::from_sets(a, b).ratio()
}

/// A computed similarity between two stored sequences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityScore {
    pub source_a: SourceId,
    pub source_b: SourceId,
    pub shingle_length: ShingleLength,
    pub intersection: usize,
    pub union: usize,
    /// Always within [0, 1]
    pub jaccard: f64,
}
