use std::collections::HashSet;

use crate::core::types::ShingleLength;

/// Deduplicated k-mers of one sequence. Iteration order carries no meaning.
pub type ShingleSet = HashSet<String>;

/// Normalize raw sequence text.
///
/// Lines are joined in input order with no separator, and every space,
/// carriage return and newline is removed. Tabs and other whitespace are kept.
#[must_use]
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, ' ' | '\r' | '\n'))
        .collect()
}

/// Extract the set of length-`k` substrings of the normalized `raw` text.
///
/// A sequence shorter than `k` yields an empty set.
#[must_use]
pub fn extract(raw: &str, k: ShingleLength) -> ShingleSet {
    extract_normalized(&normalize(raw), k)
}

/// Extract shingles from text that is already normalized.
#[must_use]
pub fn extract_normalized(normalized: &str, k: ShingleLength) -> ShingleSet {
    let k = k.get();

    // Byte offset of every char start, plus the end, so windows stay on char boundaries
    let bounds: Vec<usize> = normalized
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(normalized.len()))
        .collect();
    let char_count = bounds.len() - 1;

    if char_count < k {
        return ShingleSet::new();
    }

    let mut shingles = ShingleSet::with_capacity(char_count - k + 1);
    for start in 0..=char_count - k {
        let window = &normalized[bounds[start]..bounds[start + k]];
        if !shingles.contains(window) {
            shingles.insert(window.to_string());
        }
    }
    shingles
}
