use serde::{Deserialize, Serialize};

use crate::core::types::{ShingleId, ShingleLength, SourceId};

/// A registered source sequence, created once per distinct name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceRecord {
    pub id: SourceId,

    /// Caller-supplied identifier, usually the file path
    pub name: String,

    /// MD5 of the normalized sequence at first registration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub md5: Option<String>,

    /// RFC 3339 registration time
    pub created_at: String,
}

/// One persisted k-mer of a source sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shingle {
    pub id: ShingleId,
    pub source_id: SourceId,
    pub value: String,
    pub length: ShingleLength,
}

/// Per-length shingle summary of a registered sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShingledLength {
    pub length: ShingleLength,
    pub count: usize,
}
