//! Core data types for shingle-based genome comparison.
//!
//! - [`SequenceRecord`]: A registered source sequence with its stable numeric id
//! - [`Shingle`]: A single persisted k-mer belonging to a `(source, length)` pair
//! - [`SourceId`], [`ShingleId`], [`ShingleLength`]: Strongly typed identifiers
//! - [`IngestOutcome`], [`PipelineState`]: Ingestion bookkeeping
//!
//! ## Lifecycle
//!
//! A sequence moves `Unregistered -> Registered(id) -> Shingled(id, k)` and can be
//! shingled independently for any number of distinct `k`. Nothing is ever updated
//! or deleted.

pub mod sequence;
pub mod types;

pub use sequence::{SequenceRecord, Shingle, ShingledLength};
pub use types::{IngestOutcome, PipelineState, ShingleId, ShingleLength, SourceId};
