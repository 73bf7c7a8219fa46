//! Command-line interface for genome-jaccard.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **compare**: Jaccard similarity of two sequence files
//! - **ingest**: Register sequence files and store their shingles
//! - **list**: Show registered sequences and the k values they are shingled for
//!
//! ## Usage
//!
//! ```text
//! # Compare two genomes with the default k = 9
//! genome-jaccard compare Genome_1.txt Genome_2.txt
//!
//! # Use 12-mers and a specific database
//! genome-jaccard compare a.fa b.fa -k 12 --db /data/genomes.sqlite
//!
//! # Pre-load several files, then list them as JSON
//! genome-jaccard ingest *.fa
//! genome-jaccard list --format json
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::core::types::ShingleLength;

pub mod compare;
pub mod ingest;
pub mod list;

#[derive(Parser)]
#[command(name = "genome-jaccard")]
#[command(author = "Fulcrum Genomics")]
#[command(version)]
#[command(about = "Jaccard similarity of genome sequences from stored k-mer shingles")]
#[command(
    long_about = "genome-jaccard decomposes each genome sequence into overlapping k-mers (shingles), stores the distinct k-mers per sequence in a SQLite database, and reports the Jaccard similarity |A ∩ B| / |A ∪ B| of two stored sets.\n\nSequences are registered once per name and shingled once per k, so repeated comparisons reuse stored data."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute the Jaccard similarity of two sequence files
    Compare(compare::CompareArgs),

    /// Register sequence files and store their shingles
    Ingest(ingest::IngestArgs),

    /// List registered sequences
    List(list::ListArgs),
}

/// Options shared by every command that touches the store
#[derive(clap::Args)]
pub struct StoreArgs {
    /// SQLite database file [default: genomes.sqlite]
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Shingle (k-mer) length [default: 9]
    #[arg(short = 'k', long = "shingle-length")]
    pub shingle_length: Option<usize>,

    /// JSON config file providing defaults for --db and -k
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl StoreArgs {
    /// Merge config file, defaults and flags; flags win
    pub fn resolve(&self) -> anyhow::Result<Config> {
        let base = match &self.config {
            Some(path) => Config::load_from_file(path)?,
            None => Config::default(),
        };
        Ok(base.with_overrides(self.db.clone(), self.shingle_length)?)
    }

    /// The k chosen by the flag or the config file, `None` when only the default applies
    pub fn explicit_shingle_length(&self) -> anyhow::Result<Option<ShingleLength>> {
        if let Some(k) = self.shingle_length {
            return Ok(Some(ShingleLength::new(k)?));
        }
        match &self.config {
            Some(path) => Ok(Config::explicit_shingle_length(&std::fs::read_to_string(
                path,
            )?)?),
            None => Ok(None),
        }
    }
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}
