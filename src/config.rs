//! Runtime configuration: where the store lives and which k to use.
//!
//! Defaults can be overridden from a JSON file and then from the command line:
//!
//! ```json
//! { "database": "genomes.sqlite", "shingle_length": 9 }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::ShingleLength;
use crate::utils::validation::ValidationError;

/// Database file used when none is configured
pub const DEFAULT_DATABASE: &str = "genomes.sqlite";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// SQLite database holding sequences and shingles
    pub database: PathBuf,

    /// Shingle length k
    pub shingle_length: ShingleLength,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: PathBuf::from(DEFAULT_DATABASE),
            shingle_length: ShingleLength::default(),
        }
    }
}

/// Fields a config file may leave to defaults
#[derive(Deserialize)]
struct ExplicitFields {
    shingle_length: Option<ShingleLength>,
}

impl Config {
    /// Load configuration from a JSON file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ReadError` or `ConfigError::ParseError`.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse configuration from a JSON string; missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ParseError` for invalid JSON, unknown fields, or a
    /// zero shingle length.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The shingle length a config JSON sets itself, `None` when it falls back
    /// to the default.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ParseError` for invalid JSON or a zero shingle length.
    pub fn explicit_shingle_length(json: &str) -> Result<Option<ShingleLength>, ConfigError> {
        let fields: ExplicitFields = serde_json::from_str(json)?;
        Ok(fields.shingle_length)
    }

    /// Apply command-line overrides on top of this configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `shingle_length` is zero.
    pub fn with_overrides(
        mut self,
        database: Option<PathBuf>,
        shingle_length: Option<usize>,
    ) -> Result<Self, ConfigError> {
        if let Some(database) = database {
            self.database = database;
        }
        if let Some(k) = shingle_length {
            self.shingle_length = ShingleLength::new(k)?;
        }
        Ok(self)
    }
}
