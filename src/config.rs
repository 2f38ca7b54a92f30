//! Runtime configuration for the ledger binary and runners.
//!
//! Loaded from an optional JSON file; every field has a default, so an empty
//! object (or no file at all) is a valid configuration.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::format::StatementFormat;

const DEFAULT_LOG_FILTER: &str = "rusty_ledger=info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error("invalid timestamp format: {0}")]
    InvalidTimestampFormat(String),
    #[error("statement precision {0} is out of range")]
    InvalidPrecision(u32),
}

/// What a batch run writes once all commands are applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Output {
    /// One CSV row per account.
    #[default]
    Summary,
    /// The full statement of every account.
    Statements,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// `tracing` filter directive, used when `RUST_LOG` is not set.
    pub log_filter: String,
    pub output: Output,
    pub statement: StatementFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: DEFAULT_LOG_FILTER.to_owned(),
            output: Output::default(),
            statement: StatementFormat::default(),
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    pub fn from_json(data: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(data).map_err(|err| ConfigError::Serde(err.to_string()))
    }
}
