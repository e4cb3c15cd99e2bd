//! Scanner configuration.
//!
//! Read from an optional JSON file; every field has a default. The openFDA
//! API key is a secret and is normally supplied through `OPENFDA_API_KEY`
//! rather than written into the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::interactions::DEFAULT_OPENFDA_URL;
use crate::matcher::{FormVocabulary, MatcherError, DEFAULT_SUMMARY_SIZE};

/// Environment variable holding the openFDA API key.
pub const API_KEY_ENV: &str = "OPENFDA_API_KEY";

/// Default tracing filter for the CLI.
pub const DEFAULT_LOG_FILTER: &str = "medscan_core=info";

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error reading config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid form vocabulary: {0}")]
    Vocabulary(#[from] MatcherError),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ScanConfig {
    /// Drug-label query endpoint
    pub openfda_url: String,
    /// Never serialized back out
    #[serde(skip_serializing)]
    pub openfda_api_key: Option<String>,
    /// Lookup timeout; the HTTP client default applies when unset
    pub timeout_secs: Option<u64>,
    /// Candidates shown in the summary view
    pub summary_size: usize,
    /// JSON form vocabulary; the built-in French one when unset
    pub vocabulary_path: Option<PathBuf>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            openfda_url: DEFAULT_OPENFDA_URL.to_string(),
            openfda_api_key: None,
            timeout_secs: None,
            summary_size: DEFAULT_SUMMARY_SIZE,
            vocabulary_path: None,
        }
    }
}

impl ScanConfig {
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a file (or defaults), then fill the API key from the
    /// environment if the file did not set one.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let config = match path {
            Some(path) => Self::from_json_str(&std::fs::read_to_string(path)?)?,
            None => Self::default(),
        };
        Ok(config.with_api_key_fallback(std::env::var(API_KEY_ENV).ok()))
    }

    /// Use `key` when no API key is configured. Blank keys count as unset.
    pub fn with_api_key_fallback(mut self, key: Option<String>) -> Self {
        let configured = self
            .openfda_api_key
            .take()
            .filter(|k| !k.trim().is_empty());
        self.openfda_api_key = configured.or(key.filter(|k| !k.trim().is_empty()));
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// The configured form vocabulary.
    pub fn vocabulary(&self) -> ConfigResult<FormVocabulary> {
        match &self.vocabulary_path {
            Some(path) => Ok(FormVocabulary::from_path(path)?),
            None => Ok(FormVocabulary::default()),
        }
    }
}
