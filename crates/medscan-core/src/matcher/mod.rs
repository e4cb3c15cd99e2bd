//! Matching engine for recognized text.
//!
//! Pipeline: Feature Extraction → Scoring → Ranking

mod features;
pub mod fuzz;
mod ranker;
mod scoring;

pub use features::*;
pub use ranker::*;
pub use scoring::*;

use thiserror::Error;
use tracing::debug;

use crate::models::{MatchReport, MedicationRecord};

/// Matcher errors.
#[derive(Error, Debug)]
pub enum MatcherError {
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Invalid form vocabulary: {0}")]
    Vocabulary(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type MatcherResult<T> = Result<T, MatcherError>;

/// Main matcher that coordinates the full pipeline.
#[derive(Debug, Clone)]
pub struct Matcher {
    extractor: FeatureExtractor,
    engine: ScoringEngine,
}

impl Matcher {
    /// Create a matcher with the default form vocabulary.
    pub fn new() -> MatcherResult<Self> {
        Self::with_vocabulary(&FormVocabulary::default())
    }

    pub fn with_vocabulary(vocabulary: &FormVocabulary) -> MatcherResult<Self> {
        Ok(Self {
            extractor: FeatureExtractor::with_vocabulary(vocabulary)?,
            engine: ScoringEngine::new(),
        })
    }

    /// Match recognized text against the catalog.
    ///
    /// An empty catalog produces an empty report, not an error.
    pub fn match_text<'a>(&self, text: &str, catalog: &'a [MedicationRecord]) -> MatchReport<'a> {
        // Step 1: Pull dosage and form signal out of the text
        let features = self.extractor.extract(text);

        // Step 2: Score every record, keeping those above threshold
        let candidates = self.engine.score(text, &features, catalog);

        // Step 3: Best first, ties in catalog order
        let candidates = rank(candidates);

        debug!(
            dosages = ?features.dosages,
            forms = ?features.forms,
            matches = candidates.len(),
            "matched recognized text"
        );

        MatchReport {
            recognized_text: text.to_string(),
            features,
            candidates,
        }
    }
}
