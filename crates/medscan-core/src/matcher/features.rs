//! Feature extraction from recognized text.
//!
//! Handles:
//! - Dosage numbers (standalone runs of 1 to 4 digits)
//! - Pharmaceutical forms (whole words from a configurable vocabulary,
//!   resolved to their canonical singular token)

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{MatcherError, MatcherResult};
use crate::models::ExtractedFeatures;

/// Dosage candidates: 1 to 4 ASCII digits on word boundaries.
const DOSAGE_PATTERN: &str = r"\b[0-9]{1,4}\b";

/// Canonical pharmaceutical forms and the surface words that resolve to them.
///
/// Serialized as a JSON object: `{"comprime": ["comprimes", "comprimés"]}`.
/// The canonical token itself is always recognized.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct FormVocabulary {
    forms: BTreeMap<String, Vec<String>>,
}

impl Default for FormVocabulary {
    fn default() -> Self {
        let mut vocabulary = Self::empty();
        vocabulary.add_form("comprime", &["comprimé", "comprimes", "comprimés"]);
        vocabulary.add_form("gelule", &["gélule", "gelules", "gélules"]);
        vocabulary.add_form("sirop", &["sirops"]);
        vocabulary.add_form("injection", &["injections"]);
        vocabulary.add_form("creme", &["crème", "cremes", "crèmes"]);
        vocabulary.add_form("pommade", &["pommades"]);
        vocabulary.add_form("suppositoire", &["suppositoires"]);
        vocabulary
    }
}

impl FormVocabulary {
    /// A vocabulary that recognizes nothing.
    pub fn empty() -> Self {
        Self {
            forms: BTreeMap::new(),
        }
    }

    /// Parse a vocabulary from JSON.
    pub fn from_json_str(json: &str) -> MatcherResult<Self> {
        let parsed: Self = serde_json::from_str(json)?;
        let mut vocabulary = Self::empty();
        for (canonical, variants) in &parsed.forms {
            if canonical.trim().is_empty() {
                return Err(MatcherError::Vocabulary(
                    "canonical form must not be empty".into(),
                ));
            }
            let variants: Vec<&str> = variants.iter().map(String::as_str).collect();
            vocabulary.add_form(canonical, &variants);
        }
        Ok(vocabulary)
    }

    /// Load a vocabulary from a JSON file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> MatcherResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Add a canonical form with its surface variants.
    pub fn add_form(&mut self, canonical: &str, variants: &[&str]) {
        let entry = self
            .forms
            .entry(canonical.trim().to_lowercase())
            .or_default();
        for variant in variants {
            let variant = variant.trim().to_lowercase();
            if !variant.is_empty() && !entry.contains(&variant) {
                entry.push(variant);
            }
        }
    }

    /// Canonical tokens, sorted.
    pub fn canonical_forms(&self) -> impl Iterator<Item = &str> {
        self.forms.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }

    /// Surface word (lowercase) → canonical token.
    fn surface_map(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        for (canonical, variants) in &self.forms {
            map.insert(canonical.clone(), canonical.clone());
            for variant in variants {
                map.insert(variant.clone(), canonical.clone());
            }
        }
        map
    }
}

/// Pulls dosage numbers and form tokens out of recognized text.
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    dosage_pattern: Regex,
    /// None when the vocabulary is empty
    form_pattern: Option<Regex>,
    surfaces: HashMap<String, String>,
}

impl FeatureExtractor {
    /// Create an extractor with the default French vocabulary.
    pub fn new() -> MatcherResult<Self> {
        Self::with_vocabulary(&FormVocabulary::default())
    }

    /// Create an extractor for a custom vocabulary.
    pub fn with_vocabulary(vocabulary: &FormVocabulary) -> MatcherResult<Self> {
        let surfaces = vocabulary.surface_map();

        // Longest first so a plural is never shadowed by its singular prefix
        let mut words: Vec<&String> = surfaces.keys().collect();
        words.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));

        let form_pattern = if words.is_empty() {
            None
        } else {
            let alternation = words
                .iter()
                .map(|w| regex::escape(w))
                .collect::<Vec<_>>()
                .join("|");
            Some(Regex::new(&format!(r"(?i)\b(?:{})\b", alternation))?)
        };

        Ok(Self {
            dosage_pattern: Regex::new(DOSAGE_PATTERN)?,
            form_pattern,
            surfaces,
        })
    }

    /// Extract features from one recognized-text string.
    pub fn extract(&self, text: &str) -> ExtractedFeatures {
        ExtractedFeatures {
            dosages: self.extract_dosages(text),
            forms: self.extract_forms(text).into_iter().collect(),
        }
    }

    /// Dosage numbers in order of appearance, duplicates kept.
    pub fn extract_dosages(&self, text: &str) -> Vec<String> {
        self.dosage_pattern
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// Canonical form tokens in order of appearance.
    pub fn extract_forms(&self, text: &str) -> Vec<String> {
        let Some(pattern) = &self.form_pattern else {
            return Vec::new();
        };
        pattern
            .find_iter(text)
            .filter_map(|m| self.surfaces.get(&m.as_str().to_lowercase()).cloned())
            .collect()
    }
}
