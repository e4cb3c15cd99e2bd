//! Matching models: extracted text features and scored catalog candidates.

use std::collections::BTreeSet;

use serde::Serialize;

use super::MedicationRecord;

/// Weight of the name score in the total.
pub const NAME_WEIGHT: f64 = 0.6;

/// Weight of the dosage score in the total.
pub const DOSAGE_WEIGHT: f64 = 0.4;

/// Signal pulled out of one recognized-text string.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ExtractedFeatures {
    /// Dosage numbers in order of appearance, duplicates kept
    pub dosages: Vec<String>,
    /// Canonical form tokens
    pub forms: BTreeSet<String>,
}

impl ExtractedFeatures {
    /// Return the extracted form token equal to `form`, ignoring case.
    pub fn matching_form(&self, form: &str) -> Option<&str> {
        let form_lower = form.to_lowercase();
        self.forms
            .iter()
            .find(|f| f.to_lowercase() == form_lower)
            .map(String::as_str)
    }
}

/// A catalog record that cleared the acceptance threshold.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ScoredCandidate<'a> {
    /// The matched catalog record
    pub record: &'a MedicationRecord,
    /// Extracted form token equal to the record's form, if any.
    /// Shown to the user; not part of the total.
    pub matched_form: Option<String>,
    /// Partial-ratio similarity of the record name (0 - 100)
    pub name_score: u8,
    /// Dosage similarity (0 - 100)
    pub dosage_score: u8,
    /// Weighted total (0.0 - 100.0)
    pub total_score: f64,
}

impl<'a> ScoredCandidate<'a> {
    pub fn new(
        record: &'a MedicationRecord,
        matched_form: Option<String>,
        name_score: u8,
        dosage_score: u8,
    ) -> Self {
        Self {
            record,
            matched_form,
            name_score,
            dosage_score,
            total_score: combined_score(name_score, dosage_score),
        }
    }

    pub fn form_match(&self) -> bool {
        self.matched_form.is_some()
    }
}

/// Combine name and dosage scores into the total.
pub fn combined_score(name_score: u8, dosage_score: u8) -> f64 {
    NAME_WEIGHT * f64::from(name_score) + DOSAGE_WEIGHT * f64::from(dosage_score)
}

/// Outcome of one matching pass.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MatchReport<'a> {
    /// Text the catalog was matched against
    pub recognized_text: String,
    pub features: ExtractedFeatures,
    /// Candidates, best first
    pub candidates: Vec<ScoredCandidate<'a>>,
}

impl<'a> MatchReport<'a> {
    /// The first `n` candidates (fewer if not enough matched).
    pub fn top(&self, n: usize) -> &[ScoredCandidate<'a>] {
        &self.candidates[..n.min(self.candidates.len())]
    }

    pub fn all(&self) -> &[ScoredCandidate<'a>] {
        &self.candidates
    }

    pub fn best(&self) -> Option<&ScoredCandidate<'a>> {
        self.candidates.first()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}
