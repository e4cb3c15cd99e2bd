//! Per-record scoring of recognized text against the catalog.
//!
//! Scoring weights:
//! - Name partial ratio: 60%
//! - Dosage match: 40%
//!
//! Form match is computed and attached to each candidate but never weighted.

use std::collections::HashMap;

use tracing::debug;

use super::fuzz::{partial_ratio, ratio};
use crate::models::{ExtractedFeatures, MedicationRecord, ScoredCandidate};

/// Minimum total score for a record to be reported.
pub const ACCEPTANCE_THRESHOLD: f64 = 55.0;

/// Dosage score when an extracted number appears verbatim in the dosage field.
const EXACT_DOSAGE_SCORE: u8 = 100;

/// Scores catalog records against one recognized-text string.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    threshold: f64,
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoringEngine {
    pub fn new() -> Self {
        Self {
            threshold: ACCEPTANCE_THRESHOLD,
        }
    }

    /// Score every record and keep those at or above the threshold.
    ///
    /// Candidates come back in catalog order; ordering by score is the
    /// ranker's job.
    pub fn score<'a>(
        &self,
        text: &str,
        features: &ExtractedFeatures,
        catalog: &'a [MedicationRecord],
    ) -> Vec<ScoredCandidate<'a>> {
        let text_lower = text.to_lowercase();
        // Records often share a dosage field; score each distinct field once.
        let mut dosage_scores: HashMap<String, u8> = HashMap::new();

        let candidates: Vec<ScoredCandidate<'a>> = catalog
            .iter()
            .filter_map(|record| {
                let candidate =
                    self.score_record(&text_lower, features, record, &mut dosage_scores)?;
                (candidate.total_score >= self.threshold).then_some(candidate)
            })
            .collect();

        debug!(
            records = catalog.len(),
            distinct_dosages = dosage_scores.len(),
            accepted = candidates.len(),
            "scored catalog"
        );

        candidates
    }

    /// Score a single record. Records without a name are skipped.
    fn score_record<'a>(
        &self,
        text_lower: &str,
        features: &ExtractedFeatures,
        record: &'a MedicationRecord,
        dosage_scores: &mut HashMap<String, u8>,
    ) -> Option<ScoredCandidate<'a>> {
        let name = record.name.trim().to_lowercase();
        if name.is_empty() {
            return None;
        }

        let name_score = partial_ratio(text_lower, &name);

        let dosage_field = record.dosage.to_lowercase();
        let dosage_score = match dosage_scores.get(&dosage_field) {
            Some(score) => *score,
            None => {
                let score = score_dosage(&features.dosages, &dosage_field);
                dosage_scores.insert(dosage_field, score);
                score
            }
        };

        let matched_form = features.matching_form(&record.form).map(str::to_string);

        Some(ScoredCandidate::new(
            record,
            matched_form,
            name_score,
            dosage_score,
        ))
    }
}

/// Score extracted dosage numbers against a record's dosage field.
///
/// 100 if any number is a substring of the field, otherwise the best fuzzy
/// ratio, and 0 when nothing was extracted.
pub fn score_dosage(dosages: &[String], dosage_field: &str) -> u8 {
    if dosages.iter().any(|d| dosage_field.contains(d.as_str())) {
        return EXACT_DOSAGE_SCORE;
    }
    dosages
        .iter()
        .map(|d| ratio(d, dosage_field))
        .max()
        .unwrap_or(0)
}
