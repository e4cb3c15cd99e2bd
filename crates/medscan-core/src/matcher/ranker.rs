//! Ordering of scored candidates.

use crate::models::ScoredCandidate;

/// Number of candidates shown in the summary view.
pub const DEFAULT_SUMMARY_SIZE: usize = 3;

/// Sort candidates by total score, best first.
///
/// The sort is stable: equal totals keep catalog order, so repeated passes
/// over an unchanged catalog give identical output.
pub fn rank(mut candidates: Vec<ScoredCandidate<'_>>) -> Vec<ScoredCandidate<'_>> {
    candidates.sort_by(|a, b| b.total_score.total_cmp(&a.total_score));
    candidates
}
