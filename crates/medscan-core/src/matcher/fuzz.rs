//! Fuzzy string ratios on a 0 - 100 scale.
//!
//! `ratio` is the indel-normalized similarity `2 * LCS / (|a| + |b|)`,
//! where LCS is the longest common subsequence. `partial_ratio` is the best
//! `ratio` of the shorter string against any equally long window of the
//! longer one, which tolerates extra words around the match.
//!
//! Scores are rounded half to even, so 62.5 becomes 62 and 37.5 becomes 38.
//! Both operate on Unicode scalar values and return 0 when either input is
//! empty.

use rapidfuzz::distance::indel;

/// Similarity of two strings (0 - 100).
pub fn ratio(a: &str, b: &str) -> u8 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    indel_ratio(&a, &b)
}

/// Best window similarity of the shorter string inside the longer (0 - 100).
pub fn partial_ratio(a: &str, b: &str) -> u8 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let (shorter, longer) = if a.len() <= b.len() { (&a, &b) } else { (&b, &a) };
    if shorter.len() == longer.len() {
        return indel_ratio(shorter, longer);
    }

    let mut best = 0;
    for window in longer.windows(shorter.len()) {
        let score = indel_ratio(shorter, window);
        if score == 100 {
            return 100;
        }
        best = best.max(score);
    }
    best
}

fn indel_ratio(a: &[char], b: &[char]) -> u8 {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let total = a.len() + b.len();
    // Indel distance is total - 2 * LCS
    let matched = total - indel::distance(a.iter().copied(), b.iter().copied());
    let similarity = matched as f64 / total as f64;
    (100.0 * similarity).round_ties_even() as u8
}
