//! Keyword importance tiers from raw ranker scores.

use std::cmp::Ordering;

use biocn_core::config::DEFAULT_TOP_K;
use biocn_core::{KeywordEntry, Tier};

/// Normalised score at or above which a keyword is `High`.
pub const HIGH_THRESHOLD: f64 = 0.8;
/// Normalised score at or above which a keyword is `Medium`.
pub const MEDIUM_THRESHOLD: f64 = 0.5;

/// Classify the top keywords (default keep count).
pub fn classify(entries: &[(String, f64)]) -> Vec<KeywordEntry> {
    classify_top(entries, DEFAULT_TOP_K)
}

/// Sort by score descending (ties keep input order), keep `top_k`, and tier
/// each kept entry by its score normalised against the full set's min/max.
///
/// When every score is equal the range is degenerate and all entries are `High`.
pub fn classify_top(entries: &[(String, f64)], top_k: usize) -> Vec<KeywordEntry> {
    if entries.is_empty() {
        return Vec::new();
    }

    let mut sorted: Vec<&(String, f64)> = entries.iter().collect();
    sorted.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    let max = entries.iter().map(|e| e.1).fold(f64::NEG_INFINITY, f64::max);
    let min = entries.iter().map(|e| e.1).fold(f64::INFINITY, f64::min);
    let degenerate = max <= min;
    let range = if degenerate { 1.0 } else { max - min };

    sorted
        .into_iter()
        .take(top_k)
        .map(|(phrase, score)| {
            let normalized = if degenerate { 1.0 } else { (score - min) / range };
            KeywordEntry {
                phrase: phrase.clone(),
                score: *score,
                tier: tier_for(normalized),
            }
        })
        .collect()
}

pub fn tier_for(normalized: f64) -> Tier {
    if normalized >= HIGH_THRESHOLD {
        Tier::High
    } else if normalized >= MEDIUM_THRESHOLD {
        Tier::Medium
    } else {
        Tier::Low
    }
}
