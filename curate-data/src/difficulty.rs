//! Sentence difficulty: a weighted blend of length, vocabulary tier and the
//! share of unknown words.
//!
//! The result is nominally in 0.0..=1.0 but is not clamped. Sentences of one
//! token have a length score of 1.1, and the length score jumps from 0.3 to
//! 0.55 between 10 and 11 tokens.

use crate::vocabulary::Vocabulary;

pub const LENGTH_WEIGHT: f64 = 0.4;
pub const LEVEL_WEIGHT: f64 = 0.4;
pub const UNKNOWN_WEIGHT: f64 = 0.2;

/// Number of tiers the level score is normalized against.
pub const TIER_SCALE: f64 = 3.0;

const IDEAL_MIN_TOKENS: usize = 4;
const IDEAL_MAX_TOKENS: usize = 10;

/// Short fragments are penalized, 4..=10 tokens is the sweet spot, longer
/// sentences grow toward 1.0.
pub fn length_score(token_count: usize) -> f64 {
    if token_count < IDEAL_MIN_TOKENS {
        0.8 + (IDEAL_MIN_TOKENS - token_count) as f64 * 0.1
    } else if token_count <= IDEAL_MAX_TOKENS {
        (token_count - IDEAL_MIN_TOKENS) as f64 / 20.0
    } else {
        (token_count as f64 / 20.0).min(1.0)
    }
}

/// Mean tier of the known tokens, mapped so tier 1 is 0.0 and the top tier
/// is 1.0. No known tokens counts as hardest.
pub fn level_score(tokens: &[String], vocabulary: &Vocabulary) -> f64 {
    let tiers: Vec<f64> = tokens
        .iter()
        .filter_map(|token| vocabulary.tier(token))
        .map(|tier| f64::from(tier.get()))
        .collect();
    if tiers.is_empty() {
        return 1.0;
    }
    let average = tiers.iter().sum::<f64>() / tiers.len() as f64;
    (average - 1.0) / (TIER_SCALE - 1.0)
}

pub fn score(tokens: &[String], vocabulary: &Vocabulary, coverage: f64) -> f64 {
    LENGTH_WEIGHT * length_score(tokens.len())
        + LEVEL_WEIGHT * level_score(tokens, vocabulary)
        + UNKNOWN_WEIGHT * (1.0 - coverage)
}
