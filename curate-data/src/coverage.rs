use chinese_utils::text_cleanup::han_only;

use crate::segmenter::Segmenter;
use crate::vocabulary::Vocabulary;

/// Minimum share of known tokens for a sentence to be kept.
pub const MIN_COVERAGE: f64 = 0.80;

/// Outcome of screening one sentence.
#[derive(Clone, Debug, PartialEq)]
pub struct Screening {
    pub accepted: bool,
    /// The segmentation that was scored; persist it verbatim.
    pub tokens: Vec<String>,
    pub coverage: f64,
}

impl Screening {
    fn rejected_without_script() -> Self {
        Screening {
            accepted: false,
            tokens: Vec::new(),
            coverage: 0.0,
        }
    }

    /// True when the sentence had no Han characters to segment.
    pub fn had_no_script(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Share of `tokens` present in `vocabulary`; 0.0 for no tokens.
pub fn coverage(tokens: &[String], vocabulary: &Vocabulary) -> f64 {
    if tokens.is_empty() {
        return 0.0;
    }
    let known = tokens.iter().filter(|t| vocabulary.contains(t)).count();
    known as f64 / tokens.len() as f64
}

/// Strip non-Han characters, segment what is left, and accept the sentence
/// when coverage reaches [`MIN_COVERAGE`].
pub fn accept(text: &str, vocabulary: &Vocabulary, segmenter: &dyn Segmenter) -> Screening {
    let cleaned = han_only(text);
    if cleaned.is_empty() {
        return Screening::rejected_without_script();
    }

    let tokens = segmenter.segment(&cleaned);
    let coverage = coverage(&tokens, vocabulary);
    Screening {
        accepted: coverage >= MIN_COVERAGE,
        tokens,
        coverage,
    }
}
