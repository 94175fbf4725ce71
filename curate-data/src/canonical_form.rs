//! Picks one sense/pronunciation per headword.
//!
//! Dictionary entries routinely list a surname or archaic reading ahead of
//! the everyday one. Resolution order, first match wins:
//!
//! 1. an override whose pinyin matches a candidate exactly;
//! 2. the first suitable candidate with lowercase pinyin;
//! 3. the first suitable candidate;
//! 4. the first candidate.

use chinese_utils::CandidateForm;
use chinese_utils::text_cleanup::starts_lowercase;

use crate::dictionary::Overrides;

/// Substrings of a lowercased first gloss that mark a sense as a poor
/// teaching choice.
const UNSUITABLE_MARKERS: &[&str] = &[
    "surname",
    "archaic",
    "variant of",
    "euphemism",
    "euphemistic",
];

/// Whether the candidate's first gloss is a surname, archaic, cross-reference
/// or euphemistic sense. A candidate without glosses is suitable.
pub fn is_suitable(form: &CandidateForm) -> bool {
    match form.first_gloss() {
        Some(gloss) => {
            let gloss = gloss.to_lowercase();
            !UNSUITABLE_MARKERS
                .iter()
                .any(|marker| gloss.contains(marker))
        }
        None => true,
    }
}

/// Select the canonical form of `headword` among `candidates`.
///
/// Returns `None` only when `candidates` is empty; callers skip such entries.
pub fn select<'a>(
    headword: &str,
    candidates: &'a [CandidateForm],
    overrides: &Overrides,
) -> Option<&'a CandidateForm> {
    if let Some(target) = overrides.get(headword) {
        if let Some(form) = candidates.iter().find(|form| &form.pinyin == target) {
            return Some(form);
        }
        log::debug!("override `{target}` for {headword} matches no candidate, falling through");
    }

    candidates
        .iter()
        .filter(|form| is_suitable(form))
        .find(|form| starts_lowercase(&form.pinyin))
        .or_else(|| candidates.iter().find(|form| is_suitable(form)))
        .or_else(|| candidates.first())
}
