pub mod text_cleanup;

use std::fmt;

/// HSK difficulty tier. Tier 1 is the easiest.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct Tier(pub u8);

impl Tier {
    /// Parse a dictionary level tag such as `new-3` or `new-7+`.
    ///
    /// Tags from the old HSK scheme (`old-2`) are not tiers of the current
    /// curriculum and yield `None`.
    pub fn from_level_tag(tag: &str) -> Option<Tier> {
        let level = tag.strip_prefix("new-")?;
        let level = level.trim_end_matches('+');
        level.parse::<u8>().ok().filter(|l| *l > 0).map(Tier)
    }

    /// First parseable `new-N` tag in the list.
    pub fn from_level_tags<S: AsRef<str>>(tags: &[S]) -> Option<Tier> {
        tags.iter().find_map(|tag| Tier::from_level_tag(tag.as_ref()))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HSK {}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct HeadwordId(pub i64);

#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct SentenceId(pub i64);

#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct PatternId(pub i64);

/// One sense/pronunciation variant of a raw dictionary entry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CandidateForm {
    pub traditional: String,
    pub pinyin: String,
    pub pinyin_numeric: String,
    pub glosses: Vec<String>,
    pub classifiers: Vec<String>,
}

impl CandidateForm {
    pub fn first_gloss(&self) -> Option<&str> {
        self.glosses.first().map(String::as_str)
    }
}

/// A vocabulary item at a difficulty tier, as persisted in the `words` table.
#[derive(Clone, Debug, PartialEq)]
pub struct HeadwordEntry {
    pub simplified: String,
    pub traditional: String,
    pub pinyin: String,
    pub pinyin_numeric: String,
    /// Primary gloss, the first of `definitions`.
    pub definition: String,
    pub definitions: Vec<String>,
    pub tier: Tier,
    pub pos: Vec<String>,
    pub frequency: i64,
    pub classifiers: Vec<String>,
    pub audio_path: Option<String>,
}

impl HeadwordEntry {
    /// Build the entry for `simplified` from its chosen canonical form.
    pub fn from_canonical_form(
        simplified: &str,
        form: &CandidateForm,
        tier: Tier,
        pos: Vec<String>,
        frequency: i64,
    ) -> Self {
        let traditional = if form.traditional.is_empty() {
            simplified.to_string()
        } else {
            form.traditional.clone()
        };
        HeadwordEntry {
            simplified: simplified.to_string(),
            traditional,
            pinyin: form.pinyin.clone(),
            pinyin_numeric: form.pinyin_numeric.clone(),
            definition: form.first_gloss().unwrap_or_default().to_string(),
            definitions: form.glosses.clone(),
            tier,
            pos,
            frequency,
            classifiers: form.classifiers.clone(),
            audio_path: None,
        }
    }
}

/// A raw bilingual pair that survived deduplication.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SentencePair {
    pub chinese: String,
    pub english: String,
}

/// An accepted example sentence.
///
/// `difficulty` is deliberately an unbounded float: very short sentences
/// score above 1.0.
#[derive(Clone, Debug, PartialEq)]
pub struct SentenceRecord {
    pub chinese: String,
    pub english: String,
    pub pinyin: Option<String>,
    pub difficulty: f64,
    pub audio_path: Option<String>,
    /// The exact segmentation that was scored and linked.
    pub tokens: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WordSentenceLink {
    pub sentence_id: SentenceId,
    pub word_id: HeadwordId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SentencePatternLink {
    pub sentence_id: SentenceId,
    pub pattern_id: PatternId,
}
