//! Fixed catalog of grammar constructions and the rule matcher.
//!
//! Each rule is a regular expression over the raw sentence text; a sentence
//! exhibits a construction when the rule matches anywhere in it.

use regex::Regex;

use crate::error::InputError;

/// Declarative description of one construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GrammarPattern {
    pub name: &'static str,
    pub structure: &'static str,
    pub rule: &'static str,
    pub description: &'static str,
}

const fn pattern(
    name: &'static str,
    structure: &'static str,
    rule: &'static str,
    description: &'static str,
) -> GrammarPattern {
    GrammarPattern {
        name,
        structure,
        rule,
        description,
    }
}

/// The catalog, in evaluation order.
pub const PATTERNS: &[GrammarPattern] = &[
    // basic sentence structure
    pattern("是 equivalence", "A 是 B", r"是", "Expresses equivalence or identity"),
    pattern("有 possession", "A 有 B", r"有", "Expresses possession or existence"),
    pattern("在 location", "A 在 B", r"在", "Expresses location"),
    pattern("很 + adjective", "A 很 adj", r"很[^\s，。！？]+", "Adjective predicate with 很"),
    // negation
    pattern("不 negation", "不 + verb/adj", r"不[^\s，。！？]+", "General negation"),
    pattern("没有 negation", "没有", r"没有", "Negation of 有 or past actions"),
    pattern("没 past negation", "没 + verb", r"没[^\s有，。！？]+", "Negation of past actions"),
    // questions
    pattern("吗 yes/no", "statement + 吗", r"吗[？?]?$", "Yes/no question particle"),
    pattern("什么 what", "什么", r"什么", "What question word"),
    pattern("谁 who", "谁", r"谁", "Who question word"),
    pattern("哪里 where", "哪里/哪儿", r"哪[里儿]", "Where question word"),
    pattern("为什么 why", "为什么", r"为什么", "Why question word"),
    pattern("怎么 how", "怎么", r"怎么", "How question word"),
    // tense and aspect
    pattern("了 completed", "verb + 了", r"[^\s，。！？]+了", "Completed action marker"),
    pattern("过 experience", "verb + 过", r"[^\s，。！？]+过", "Experience marker"),
    pattern("在 ongoing", "在 + verb", r"在[^\s，。！？]+", "Ongoing action marker"),
    pattern("正在 right now", "正在 + verb", r"正在", "Currently in progress"),
    // desire, ability, obligation
    pattern("想 want to", "想 + verb", r"想[^\s，。！？]+", "Want to do something"),
    pattern("要 want/need", "要 + verb/noun", r"要[^\s，。！？]+", "Want or need"),
    pattern("能 can", "能 + verb", r"能[^\s，。！？]+", "Can (circumstance)"),
    pattern("可以 may", "可以 + verb", r"可以", "Can (permission)"),
    pattern("会 can/will", "会 + verb", r"会[^\s，。！？]+", "Can (skill) or will (future)"),
    // modifiers
    pattern(
        "的 possession",
        "N + 的 + N",
        r"[^\s，。！？]+的[^\s，。！？]+",
        "Possessive or attributive marker",
    ),
    pattern("也 also", "也 + verb", r"也[^\s，。！？]+", "Also/too"),
    pattern("都 all", "都 + verb", r"都[^\s，。！？]+", "All/both"),
    // comparison
    pattern("比 comparison", "A 比 B + adj", r"比[^\s，。！？]+", "Comparison marker"),
];

/// Patterns with their rules compiled, in catalog order. A pattern's
/// position in the catalog is its index in every tagging result.
pub struct PatternCatalog {
    entries: Vec<(GrammarPattern, Regex)>,
}

impl PatternCatalog {
    pub fn load() -> Result<Self, InputError> {
        Self::from_patterns(PATTERNS)
    }

    pub fn from_patterns(patterns: &[GrammarPattern]) -> Result<Self, InputError> {
        let entries = patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern.rule)
                    .map(|regex| (*pattern, regex))
                    .map_err(|source| InputError::PatternRule {
                        name: pattern.name,
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PatternCatalog { entries })
    }

    pub fn patterns(&self) -> impl Iterator<Item = &GrammarPattern> {
        self.entries.iter().map(|(pattern, _)| pattern)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Indices of every pattern whose rule occurs somewhere in `text`.
    pub fn tag(&self, text: &str) -> Vec<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, (_, regex))| regex.is_match(text))
            .map(|(index, _)| index)
            .collect()
    }
}

/// Result of tagging a sentence set against the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct Tagging<K> {
    /// (sentence key, pattern index) for every match, in processing order.
    pub links: Vec<(K, usize)>,
    /// Per pattern, the text of the first sentence that matched it.
    pub examples: Vec<Option<String>>,
    /// Per pattern, how many sentences matched it.
    pub counts: Vec<usize>,
}

/// Tag every sentence in order. The first matching sentence becomes the
/// pattern's cached example.
pub fn tag_all<K, I, S>(catalog: &PatternCatalog, sentences: I) -> Tagging<K>
where
    K: Copy,
    I: IntoIterator<Item = (K, S)>,
    S: AsRef<str>,
{
    let mut tagging = Tagging {
        links: Vec::new(),
        examples: vec![None; catalog.len()],
        counts: vec![0; catalog.len()],
    };

    for (key, text) in sentences {
        let text = text.as_ref();
        for index in catalog.tag(text) {
            tagging.links.push((key, index));
            tagging.counts[index] += 1;
            if tagging.examples[index].is_none() {
                tagging.examples[index] = Some(text.to_string());
            }
        }
    }

    tagging
}
