use rustc_hash::FxHashSet;

use crate::segmenter::Segmenter;

/// Greedy forward longest-match segmenter over a fixed word list. Characters
/// not starting any listed word become single-character tokens.
pub struct LongestMatch {
    words: FxHashSet<String>,
    longest: usize,
}

impl LongestMatch {
    pub fn new(words: &[&str]) -> Self {
        LongestMatch {
            words: words.iter().map(|w| w.to_string()).collect(),
            longest: words.iter().map(|w| w.chars().count()).max().unwrap_or(1),
        }
    }
}

impl Segmenter for LongestMatch {
    fn segment(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        let mut tokens = Vec::new();
        let mut i = 0;
        while i < chars.len() {
            let max_len = self.longest.min(chars.len() - i);
            let len = (1..=max_len)
                .rev()
                .find(|len| {
                    let candidate: String = chars[i..i + len].iter().collect();
                    self.words.contains(&candidate)
                })
                .unwrap_or(1);
            tokens.push(chars[i..i + len].iter().collect());
            i += len;
        }
        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_longest_match_prefers_longer_words() {
        let segmenter = LongestMatch::new(&["学", "学生", "他", "是"]);
        assert_eq!(segmenter.segment("他是学生"), vec!["他", "是", "学生"]);
        assert_eq!(segmenter.segment("他们"), vec!["他", "们"]);
    }
}
