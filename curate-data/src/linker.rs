use chinese_utils::{SentenceId, WordSentenceLink};

use crate::vocabulary::Vocabulary;

/// One link per token found in the vocabulary. A word repeated in the
/// sentence is linked once per occurrence.
pub fn link(
    sentence_id: SentenceId,
    tokens: &[String],
    vocabulary: &Vocabulary,
) -> Vec<WordSentenceLink> {
    tokens
        .iter()
        .filter_map(|token| vocabulary.id(token))
        .map(|word_id| WordSentenceLink {
            sentence_id,
            word_id,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chinese_utils::{HeadwordId, Tier};

    #[test]
    fn test_links_known_tokens_in_order_with_repeats() {
        let vocabulary: Vocabulary = [
            ("谢谢".to_string(), HeadwordId(7), Tier(1)),
            ("你".to_string(), HeadwordId(3), Tier(1)),
        ]
        .into_iter()
        .collect();
        let tokens: Vec<String> = ["谢谢", "你", "龘", "谢谢"]
            .iter()
            .map(|t| t.to_string())
            .collect();

        let links = link(SentenceId(5), &tokens, &vocabulary);
        let word_ids: Vec<HeadwordId> = links.iter().map(|l| l.word_id).collect();
        assert_eq!(word_ids, vec![HeadwordId(7), HeadwordId(3), HeadwordId(7)]);
        assert!(links.iter().all(|l| l.sentence_id == SentenceId(5)));
    }

    #[test]
    fn test_no_known_tokens_no_links() {
        let tokens = vec!["龘".to_string()];
        assert!(link(SentenceId(1), &tokens, &Vocabulary::default()).is_empty());
    }
}
