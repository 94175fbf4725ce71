use chinese_utils::{HeadwordId, Tier};
use rustc_hash::FxHashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KnownWord {
    pub id: HeadwordId,
    pub tier: Tier,
}

/// Read-only snapshot of the headword table, keyed by simplified form.
///
/// Built once at the start of a run and handed to every stage that needs
/// coverage, tier or id lookups.
#[derive(Clone, Debug, Default)]
pub struct Vocabulary {
    words: FxHashMap<String, KnownWord>,
}

impl Vocabulary {
    pub fn get(&self, word: &str) -> Option<KnownWord> {
        self.words.get(word).copied()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains_key(word)
    }

    pub fn tier(&self, word: &str) -> Option<Tier> {
        self.get(word).map(|known| known.tier)
    }

    pub fn id(&self, word: &str) -> Option<HeadwordId> {
        self.get(word).map(|known| known.id)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl FromIterator<(String, HeadwordId, Tier)> for Vocabulary {
    fn from_iter<I: IntoIterator<Item = (String, HeadwordId, Tier)>>(iter: I) -> Self {
        Vocabulary {
            words: iter
                .into_iter()
                .map(|(word, id, tier)| (word, KnownWord { id, tier }))
                .collect(),
        }
    }
}
