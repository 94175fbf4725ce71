use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use chinese_utils::SentencePair;
use chinese_utils::text_cleanup::strip_bom;
use indexmap::IndexMap;

use crate::error::InputError;

/// Deduplicated candidate pairs, in first-seen order, plus what was dropped.
#[derive(Debug, Default)]
pub struct Corpus {
    pub pairs: Vec<SentencePair>,
    /// Records with fewer than four tab-separated fields.
    pub malformed: usize,
    /// Records whose Chinese text was already seen.
    pub duplicates: usize,
}

/// Read the Tatoeba pair export at `path`.
///
/// Each line is `chinese id \t chinese \t english id \t english`.
pub fn read_tatoeba_pairs(path: &Path) -> Result<Corpus, InputError> {
    let file = File::open(path).map_err(|e| InputError::io(path, e))?;
    let lines = BufReader::new(file)
        .lines()
        .collect::<Result<Vec<String>, _>>()
        .map_err(|e| InputError::io(path, e))?;
    Ok(ingest(lines.iter().map(String::as_str)))
}

/// Drop malformed records and exact duplicates of the Chinese text, keeping
/// the first occurrence's translation.
pub fn ingest<'a>(lines: impl IntoIterator<Item = &'a str>) -> Corpus {
    let mut seen: IndexMap<String, String> = IndexMap::new();
    let mut malformed = 0;
    let mut duplicates = 0;

    for line in lines {
        let line = strip_bom(line).trim();

        // Parse: chinese id [tab] chinese [tab] english id [tab] english
        let parts: Vec<&str> = line.split('\t').collect();
        if parts.len() < 4 {
            malformed += 1;
            continue;
        }
        let (chinese, english) = (parts[1], parts[3]);

        if seen.contains_key(chinese) {
            duplicates += 1;
            continue;
        }
        seen.insert(chinese.to_string(), english.to_string());
    }

    Corpus {
        pairs: seen
            .into_iter()
            .map(|(chinese, english)| SentencePair { chinese, english })
            .collect(),
        malformed,
        duplicates,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_duplicate_keeps_first_translation() {
        let corpus = ingest([
            "1\t我很好。\t2\tI'm fine.",
            "3\t我很好。\t4\tI am well.",
        ]);
        assert_eq!(corpus.pairs.len(), 1);
        assert_eq!(corpus.pairs[0].english, "I'm fine.");
        assert_eq!(corpus.duplicates, 1);
    }

    #[test]
    fn test_preserves_first_seen_order() {
        let corpus = ingest([
            "1\t乙\t2\tb",
            "3\t甲\t4\ta",
            "5\t乙\t6\tb again",
            "7\t丙\t8\tc",
        ]);
        let chinese: Vec<&str> = corpus.pairs.iter().map(|p| p.chinese.as_str()).collect();
        assert_eq!(chinese, vec!["乙", "甲", "丙"]);
    }

    #[test]
    fn test_short_records_are_dropped() {
        let corpus = ingest(["1\t你好\t2", "", "garbage", "1\t你好\t2\tHello"]);
        assert_eq!(corpus.malformed, 3);
        assert_eq!(corpus.pairs.len(), 1);
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let corpus = ingest(["1\t你好\t2\tHello\textra"]);
        assert_eq!(corpus.pairs[0].english, "Hello");
    }

    #[test]
    fn test_bom_and_trailing_whitespace() {
        let corpus = ingest(["\u{feff}1\t谢谢\t2\tThanks.\r"]);
        assert_eq!(corpus.pairs[0].chinese, "谢谢");
        assert_eq!(corpus.pairs[0].english, "Thanks.");
    }

    #[test]
    fn test_read_tatoeba_pairs_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "1\t他是学生。\t2\tHe is a student.").unwrap();
        writeln!(file, "3\t他是学生。\t4\tHe's a student.").unwrap();
        let corpus = read_tatoeba_pairs(file.path()).unwrap();
        assert_eq!(corpus.pairs.len(), 1);
        assert_eq!(corpus.duplicates, 1);
    }

    #[test]
    fn test_missing_corpus_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            read_tatoeba_pairs(&dir.path().join("missing.tsv")),
            Err(InputError::Missing(_))
        ));
    }
}
