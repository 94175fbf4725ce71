//! SQLite persistence for headwords, sentences, patterns and their links.
//!
//! The `recreate_*` helpers drop whole tables; [`fill`] only ever writes a
//! column that is still NULL.

use std::path::Path;

use chinese_utils::{
    HeadwordEntry, HeadwordId, PatternId, SentenceId, SentencePatternLink, SentenceRecord, Tier,
    WordSentenceLink,
};
use rusqlite::{Connection, params};

use crate::error::StoreError;
use crate::patterns::GrammarPattern;
use crate::vocabulary::Vocabulary;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Table {
    Words,
    Sentences,
    SentenceWords,
    Patterns,
    SentencePatterns,
}

impl Table {
    pub fn name(self) -> &'static str {
        match self {
            Table::Words => "words",
            Table::Sentences => "sentences",
            Table::SentenceWords => "sentence_words",
            Table::Patterns => "patterns",
            Table::SentencePatterns => "sentence_patterns",
        }
    }
}

pub fn open(path: &Path) -> Result<Connection> {
    Ok(Connection::open(path)?)
}

const CREATE_SENTENCE_WORDS: &str = "
    CREATE TABLE sentence_words (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        sentence_id INTEGER NOT NULL,
        word_id INTEGER NOT NULL,
        FOREIGN KEY (sentence_id) REFERENCES sentences(id),
        FOREIGN KEY (word_id) REFERENCES words(id)
    );
    CREATE INDEX IF NOT EXISTS idx_sentence_words_sentence ON sentence_words(sentence_id);
    CREATE INDEX IF NOT EXISTS idx_sentence_words_word ON sentence_words(word_id);";

const CREATE_SENTENCE_PATTERNS: &str = "
    CREATE TABLE sentence_patterns (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        sentence_id INTEGER NOT NULL,
        pattern_id INTEGER NOT NULL,
        FOREIGN KEY (sentence_id) REFERENCES sentences(id),
        FOREIGN KEY (pattern_id) REFERENCES patterns(id)
    );
    CREATE INDEX IF NOT EXISTS idx_sentence_patterns_sentence ON sentence_patterns(sentence_id);
    CREATE INDEX IF NOT EXISTS idx_sentence_patterns_pattern ON sentence_patterns(pattern_id);";

/// Word ids are reassigned on rebuild, so word links are emptied too.
/// Referencing tables are dropped before the tables they reference, which
/// keeps the drops valid with foreign keys enforced.
pub fn recreate_words_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "DROP TABLE IF EXISTS sentence_words;
         DROP TABLE IF EXISTS words;
         CREATE TABLE words (
             id INTEGER PRIMARY KEY AUTOINCREMENT,
             hanzi TEXT NOT NULL,
             traditional TEXT,
             pinyin TEXT NOT NULL,
             pinyin_numeric TEXT,
             definition TEXT NOT NULL,
             definitions TEXT,
             hsk_level INTEGER NOT NULL,
             pos TEXT,
             frequency INTEGER,
             classifiers TEXT,
             audio_path TEXT
         );
         CREATE INDEX IF NOT EXISTS idx_words_hanzi ON words(hanzi);
         CREATE INDEX IF NOT EXISTS idx_words_hsk_level ON words(hsk_level);",
    )?;
    conn.execute_batch(CREATE_SENTENCE_WORDS)?;
    Ok(())
}

/// Sentence ids are reassigned on rebuild, so word and pattern links are
/// emptied too.
pub fn recreate_sentence_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "DROP TABLE IF EXISTS sentence_patterns;
         DROP TABLE IF EXISTS sentence_words;
         DROP TABLE IF EXISTS sentences;
         CREATE TABLE sentences (
             id INTEGER PRIMARY KEY AUTOINCREMENT,
             chinese TEXT NOT NULL,
             english TEXT NOT NULL,
             pinyin TEXT,
             difficulty_score REAL,
             audio_path TEXT,
             tokens TEXT
         );
         CREATE INDEX IF NOT EXISTS idx_sentences_chinese ON sentences(chinese);",
    )?;
    conn.execute_batch(CREATE_SENTENCE_WORDS)?;
    conn.execute_batch(CREATE_SENTENCE_PATTERNS)?;
    Ok(())
}

pub fn recreate_pattern_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "DROP TABLE IF EXISTS sentence_patterns;
         DROP TABLE IF EXISTS patterns;
         CREATE TABLE patterns (
             id INTEGER PRIMARY KEY AUTOINCREMENT,
             name TEXT NOT NULL,
             structure TEXT NOT NULL,
             rule TEXT NOT NULL,
             example TEXT,
             description TEXT
         );",
    )?;
    conn.execute_batch(CREATE_SENTENCE_PATTERNS)?;
    Ok(())
}

pub fn insert_headword(conn: &Connection, entry: &HeadwordEntry) -> Result<HeadwordId> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO words (hanzi, traditional, pinyin, pinyin_numeric, definition, definitions,
                            hsk_level, pos, frequency, classifiers, audio_path)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
    )?;
    stmt.execute(params![
        entry.simplified,
        entry.traditional,
        entry.pinyin,
        entry.pinyin_numeric,
        entry.definition,
        serde_json::to_string(&entry.definitions)?,
        entry.tier.get(),
        entry.pos.join(","),
        entry.frequency,
        serde_json::to_string(&entry.classifiers)?,
        entry.audio_path,
    ])?;
    Ok(HeadwordId(conn.last_insert_rowid()))
}

pub fn load_vocabulary(conn: &Connection) -> Result<Vocabulary> {
    let mut stmt = conn.prepare("SELECT hanzi, id, hsk_level FROM words")?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            HeadwordId(row.get(1)?),
            Tier(row.get(2)?),
        ))
    })?;
    Ok(rows.collect::<rusqlite::Result<Vocabulary>>()?)
}

pub fn load_headwords(conn: &Connection) -> Result<Vec<HeadwordEntry>> {
    let mut stmt = conn.prepare(
        "SELECT hanzi, traditional, pinyin, pinyin_numeric, definition, definitions,
                hsk_level, pos, frequency, classifiers, audio_path
         FROM words ORDER BY id",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, Option<String>>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, Option<String>>(5)?,
                row.get::<_, u8>(6)?,
                row.get::<_, Option<String>>(7)?,
                row.get::<_, Option<i64>>(8)?,
                row.get::<_, Option<String>>(9)?,
                row.get::<_, Option<String>>(10)?,
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    rows.into_iter()
        .map(
            |(
                simplified,
                traditional,
                pinyin,
                pinyin_numeric,
                definition,
                definitions,
                tier,
                pos,
                frequency,
                classifiers,
                audio_path,
            )|
             -> Result<HeadwordEntry> {
                Ok(HeadwordEntry {
                    traditional: traditional.unwrap_or_else(|| simplified.clone()),
                    simplified,
                    pinyin,
                    pinyin_numeric: pinyin_numeric.unwrap_or_default(),
                    definition,
                    definitions: decode_list(definitions)?,
                    tier: Tier(tier),
                    pos: pos
                        .filter(|p| !p.is_empty())
                        .map(|p| p.split(',').map(str::to_string).collect())
                        .unwrap_or_default(),
                    frequency: frequency.unwrap_or_default(),
                    classifiers: decode_list(classifiers)?,
                    audio_path,
                })
            },
        )
        .collect()
}

pub fn insert_sentence(conn: &Connection, sentence: &SentenceRecord) -> Result<SentenceId> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO sentences (chinese, english, pinyin, difficulty_score, audio_path, tokens)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;
    stmt.execute(params![
        sentence.chinese,
        sentence.english,
        sentence.pinyin,
        sentence.difficulty,
        sentence.audio_path,
        serde_json::to_string(&sentence.tokens)?,
    ])?;
    Ok(SentenceId(conn.last_insert_rowid()))
}

pub fn insert_word_links(conn: &Connection, links: &[WordSentenceLink]) -> Result<()> {
    let mut stmt =
        conn.prepare_cached("INSERT INTO sentence_words (sentence_id, word_id) VALUES (?1, ?2)")?;
    for link in links {
        stmt.execute(params![link.sentence_id.0, link.word_id.0])?;
    }
    Ok(())
}

pub fn load_sentences(conn: &Connection) -> Result<Vec<SentenceRecord>> {
    let mut stmt = conn.prepare(
        "SELECT chinese, english, pinyin, difficulty_score, audio_path, tokens
         FROM sentences ORDER BY id",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, Option<f64>>(3)?,
                row.get::<_, Option<String>>(4)?,
                row.get::<_, Option<String>>(5)?,
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    rows.into_iter()
        .map(
            |(chinese, english, pinyin, difficulty, audio_path, tokens)| -> Result<SentenceRecord> {
                Ok(SentenceRecord {
                    chinese,
                    english,
                    pinyin,
                    difficulty: difficulty.unwrap_or_default(),
                    audio_path,
                    tokens: decode_list(tokens)?,
                })
            },
        )
        .collect()
}

/// (id, chinese) for every sentence, in insertion order.
pub fn sentence_texts(conn: &Connection) -> Result<Vec<(SentenceId, String)>> {
    let mut stmt = conn.prepare("SELECT id, chinese FROM sentences ORDER BY id")?;
    let rows = stmt.query_map([], |row| Ok((SentenceId(row.get(0)?), row.get(1)?)))?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn insert_pattern(conn: &Connection, pattern: &GrammarPattern) -> Result<PatternId> {
    conn.execute(
        "INSERT INTO patterns (name, structure, rule, description) VALUES (?1, ?2, ?3, ?4)",
        params![
            pattern.name,
            pattern.structure,
            pattern.rule,
            pattern.description
        ],
    )?;
    Ok(PatternId(conn.last_insert_rowid()))
}

pub fn set_pattern_example(conn: &Connection, id: PatternId, example: &str) -> Result<()> {
    conn.execute(
        "UPDATE patterns SET example = ?1 WHERE id = ?2",
        params![example, id.0],
    )?;
    Ok(())
}

pub fn insert_pattern_links(conn: &Connection, links: &[SentencePatternLink]) -> Result<()> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO sentence_patterns (sentence_id, pattern_id) VALUES (?1, ?2)",
    )?;
    for link in links {
        stmt.execute(params![link.sentence_id.0, link.pattern_id.0])?;
    }
    Ok(())
}

/// (name, example, match count) per pattern, most used first.
pub fn pattern_usage(conn: &Connection) -> Result<Vec<(String, Option<String>, usize)>> {
    let mut stmt = conn.prepare(
        "SELECT p.name, p.example, COUNT(sp.id) AS cnt
         FROM patterns p
         LEFT JOIN sentence_patterns sp ON p.id = sp.pattern_id
         GROUP BY p.id
         ORDER BY cnt DESC, p.id",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get(0)?, row.get(1)?, row.get::<_, i64>(2)? as usize))
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn count_rows(conn: &Connection, table: Table) -> Result<usize> {
    let count: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM {}", table.name()),
        [],
        |row| row.get(0),
    )?;
    Ok(count as usize)
}

/// Rows whose `column` is populated. Only `pinyin` and `audio_path` are
/// back-filled.
pub fn count_filled(conn: &Connection, table: Table, column: FillColumn) -> Result<usize> {
    let count: i64 = conn.query_row(
        &format!(
            "SELECT COUNT(*) FROM {} WHERE {} IS NOT NULL",
            table.name(),
            column.name()
        ),
        [],
        |row| row.get(0),
    )?;
    Ok(count as usize)
}

pub fn tier_breakdown(conn: &Connection) -> Result<Vec<(Tier, usize)>> {
    let mut stmt =
        conn.prepare("SELECT hsk_level, COUNT(*) FROM words GROUP BY hsk_level ORDER BY hsk_level")?;
    let rows = stmt.query_map([], |row| {
        Ok((Tier(row.get(0)?), row.get::<_, i64>(1)? as usize))
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FillColumn {
    Pinyin,
    AudioPath,
}

impl FillColumn {
    pub fn name(self) -> &'static str {
        match self {
            FillColumn::Pinyin => "pinyin",
            FillColumn::AudioPath => "audio_path",
        }
    }
}

/// (id, text) of rows in `table` whose `column` is still NULL, in id order.
///
/// `table` must be `Words` or `Sentences`.
pub fn missing(
    conn: &Connection,
    table: Table,
    column: FillColumn,
    limit: Option<usize>,
) -> Result<Vec<(i64, String)>> {
    let text_column = match table {
        Table::Words => "hanzi",
        _ => "chinese",
    };
    let limit = limit.map(|l| l as i64).unwrap_or(-1);
    let mut stmt = conn.prepare(&format!(
        "SELECT id, {text_column} FROM {} WHERE {} IS NULL ORDER BY id LIMIT ?1",
        table.name(),
        column.name()
    ))?;
    let rows = stmt.query_map([limit], |row| Ok((row.get(0)?, row.get(1)?)))?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Fill `column` of row `id`. A value that is already set is left alone.
pub fn fill(conn: &Connection, table: Table, column: FillColumn, id: i64, value: &str) -> Result<bool> {
    let updated = conn.execute(
        &format!(
            "UPDATE {} SET {col} = ?1 WHERE id = ?2 AND {col} IS NULL",
            table.name(),
            col = column.name()
        ),
        params![value, id],
    )?;
    Ok(updated > 0)
}

fn decode_list(column: Option<String>) -> Result<Vec<String>> {
    match column {
        Some(json) => Ok(serde_json::from_str(&json)?),
        None => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headword(simplified: &str, tier: u8) -> HeadwordEntry {
        HeadwordEntry {
            simplified: simplified.to_string(),
            traditional: simplified.to_string(),
            pinyin: "x".to_string(),
            pinyin_numeric: "x1".to_string(),
            definition: "gloss".to_string(),
            definitions: vec!["gloss".to_string(), "other".to_string()],
            tier: Tier(tier),
            pos: vec!["n".to_string(), "v".to_string()],
            frequency: 12,
            classifiers: vec!["个".to_string()],
            audio_path: None,
        }
    }

    fn sentence(chinese: &str) -> SentenceRecord {
        SentenceRecord {
            chinese: chinese.to_string(),
            english: "english".to_string(),
            pinyin: None,
            difficulty: 0.25,
            audio_path: None,
            tokens: vec!["他".to_string(), "是".to_string()],
        }
    }

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        recreate_words_table(&conn).unwrap();
        recreate_sentence_tables(&conn).unwrap();
        recreate_pattern_tables(&conn).unwrap();
        conn
    }

    #[test]
    fn test_headword_round_trip_and_vocabulary() {
        let conn = conn();
        let entry = headword("学生", 2);
        let id = insert_headword(&conn, &entry).unwrap();

        assert_eq!(load_headwords(&conn).unwrap(), vec![entry]);
        let vocabulary = load_vocabulary(&conn).unwrap();
        assert_eq!(vocabulary.id("学生"), Some(id));
        assert_eq!(vocabulary.tier("学生"), Some(Tier(2)));
        assert_eq!(vocabulary.id("老师"), None);
    }

    #[test]
    fn test_sentence_tokens_persisted_verbatim() {
        let conn = conn();
        let record = sentence("他是。");
        let id = insert_sentence(&conn, &record).unwrap();
        assert_eq!(load_sentences(&conn).unwrap(), vec![record]);
        assert_eq!(
            sentence_texts(&conn).unwrap(),
            vec![(id, "他是。".to_string())]
        );
    }

    #[test]
    fn test_recreate_drops_rows() {
        let conn = conn();
        insert_headword(&conn, &headword("一", 1)).unwrap();
        assert_eq!(count_rows(&conn, Table::Words).unwrap(), 1);
        recreate_words_table(&conn).unwrap();
        assert_eq!(count_rows(&conn, Table::Words).unwrap(), 0);
    }

    #[test]
    fn test_fill_only_touches_null_columns() {
        let conn = conn();
        let id = insert_sentence(&conn, &sentence("你好")).unwrap();
        insert_sentence(&conn, &sentence("谢谢")).unwrap();

        let pending = missing(&conn, Table::Sentences, FillColumn::Pinyin, None).unwrap();
        assert_eq!(pending.len(), 2);
        let limited = missing(&conn, Table::Sentences, FillColumn::Pinyin, Some(1)).unwrap();
        assert_eq!(limited, vec![(id.0, "你好".to_string())]);

        assert!(fill(&conn, Table::Sentences, FillColumn::Pinyin, id.0, "nǐ hǎo").unwrap());
        assert!(!fill(&conn, Table::Sentences, FillColumn::Pinyin, id.0, "other").unwrap());
        assert_eq!(
            load_sentences(&conn).unwrap()[0].pinyin.as_deref(),
            Some("nǐ hǎo")
        );
        assert_eq!(
            count_filled(&conn, Table::Sentences, FillColumn::Pinyin).unwrap(),
            1
        );
    }

    #[test]
    fn test_words_recreated_over_existing_links() {
        let conn = conn();
        let word = insert_headword(&conn, &headword("学生", 1)).unwrap();
        let sentence = insert_sentence(&conn, &sentence("他是学生")).unwrap();
        insert_word_links(
            &conn,
            &[WordSentenceLink {
                sentence_id: sentence,
                word_id: word,
            }],
        )
        .unwrap();

        recreate_words_table(&conn).unwrap();
        assert_eq!(count_rows(&conn, Table::Words).unwrap(), 0);
        assert_eq!(count_rows(&conn, Table::SentenceWords).unwrap(), 0);
        assert_eq!(count_rows(&conn, Table::Sentences).unwrap(), 1);
    }

    #[test]
    fn test_sentences_recreated_over_pattern_links() {
        let conn = conn();
        let sentence = insert_sentence(&conn, &sentence("他是学生")).unwrap();
        let pattern = insert_pattern(&conn, &crate::patterns::PATTERNS[0]).unwrap();
        insert_pattern_links(
            &conn,
            &[SentencePatternLink {
                sentence_id: sentence,
                pattern_id: pattern,
            }],
        )
        .unwrap();

        recreate_sentence_tables(&conn).unwrap();
        assert_eq!(count_rows(&conn, Table::Sentences).unwrap(), 0);
        assert_eq!(count_rows(&conn, Table::SentencePatterns).unwrap(), 0);
        assert_eq!(count_rows(&conn, Table::Patterns).unwrap(), 1);

        // the pattern catalog can be rebuilt over the emptied link table
        recreate_pattern_tables(&conn).unwrap();
        assert_eq!(count_rows(&conn, Table::Patterns).unwrap(), 0);
    }

    #[test]
    fn test_tier_breakdown() {
        let conn = conn();
        insert_headword(&conn, &headword("一", 1)).unwrap();
        insert_headword(&conn, &headword("二", 1)).unwrap();
        insert_headword(&conn, &headword("三", 3)).unwrap();
        assert_eq!(
            tier_breakdown(&conn).unwrap(),
            vec![(Tier(1), 2), (Tier(3), 1)]
        );
    }
}
