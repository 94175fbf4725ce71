use std::path::Path;

use anyhow::Context;
use chinese_utils::{SentencePair, SentenceRecord};
use rusqlite::Connection;

use crate::coverage;
use crate::difficulty;
use crate::linker;
use crate::segmenter::Segmenter;
use crate::store;
use crate::tatoeba;
use crate::vocabulary::Vocabulary;

/// Accepted sentences are committed in groups of this size.
pub const SENTENCE_BATCH: usize = 1000;

/// Why a deduplicated pair was not kept.
#[derive(Debug, Clone, PartialEq)]
pub enum Skip {
    NoScript,
    BelowCoverage { coverage: f64 },
}

/// Screen one pair and, if it is accepted, score it.
pub fn curate(
    pair: &SentencePair,
    vocabulary: &Vocabulary,
    segmenter: &dyn Segmenter,
) -> Result<SentenceRecord, Skip> {
    let screening = coverage::accept(&pair.chinese, vocabulary, segmenter);
    if screening.had_no_script() {
        return Err(Skip::NoScript);
    }
    if !screening.accepted {
        return Err(Skip::BelowCoverage {
            coverage: screening.coverage,
        });
    }

    Ok(SentenceRecord {
        chinese: pair.chinese.clone(),
        english: pair.english.clone(),
        pinyin: None,
        difficulty: difficulty::score(&screening.tokens, vocabulary, screening.coverage),
        audio_path: None,
        tokens: screening.tokens,
    })
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SentenceImportSummary {
    pub imported: usize,
    pub malformed: usize,
    pub duplicates: usize,
    pub no_script: usize,
    pub below_coverage: usize,
    pub links: usize,
}

impl SentenceImportSummary {
    pub fn skipped(&self) -> usize {
        self.malformed + self.duplicates + self.no_script + self.below_coverage
    }

    pub fn print(&self) {
        println!();
        println!("Sentence import complete:");
        println!("  Imported: {} sentences", self.imported);
        println!("  Skipped: {} records", self.skipped());
        println!("    malformed: {}", self.malformed);
        println!("    duplicate: {}", self.duplicates);
        println!("    no Chinese characters: {}", self.no_script);
        println!(
            "    below {:.0}% coverage: {}",
            coverage::MIN_COVERAGE * 100.0,
            self.below_coverage
        );
        println!("  Word-sentence links: {}", self.links);
    }
}

/// Drop and recreate the sentence tables from the raw corpus.
///
/// The corpus is read and the vocabulary loaded before anything is dropped.
/// Accepted sentences are written in batches of [`SENTENCE_BATCH`], each in
/// its own transaction.
pub fn rebuild_sentences(
    conn: &mut Connection,
    corpus_path: &Path,
    segmenter: &dyn Segmenter,
) -> anyhow::Result<SentenceImportSummary> {
    log::info!("Loading sentence pairs from {}", corpus_path.display());
    let corpus = tatoeba::read_tatoeba_pairs(corpus_path)?;
    log::info!("Loaded {} unique sentences", corpus.pairs.len());

    let vocabulary = store::load_vocabulary(conn).context("Failed to load headwords")?;
    if vocabulary.is_empty() {
        log::warn!("No headwords in the store; every sentence will be rejected");
    }
    log::info!("Loaded {} headwords for filtering", vocabulary.len());

    store::recreate_sentence_tables(conn).context("Failed to recreate sentence tables")?;

    let mut summary = SentenceImportSummary {
        malformed: corpus.malformed,
        duplicates: corpus.duplicates,
        ..Default::default()
    };
    let mut batch: Vec<SentenceRecord> = Vec::with_capacity(SENTENCE_BATCH);

    let pb = crate::progress::progress_bar(corpus.pairs.len(), "sentences");
    for pair in &corpus.pairs {
        pb.inc(1);
        match curate(pair, &vocabulary, segmenter) {
            Ok(record) => batch.push(record),
            Err(Skip::NoScript) => {
                log::debug!("no Chinese characters in {:?}", pair.chinese);
                summary.no_script += 1;
            }
            Err(Skip::BelowCoverage { coverage }) => {
                log::debug!("coverage {coverage:.2} for {:?}", pair.chinese);
                summary.below_coverage += 1;
            }
        }

        if batch.len() >= SENTENCE_BATCH {
            flush(conn, &mut batch, &vocabulary, &mut summary)?;
            pb.set_message(format!("{} imported", summary.imported));
        }
    }
    flush(conn, &mut batch, &vocabulary, &mut summary)?;
    pb.finish_and_clear();

    Ok(summary)
}

fn flush(
    conn: &mut Connection,
    batch: &mut Vec<SentenceRecord>,
    vocabulary: &Vocabulary,
    summary: &mut SentenceImportSummary,
) -> anyhow::Result<()> {
    if batch.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for record in batch.iter() {
        let sentence_id = store::insert_sentence(&tx, record)
            .with_context(|| format!("Failed to insert sentence {:?}", record.chinese))?;
        let links = linker::link(sentence_id, &record.tokens, vocabulary);
        store::insert_word_links(&tx, &links)?;
        summary.links += links.len();
    }
    tx.commit()?;

    summary.imported += batch.len();
    log::info!("Processed {} sentences...", summary.imported);
    batch.clear();
    Ok(())
}
