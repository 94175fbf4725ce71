use anyhow::Context;
use chinese_utils::{PatternId, SentencePatternLink};
use rusqlite::Connection;

use crate::patterns::{self, PatternCatalog};
use crate::store;

#[derive(Debug)]
pub struct PatternTagSummary {
    pub patterns: usize,
    pub sentences: usize,
    pub links: usize,
    /// (name, example, sentences matched), most used first.
    pub usage: Vec<(String, Option<String>, usize)>,
}

impl PatternTagSummary {
    pub fn print(&self) {
        println!();
        println!("Pattern tagging complete:");
        println!("  Patterns: {}", self.patterns);
        println!("  Sentences scanned: {}", self.sentences);
        println!("  Sentence-pattern links: {}", self.links);
        println!();
        println!("Pattern usage:");
        for (name, example, count) in &self.usage {
            match example {
                Some(example) => println!("  {name}: {count} sentences (e.g. {example})"),
                None => println!("  {name}: {count} sentences"),
            }
        }
    }
}

/// Drop and recreate the pattern catalog and tag every stored sentence.
pub fn rebuild_patterns(conn: &mut Connection) -> anyhow::Result<PatternTagSummary> {
    let catalog = PatternCatalog::load()?;
    let sentences = store::sentence_texts(conn).context("Failed to load sentences")?;
    log::info!(
        "Tagging {} sentences against {} patterns",
        sentences.len(),
        catalog.len()
    );

    let pb = crate::progress::progress_bar(sentences.len(), "sentences");
    let tagging = patterns::tag_all(
        &catalog,
        sentences.iter().map(|(id, text)| {
            pb.inc(1);
            (*id, text.as_str())
        }),
    );
    pb.finish_and_clear();

    let tx = conn.transaction()?;
    store::recreate_pattern_tables(&tx).context("Failed to recreate pattern tables")?;
    let ids = catalog
        .patterns()
        .map(|pattern| store::insert_pattern(&tx, pattern))
        .collect::<store::Result<Vec<PatternId>>>()?;

    let links: Vec<SentencePatternLink> = tagging
        .links
        .iter()
        .map(|&(sentence_id, index)| SentencePatternLink {
            sentence_id,
            pattern_id: ids[index],
        })
        .collect();
    store::insert_pattern_links(&tx, &links)?;

    for (id, example) in ids.iter().zip(&tagging.examples) {
        if let Some(example) = example {
            store::set_pattern_example(&tx, *id, example)?;
        }
    }
    tx.commit()?;

    log::info!("Inserted {} sentence-pattern links", links.len());

    Ok(PatternTagSummary {
        patterns: catalog.len(),
        sentences: sentences.len(),
        links: links.len(),
        usage: store::pattern_usage(conn)?,
    })
}
