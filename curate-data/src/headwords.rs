use std::path::Path;

use anyhow::Context;
use chinese_utils::{HeadwordEntry, Tier};
use rusqlite::Connection;
use rustc_hash::FxHashSet;

use crate::canonical_form;
use crate::dictionary::{self, Overrides, RawDictionaryEntry};
use crate::store;

/// Tiers 1..=3 make up the default course.
pub const DEFAULT_MAX_TIER: u8 = 3;

#[derive(Debug, Default)]
pub struct HeadwordSelection {
    pub entries: Vec<HeadwordEntry>,
    pub out_of_tier: usize,
    pub without_forms: usize,
    /// Entries whose simplified form was already taken by an earlier entry.
    pub duplicates: usize,
}

/// Resolve every in-tier dictionary entry to one headword, in dictionary
/// order.
pub fn select_headwords(
    raw_entries: &[RawDictionaryEntry],
    overrides: &Overrides,
    max_tier: u8,
) -> HeadwordSelection {
    let mut selection = HeadwordSelection::default();
    let mut seen: FxHashSet<&str> = FxHashSet::default();

    for raw in raw_entries {
        let tier = match raw.tier() {
            Some(tier) if raw.within_tiers(max_tier) => tier,
            _ => {
                selection.out_of_tier += 1;
                continue;
            }
        };

        let candidates = raw.candidate_forms();
        let Some(form) = canonical_form::select(&raw.simplified, &candidates, overrides) else {
            log::debug!("{} has no forms, skipping", raw.simplified);
            selection.without_forms += 1;
            continue;
        };

        if !seen.insert(raw.simplified.as_str()) {
            log::debug!("{} listed twice, keeping the first entry", raw.simplified);
            selection.duplicates += 1;
            continue;
        }

        selection.entries.push(HeadwordEntry::from_canonical_form(
            &raw.simplified,
            form,
            tier,
            raw.pos.clone(),
            raw.frequency,
        ));
    }

    selection
}

#[derive(Debug)]
pub struct WordImportSummary {
    pub imported: usize,
    pub out_of_tier: usize,
    pub without_forms: usize,
    pub duplicates: usize,
    pub per_tier: Vec<(Tier, usize)>,
}

impl WordImportSummary {
    pub fn print(&self) {
        println!();
        println!("Word import complete:");
        println!("  Imported: {} words", self.imported);
        println!("  Skipped (outside tiers): {}", self.out_of_tier);
        println!("  Skipped (no forms): {}", self.without_forms);
        println!("  Skipped (duplicate headword): {}", self.duplicates);
        for (tier, count) in &self.per_tier {
            println!("  {tier}: {count} words");
        }
    }
}

/// Drop and recreate the `words` table from the raw dictionary.
///
/// Both inputs are read before the table is touched, so a bad input leaves
/// the store as it was. Word-sentence links are emptied along with the words;
/// sentences are kept and relinked by the next sentence rebuild.
pub fn rebuild_words(
    conn: &mut Connection,
    dictionary_path: &Path,
    overrides_path: Option<&Path>,
    max_tier: u8,
) -> anyhow::Result<WordImportSummary> {
    log::info!("Loading dictionary from {}", dictionary_path.display());
    let raw_entries = dictionary::load_dictionary(dictionary_path)?;
    let overrides = dictionary::load_overrides(overrides_path)?;
    log::info!(
        "{} dictionary entries, {} pronunciation overrides",
        raw_entries.len(),
        overrides.len()
    );

    let selection = select_headwords(&raw_entries, &overrides, max_tier);

    let tx = conn.transaction()?;
    store::recreate_words_table(&tx).context("Failed to recreate words table")?;
    for entry in &selection.entries {
        store::insert_headword(&tx, entry)
            .with_context(|| format!("Failed to insert headword {}", entry.simplified))?;
    }
    tx.commit()?;
    log::info!("Word-sentence links cleared; rebuild sentences to relink them");

    Ok(WordImportSummary {
        imported: store::count_rows(conn, store::Table::Words)?,
        out_of_tier: selection.out_of_tier,
        without_forms: selection.without_forms,
        duplicates: selection.duplicates,
        per_tier: store::tier_breakdown(conn)?,
    })
}
