use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};

use curate_data::backfill::{self, AudioOptions, EdgeTts, PinyinTranscriber};
use curate_data::headwords;
use curate_data::segmenter::JiebaSegmenter;
use curate_data::sentences;
use curate_data::store;
use curate_data::tagging;

/// Build the HSK word and sentence store used by the study app.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// SQLite database to write
    #[arg(long, env = "CURATE_DB", default_value = "chinese.db")]
    db: PathBuf,

    #[command(subcommand)]
    command: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Drop and recreate tables from the raw inputs
    #[command(subcommand)]
    Rebuild(Rebuild),
    /// Only populate columns that are still empty
    #[command(subcommand)]
    FillMissing(FillMissing),
}

#[derive(Subcommand, Debug)]
enum Rebuild {
    /// Import headwords from the HSK dictionary
    Words(WordsArgs),
    /// Import, screen and score Tatoeba sentence pairs
    Sentences(SentencesArgs),
    /// Tag stored sentences with grammar patterns
    Patterns,
    /// Words, then sentences, then patterns
    All {
        #[command(flatten)]
        words: WordsArgs,
        #[command(flatten)]
        sentences: SentencesArgs,
    },
}

#[derive(clap::Args, Debug)]
struct WordsArgs {
    /// HSK dictionary JSON
    #[arg(long)]
    dictionary: PathBuf,

    /// JSON object mapping a headword to its preferred pinyin
    #[arg(long)]
    overrides: Option<PathBuf>,

    /// Highest tier to import
    #[arg(long, default_value_t = headwords::DEFAULT_MAX_TIER)]
    max_tier: u8,
}

#[derive(clap::Args, Debug)]
struct SentencesArgs {
    /// Tatoeba pairs export (tab separated)
    #[arg(long)]
    corpus: PathBuf,
}

#[derive(Subcommand, Debug)]
enum FillMissing {
    /// Add pinyin to sentences without it
    Pinyin,
    /// Synthesize audio for words and sentences without it
    Audio {
        /// Directory that receives words/ and sentences/
        #[arg(long)]
        audio_dir: PathBuf,

        #[arg(long, default_value = backfill::DEFAULT_VOICE)]
        voice: String,

        /// edge-tts compatible program
        #[arg(long, default_value = backfill::DEFAULT_TTS_PROGRAM)]
        tts_program: String,

        /// Most sentences to process in one run
        #[arg(long, default_value_t = backfill::DEFAULT_SENTENCE_LIMIT)]
        sentence_limit: usize,

        /// Pause between synthesis calls, in milliseconds
        #[arg(long, default_value_t = backfill::DEFAULT_DELAY_MS)]
        delay_ms: u64,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut conn = store::open(&args.db)
        .with_context(|| format!("Failed to open database {}", args.db.display()))?;

    match args.command {
        Mode::Rebuild(Rebuild::Words(words)) => rebuild_words(&mut conn, &words)?,
        Mode::Rebuild(Rebuild::Sentences(corpus)) => rebuild_sentences(&mut conn, &corpus)?,
        Mode::Rebuild(Rebuild::Patterns) => tagging::rebuild_patterns(&mut conn)?.print(),
        Mode::Rebuild(Rebuild::All { words, sentences }) => {
            rebuild_words(&mut conn, &words)?;
            rebuild_sentences(&mut conn, &sentences)?;
            tagging::rebuild_patterns(&mut conn)?.print();
        }
        Mode::FillMissing(FillMissing::Pinyin) => {
            let summary = backfill::fill_pinyin(&mut conn, &PinyinTranscriber)?;
            println!();
            println!("Pinyin back-fill complete:");
            println!("  Updated: {}", summary.filled);
            println!("  Failed: {}", summary.failed);
            println!(
                "  Sentences with pinyin: {}/{}",
                summary.populated, summary.total
            );
        }
        Mode::FillMissing(FillMissing::Audio {
            audio_dir,
            voice,
            tts_program,
            sentence_limit,
            delay_ms,
        }) => {
            let synthesizer = EdgeTts {
                program: tts_program,
                voice,
            };
            let options = AudioOptions {
                audio_dir,
                sentence_limit,
                delay: Duration::from_millis(delay_ms),
            };
            let (words, sentences) = backfill::fill_audio(&mut conn, &synthesizer, &options)?;
            println!();
            println!("Audio back-fill complete:");
            for (label, summary) in [("Words", &words), ("Sentences", &sentences)] {
                println!(
                    "  {label}: {} generated, {} reused, {} failed; {}/{} with audio",
                    summary.synthesized,
                    summary.reused,
                    summary.failed,
                    summary.populated,
                    summary.total
                );
            }
        }
    }

    Ok(())
}

fn rebuild_words(conn: &mut rusqlite::Connection, args: &WordsArgs) -> anyhow::Result<()> {
    let summary = headwords::rebuild_words(
        conn,
        &args.dictionary,
        args.overrides.as_deref(),
        args.max_tier,
    )?;
    summary.print();
    Ok(())
}

fn rebuild_sentences(conn: &mut rusqlite::Connection, args: &SentencesArgs) -> anyhow::Result<()> {
    log::info!("Loading jieba dictionary");
    let segmenter = JiebaSegmenter::new();
    let summary = sentences::rebuild_sentences(conn, &args.corpus, &segmenter)?;
    summary.print();
    Ok(())
}
