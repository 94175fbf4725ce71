//! `fill-missing` mode: populate pinyin and audio references that are still
//! NULL, leaving every other column alone.
//!
//! Both collaborators are traits so the external converter and speech
//! service can be swapped out.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use anyhow::{Context, bail};
use pinyin::ToPinyin;
use rusqlite::Connection;
use xxhash_rust::xxh3::xxh3_64;

use crate::store::{self, FillColumn, Table};

pub const PINYIN_BATCH: usize = 1000;
pub const AUDIO_BATCH: usize = 50;

pub const DEFAULT_VOICE: &str = "zh-CN-XiaoxiaoNeural";
pub const DEFAULT_TTS_PROGRAM: &str = "edge-tts";
pub const DEFAULT_SENTENCE_LIMIT: usize = 500;
pub const DEFAULT_DELAY_MS: u64 = 500;

/// Text to pronunciation converter.
pub trait Transcriber {
    fn transcribe(&self, text: &str) -> anyhow::Result<String>;
}

/// Tone-marked pinyin, one syllable per Han character, separated by spaces.
/// Runs of other characters are kept verbatim as their own segments; runs
/// of only whitespace are dropped.
pub struct PinyinTranscriber;

impl Transcriber for PinyinTranscriber {
    fn transcribe(&self, text: &str) -> anyhow::Result<String> {
        let mut segments: Vec<String> = Vec::new();
        let mut run = String::new();
        for (ch, pinyin) in text.chars().zip(text.to_pinyin()) {
            match pinyin {
                Some(pinyin) => {
                    push_run(&mut segments, &mut run);
                    segments.push(pinyin.with_tone().to_string());
                }
                None => run.push(ch),
            }
        }
        push_run(&mut segments, &mut run);
        Ok(segments.join(" "))
    }
}

fn push_run(segments: &mut Vec<String>, run: &mut String) {
    if !run.trim().is_empty() {
        segments.push(std::mem::take(run));
    }
    run.clear();
}

/// Text to speech service writing an audio file.
pub trait Synthesizer {
    fn synthesize(&self, text: &str, path: &Path) -> anyhow::Result<()>;
}

/// Runs an `edge-tts` compatible program once per utterance.
#[derive(Debug, Clone)]
pub struct EdgeTts {
    pub program: String,
    pub voice: String,
}

impl Synthesizer for EdgeTts {
    fn synthesize(&self, text: &str, path: &Path) -> anyhow::Result<()> {
        let output = Command::new(&self.program)
            .arg("--voice")
            .arg(&self.voice)
            .arg("--text")
            .arg(text)
            .arg("--write-media")
            .arg(path)
            .output()
            .with_context(|| format!("Failed to run {}", self.program))?;

        if !output.status.success() {
            bail!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        if !path.exists() {
            bail!("{} produced no file at {}", self.program, path.display());
        }
        Ok(())
    }
}

/// Counts for one back-filled column.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FillSummary {
    pub filled: usize,
    pub failed: usize,
    /// Rows with the column populated after the run.
    pub populated: usize,
    pub total: usize,
}

/// Add pinyin to every sentence that has none, committing every
/// [`PINYIN_BATCH`] rows.
pub fn fill_pinyin(
    conn: &mut Connection,
    transcriber: &dyn Transcriber,
) -> anyhow::Result<FillSummary> {
    let pending = store::missing(conn, Table::Sentences, FillColumn::Pinyin, None)?;
    log::info!("{} sentences need pinyin", pending.len());

    let mut summary = FillSummary::default();
    let pb = crate::progress::progress_bar(pending.len(), "sentences");
    for chunk in pending.chunks(PINYIN_BATCH) {
        let tx = conn.transaction()?;
        for (id, chinese) in chunk {
            pb.inc(1);
            match transcriber.transcribe(chinese) {
                Ok(pinyin) => {
                    if store::fill(&tx, Table::Sentences, FillColumn::Pinyin, *id, &pinyin)? {
                        summary.filled += 1;
                    }
                }
                Err(e) => {
                    log::warn!("Failed to transcribe {chinese:?}: {e:#}");
                    summary.failed += 1;
                }
            }
        }
        tx.commit()?;
        log::info!("Updated {} sentences...", summary.filled);
    }
    pb.finish_and_clear();

    summary.populated = store::count_filled(conn, Table::Sentences, FillColumn::Pinyin)?;
    summary.total = store::count_rows(conn, Table::Sentences)?;
    Ok(summary)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioKind {
    Words,
    Sentences,
}

impl AudioKind {
    pub fn dir_name(self) -> &'static str {
        match self {
            AudioKind::Words => "words",
            AudioKind::Sentences => "sentences",
        }
    }

    fn table(self) -> Table {
        match self {
            AudioKind::Words => Table::Words,
            AudioKind::Sentences => Table::Sentences,
        }
    }
}

/// Content-addressed file name, so identical text shares one file.
pub fn audio_file_name(text: &str) -> String {
    format!("{:016x}.mp3", xxh3_64(text.as_bytes()))
}

/// Reference stored in the `audio_path` column.
pub fn audio_reference(kind: AudioKind, file_name: &str) -> String {
    format!("/audio/{}/{}", kind.dir_name(), file_name)
}

#[derive(Debug, Clone)]
pub struct AudioOptions {
    pub audio_dir: PathBuf,
    /// Cap on sentences processed per run; words are always done in full.
    pub sentence_limit: usize,
    /// Pause after each synthesis call.
    pub delay: Duration,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AudioFillSummary {
    pub synthesized: usize,
    /// Files already on disk that were linked without synthesis.
    pub reused: usize,
    pub failed: usize,
    pub populated: usize,
    pub total: usize,
}

/// Synthesize (or reuse) audio for words, then for up to
/// `sentence_limit` sentences.
pub fn fill_audio(
    conn: &mut Connection,
    synthesizer: &dyn Synthesizer,
    options: &AudioOptions,
) -> anyhow::Result<(AudioFillSummary, AudioFillSummary)> {
    let words = fill_audio_for(conn, synthesizer, options, AudioKind::Words, None)?;
    let sentences = fill_audio_for(
        conn,
        synthesizer,
        options,
        AudioKind::Sentences,
        Some(options.sentence_limit),
    )?;
    Ok((words, sentences))
}

fn fill_audio_for(
    conn: &mut Connection,
    synthesizer: &dyn Synthesizer,
    options: &AudioOptions,
    kind: AudioKind,
    limit: Option<usize>,
) -> anyhow::Result<AudioFillSummary> {
    let dir = options.audio_dir.join(kind.dir_name());
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    let table = kind.table();
    let pending = store::missing(conn, table, FillColumn::AudioPath, limit)?;
    log::info!("{} {} need audio", pending.len(), kind.dir_name());

    let mut summary = AudioFillSummary::default();
    let pb = crate::progress::progress_bar(pending.len(), kind.dir_name());
    for chunk in pending.chunks(AUDIO_BATCH) {
        let tx = conn.transaction()?;
        for (id, text) in chunk {
            pb.inc(1);
            let file_name = audio_file_name(text);
            let path = dir.join(&file_name);

            if path.exists() {
                summary.reused += 1;
            } else {
                let result = synthesizer.synthesize(text, &path);
                if !options.delay.is_zero() {
                    std::thread::sleep(options.delay);
                }
                if let Err(e) = result {
                    log::warn!("Failed to synthesize {text:?}: {e:#}");
                    // a partial file would otherwise be reused next run
                    let _ = std::fs::remove_file(&path);
                    summary.failed += 1;
                    continue;
                }
                summary.synthesized += 1;
            }

            store::fill(
                &tx,
                table,
                FillColumn::AudioPath,
                *id,
                &audio_reference(kind, &file_name),
            )?;
        }
        tx.commit()?;
    }
    pb.finish_and_clear();

    summary.populated = store::count_filled(conn, table, FillColumn::AudioPath)?;
    summary.total = store::count_rows(conn, table)?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chinese_utils::{CandidateForm, HeadwordEntry, SentenceRecord, Tier};
    use std::cell::RefCell;

    struct Prefixing;

    impl Transcriber for Prefixing {
        fn transcribe(&self, text: &str) -> anyhow::Result<String> {
            if text.contains('坏') {
                bail!("cannot transcribe");
            }
            Ok(format!("py:{text}"))
        }
    }

    #[derive(Default)]
    struct RecordingSynthesizer {
        calls: RefCell<Vec<String>>,
    }

    impl Synthesizer for RecordingSynthesizer {
        fn synthesize(&self, text: &str, path: &Path) -> anyhow::Result<()> {
            self.calls.borrow_mut().push(text.to_string());
            if text.contains('坏') {
                bail!("service unavailable");
            }
            std::fs::write(path, b"mp3")?;
            Ok(())
        }
    }

    fn sentence(chinese: &str, pinyin: Option<&str>) -> SentenceRecord {
        SentenceRecord {
            chinese: chinese.to_string(),
            english: String::new(),
            pinyin: pinyin.map(str::to_string),
            difficulty: 0.0,
            audio_path: None,
            tokens: vec![],
        }
    }

    fn conn_with(words: &[&str], sentences: &[SentenceRecord]) -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        store::recreate_words_table(&conn).unwrap();
        store::recreate_sentence_tables(&conn).unwrap();
        for word in words {
            let entry =
                HeadwordEntry::from_canonical_form(word, &CandidateForm::default(), Tier(1), vec![], 0);
            store::insert_headword(&conn, &entry).unwrap();
        }
        for record in sentences {
            store::insert_sentence(&conn, record).unwrap();
        }
        conn
    }

    fn options(dir: &Path, sentence_limit: usize) -> AudioOptions {
        AudioOptions {
            audio_dir: dir.to_path_buf(),
            sentence_limit,
            delay: Duration::ZERO,
        }
    }

    #[test]
    fn test_pinyin_transcriber() {
        assert_eq!(PinyinTranscriber.transcribe("你好").unwrap(), "nǐ hǎo");
        assert_eq!(
            PinyinTranscriber.transcribe("你好, Tom!").unwrap(),
            "nǐ hǎo , Tom!"
        );
        // inner spacing of a non-Han run survives
        assert_eq!(
            PinyinTranscriber.transcribe("你好 Tom 再见").unwrap(),
            "nǐ hǎo  Tom  zài jiàn"
        );
        assert_eq!(
            PinyinTranscriber.transcribe("你好 再见").unwrap(),
            "nǐ hǎo zài jiàn"
        );
        assert_eq!(PinyinTranscriber.transcribe("").unwrap(), "");
    }

    #[test]
    fn test_fill_pinyin_skips_populated_rows() {
        let mut conn = conn_with(
            &[],
            &[
                sentence("你好", None),
                sentence("谢谢", Some("xiè xie")),
                sentence("坏了", None),
            ],
        );

        let summary = fill_pinyin(&mut conn, &Prefixing).unwrap();
        assert_eq!(
            summary,
            FillSummary {
                filled: 1,
                failed: 1,
                populated: 2,
                total: 3,
            }
        );

        let stored: Vec<Option<String>> = store::load_sentences(&conn)
            .unwrap()
            .into_iter()
            .map(|s| s.pinyin)
            .collect();
        assert_eq!(
            stored,
            vec![Some("py:你好".to_string()), Some("xiè xie".to_string()), None]
        );

        // nothing left but the failure
        let again = fill_pinyin(&mut conn, &Prefixing).unwrap();
        assert_eq!(again.filled, 0);
        assert_eq!(again.failed, 1);
    }

    #[test]
    fn test_fill_audio_reuses_files_and_respects_limit() {
        let dir = tempfile::tempdir().unwrap();
        let mut conn = conn_with(
            &["好", "坏"],
            &[sentence("你好", None), sentence("谢谢", None), sentence("再见", None)],
        );

        // pre-existing file for 好 is linked without synthesis
        std::fs::create_dir_all(dir.path().join("words")).unwrap();
        std::fs::write(dir.path().join("words").join(audio_file_name("好")), b"old").unwrap();

        let synthesizer = RecordingSynthesizer::default();
        let (words, sentences) = fill_audio(&mut conn, &synthesizer, &options(dir.path(), 2)).unwrap();

        assert_eq!(words.reused, 1);
        assert_eq!(words.failed, 1);
        assert_eq!(words.synthesized, 0);
        assert_eq!(words.populated, 1);
        assert_eq!(sentences.synthesized, 2);
        assert_eq!(sentences.populated, 2);
        assert_eq!(sentences.total, 3);
        assert_eq!(*synthesizer.calls.borrow(), vec!["坏", "你好", "谢谢"]);

        assert!(!dir.path().join("words").join(audio_file_name("坏")).exists());
        let headwords = store::load_headwords(&conn).unwrap();
        assert_eq!(
            headwords[0].audio_path,
            Some(format!("/audio/words/{}", audio_file_name("好")))
        );
        assert_eq!(headwords[1].audio_path, None);
        assert!(dir.path().join("sentences").join(audio_file_name("你好")).exists());
    }

    #[test]
    fn test_audio_file_name_is_stable() {
        assert_eq!(audio_file_name("你好"), audio_file_name("你好"));
        assert_ne!(audio_file_name("你好"), audio_file_name("您好"));
        assert!(audio_file_name("你好").ends_with(".mp3"));
        assert_eq!(audio_file_name("你好").len(), 16 + 4);
    }
}
