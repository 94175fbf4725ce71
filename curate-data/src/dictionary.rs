//! Raw multi-sense dictionary input (`hsk-complete.json` layout) and the
//! pronunciation override table.

use std::collections::BTreeMap;
use std::path::Path;

use chinese_utils::{CandidateForm, Tier};
use serde::Deserialize;

use crate::error::InputError;

#[derive(Debug, Clone, Deserialize)]
pub struct RawDictionaryEntry {
    pub simplified: String,
    #[serde(default, rename = "level")]
    pub levels: Vec<String>,
    #[serde(default)]
    pub pos: Vec<String>,
    #[serde(default)]
    pub frequency: i64,
    #[serde(default)]
    pub forms: Vec<RawForm>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawForm {
    #[serde(default)]
    pub traditional: String,
    #[serde(default)]
    pub transcriptions: Transcriptions,
    #[serde(default)]
    pub meanings: Vec<String>,
    #[serde(default)]
    pub classifiers: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Transcriptions {
    #[serde(default)]
    pub pinyin: String,
    #[serde(default)]
    pub numeric: String,
}

impl From<&RawForm> for CandidateForm {
    fn from(form: &RawForm) -> Self {
        CandidateForm {
            traditional: form.traditional.clone(),
            pinyin: form.transcriptions.pinyin.clone(),
            pinyin_numeric: form.transcriptions.numeric.clone(),
            glosses: form.meanings.clone(),
            classifiers: form.classifiers.clone(),
        }
    }
}

impl RawDictionaryEntry {
    pub fn candidate_forms(&self) -> Vec<CandidateForm> {
        self.forms.iter().map(CandidateForm::from).collect()
    }

    pub fn tier(&self) -> Option<Tier> {
        Tier::from_level_tags(&self.levels)
    }

    /// Whether any level tag names a tier in `1..=max_tier`.
    pub fn within_tiers(&self, max_tier: u8) -> bool {
        self.levels
            .iter()
            .filter_map(|tag| Tier::from_level_tag(tag))
            .any(|tier| tier.get() <= max_tier)
    }
}

/// Simplified form -> pinyin that the canonical form must carry.
pub type Overrides = BTreeMap<String, String>;

pub fn load_dictionary(path: &Path) -> Result<Vec<RawDictionaryEntry>, InputError> {
    read_json(path)
}

/// The override table is optional; passing no path yields an empty table,
/// but a path that was given must exist and parse.
pub fn load_overrides(path: Option<&Path>) -> Result<Overrides, InputError> {
    match path {
        Some(path) => read_json(path),
        None => Ok(Overrides::new()),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, InputError> {
    let content = std::fs::read_to_string(path).map_err(|e| InputError::io(path, e))?;
    serde_json::from_str(&content).map_err(|source| InputError::Json {
        path: path.to_path_buf(),
        source,
    })
}
