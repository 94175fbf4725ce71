#[cfg(test)]
mod test_utils;

pub mod backfill;
pub mod canonical_form;
pub mod coverage;
pub mod dictionary;
pub mod difficulty;
pub mod error;
pub mod headwords;
pub mod linker;
pub mod patterns;
pub mod progress;
pub mod segmenter;
pub mod sentences;
pub mod store;
pub mod tagging;
pub mod tatoeba;
pub mod vocabulary;
