use std::path::PathBuf;

/// Problems with the mandatory inputs. Any of these aborts the run before
/// the store is touched.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("required input file not found: {}", .0.display())]
    Missing(PathBuf),
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid rule for pattern `{name}`: {source}")]
    PatternRule {
        name: &'static str,
        #[source]
        source: regex::Error,
    },
}

/// Failures of the relational store. These terminate the run.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("failed to encode or decode a JSON column: {0}")]
    Json(#[from] serde_json::Error),
}

impl InputError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            InputError::Missing(path)
        } else {
            InputError::Io { path, source }
        }
    }
}
