//! Error type shared by every stage of the post-processing pipeline.
//!
//! Only missing resources are fatal. Per-word problems (lookup misses, lemma
//! mismatches, failed online queries) are collected into reports instead of
//! travelling through this type.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required input (text, lexicon, dictionary) does not exist.
    #[error("missing resource {kind}: {}", path.display())]
    MissingResource { kind: &'static str, path: PathBuf },

    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed lexicon {}: {reason}", path.display())]
    MalformedLexicon { path: PathBuf, reason: String },

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// A single online lexicon query failed.
    #[error("lexicon query for '{word}' failed: {reason}")]
    Query { word: String, reason: String },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        Error::Io { path, source }
    }

    pub(crate) fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Error::Json {
            context: context.into(),
            source,
        }
    }

    /// Read a required file, mapping `NotFound` onto [`Error::MissingResource`].
    pub(crate) fn read_required(kind: &'static str, path: &std::path::Path) -> Result<String> {
        std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::MissingResource {
                kind,
                path: path.to_path_buf(),
            },
            _ => Error::io(path, e),
        })
    }

    pub fn is_missing_resource(&self) -> bool {
        matches!(self, Error::MissingResource { .. })
    }
}
