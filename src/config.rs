//! Pipeline configuration.
//!
//! `defaults/htr.default.toml` is embedded into the crate; callers layer
//! project-specific files and single-key overrides on top of it via
//! [`Loader`] before deserializing into [`PipelineConfig`]. The resulting value
//! is handed to each component's constructor.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

use crate::error::Result;

const DEFAULT_TOML: &str = include_str!("../defaults/htr.default.toml");

/// An ordered `(from, to)` substring replacement.
pub type Replacement = (String, String);

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    pub unicode_form: UnicodeForm,
    pub language_check: bool,
    /// Characters (or short sequences) marking a token as abbreviated.
    pub markers: Vec<String>,
    pub characters_to_clean: Vec<String>,
    pub expansion_rules: Vec<Replacement>,
    pub verb_endings_to_normalise: Vec<Replacement>,
    pub characters_to_normalise: Vec<Replacement>,
    /// Super-lemmas (`base@POS`) excluded from normalisation.
    pub stopwords: HashSet<String>,
    /// Nominal endings; the first one the super-lemma base ends with is stripped.
    pub noun_endings: Vec<String>,
    pub verification: VerificationPolicy,
    pub online: OnlineConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnicodeForm {
    None,
    Nfc,
    Nfd,
}

/// How expanded abbreviations are checked before they are written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationPolicy {
    /// Every expansion counts as valid.
    Bypass,
    /// Expansions whose lowercase form is not in the lexicon are reported.
    Lexicon,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OnlineConfig {
    /// Word-form search endpoint.
    pub url: String,
    /// Query parameter carrying the (percent-encoded) word.
    pub query_param: String,
    pub timeout_secs: u64,
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (used by the CLI).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<PipelineConfig> {
        Ok(self.builder.build()?.try_deserialize()?)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<PipelineConfig> {
    Loader::new().build()
}
