//! Lexicon index backed by the Frankfurt Latin Lexicon (FLL).
//!
//! Maps a lowercase surface form to its lemma and super-lemma. Entries come
//! either from the bulk TSV export or from the online service (see
//! [`online`]); after loading the index is read-only.

pub mod online;

use std::collections::HashMap;
use std::fmt;
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Column headers of the FLL bulk export.
const COL_SURFACE: &str = "WF-Name";
const COL_LEMMA: &str = "L-Name";
const COL_SUPER_LEMMA: &str = "SL-Name";

/// Part-of-speech tag carried after the `@` of a super-lemma.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PartOfSpeech {
    Verb,
    Adverb,
    Pronoun,
    Noun,
    Adjective,
    Other(String),
}

impl PartOfSpeech {
    pub fn parse(tag: &str) -> Self {
        match tag {
            "V" => PartOfSpeech::Verb,
            "ADV" => PartOfSpeech::Adverb,
            "PRO" => PartOfSpeech::Pronoun,
            "NN" => PartOfSpeech::Noun,
            "AP" => PartOfSpeech::Adjective,
            other => PartOfSpeech::Other(other.to_string()),
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            PartOfSpeech::Verb => "V",
            PartOfSpeech::Adverb => "ADV",
            PartOfSpeech::Pronoun => "PRO",
            PartOfSpeech::Noun => "NN",
            PartOfSpeech::Adjective => "AP",
            PartOfSpeech::Other(tag) => tag,
        }
    }
}

impl fmt::Display for PartOfSpeech {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A super-lemma of the form `base@POS`, parsed once at load time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct SuperLemma {
    pub base: String,
    pub pos: PartOfSpeech,
}

impl SuperLemma {
    /// Split on the first `@`. A value without a tag gets an empty `Other` tag.
    pub fn parse(raw: &str) -> Self {
        let (base, tag) = raw.split_once('@').unwrap_or((raw, ""));
        Self {
            base: base.to_string(),
            pos: PartOfSpeech::parse(tag),
        }
    }
}

impl fmt::Display for SuperLemma {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.base, self.pos)
    }
}

impl From<String> for SuperLemma {
    fn from(raw: String) -> Self {
        SuperLemma::parse(&raw)
    }
}

impl From<SuperLemma> for String {
    fn from(value: SuperLemma) -> Self {
        value.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexiconEntry {
    pub surface_form: String,
    pub lemma: String,
    pub super_lemma: SuperLemma,
}

impl LexiconEntry {
    pub fn new(surface_form: &str, lemma: &str, super_lemma: &str) -> Self {
        Self {
            surface_form: surface_form.to_lowercase(),
            lemma: lemma.to_string(),
            super_lemma: SuperLemma::parse(super_lemma),
        }
    }
}

#[derive(Debug, Deserialize)]
struct FllRow {
    #[serde(rename = "WF-Name")]
    surface_form: String,
    #[serde(rename = "L-Name")]
    lemma: String,
    #[serde(rename = "SL-Name")]
    super_lemma: String,
}

/// Exact-match index from lowercase surface form to its entry.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    entries: HashMap<String, LexiconEntry>,
}

impl Lexicon {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = LexiconEntry>) -> Self {
        let mut lexicon = Self::new();
        for entry in entries {
            lexicon.insert(entry);
        }
        lexicon
    }

    /// Add an entry. The first entry seen for a surface form wins.
    pub fn insert(&mut self, entry: LexiconEntry) -> bool {
        let key = entry.surface_form.to_lowercase();
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, entry);
        true
    }

    pub fn get(&self, word: &str) -> Option<&LexiconEntry> {
        self.entries.get(&word.to_lowercase())
    }

    pub fn contains(&self, word: &str) -> bool {
        self.get(word).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &LexiconEntry> {
        self.entries.values()
    }

    /// Load the tab-separated FLL export. Malformed rows are skipped.
    pub fn from_tsv_path(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::MissingResource {
                kind: "lexicon",
                path: path.to_path_buf(),
            },
            _ => Error::io(path, e),
        })?;
        let lexicon = Self::from_tsv_reader(file).map_err(|e| match e {
            Error::MalformedLexicon { reason, .. } => Error::MalformedLexicon {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })?;
        tracing::info!(
            "Loaded lexicon {}: {} surface forms",
            path.display(),
            lexicon.len()
        );
        Ok(lexicon)
    }

    pub fn from_tsv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .flexible(true)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        for column in [COL_SURFACE, COL_LEMMA, COL_SUPER_LEMMA] {
            if !headers.iter().any(|h| h == column) {
                return Err(Error::MalformedLexicon {
                    path: "<reader>".into(),
                    reason: format!("missing column {column}"),
                });
            }
        }

        let mut lexicon = Self::new();
        let mut skipped = 0usize;
        for result in reader.deserialize::<FllRow>() {
            match result {
                Ok(row) => {
                    lexicon.insert(LexiconEntry::new(
                        &row.surface_form,
                        &row.lemma,
                        &row.super_lemma,
                    ));
                }
                Err(e) => {
                    skipped += 1;
                    tracing::debug!("Skipping lexicon row: {}", e);
                }
            }
        }
        if skipped > 0 {
            tracing::warn!("Skipped {} malformed lexicon rows", skipped);
        }
        Ok(lexicon)
    }

    /// Persist entries as JSON, e.g. after an online lookup run.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let mut entries: Vec<&LexiconEntry> = self.entries().collect();
        entries.sort_by(|a, b| a.surface_form.cmp(&b.surface_form));
        let json = serde_json::to_string_pretty(&entries)
            .map_err(|e| Error::json(path.display().to_string(), e))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        fs::write(path, json).map_err(|e| Error::io(path, e))
    }

    pub fn load_json(path: &Path) -> Result<Self> {
        let content = Error::read_required("lexicon cache", path)?;
        let entries: Vec<LexiconEntry> = serde_json::from_str(&content)
            .map_err(|e| Error::json(path.display().to_string(), e))?;
        Ok(Self::from_entries(entries))
    }
}
