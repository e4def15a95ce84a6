//! Scribal abbreviation detection and expansion.

use std::collections::HashMap;
use std::path::Path;

use serde::Serialize;

use crate::config::{PipelineConfig, Replacement, VerificationPolicy};
use crate::error::{Error, Result};
use crate::lexicon::Lexicon;
use crate::text::Document;

/// Abbreviated surface form to expansion, loaded from a JSON object.
#[derive(Debug, Clone, Default)]
pub struct AbbreviationDictionary {
    entries: HashMap<String, String>,
}

impl AbbreviationDictionary {
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = Error::read_required("abbreviation dictionary", path)?;
        let dictionary = Self::from_json_str(&content)
            .map_err(|e| match e {
                Error::Json { source, .. } => Error::json(path.display().to_string(), source),
                other => other,
            })?;
        tracing::info!(
            "Loaded abbreviation dictionary {}: {} entries",
            path.display(),
            dictionary.len()
        );
        Ok(dictionary)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let entries: HashMap<String, String> =
            serde_json::from_str(json).map_err(|e| Error::json("abbreviation dictionary", e))?;
        Ok(Self { entries })
    }

    pub fn get(&self, abbreviation: &str) -> Option<&str> {
        self.entries.get(abbreviation).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, String)> for AbbreviationDictionary {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpansionSource {
    Dictionary,
    Rules,
}

/// An abbreviated token and the expansion chosen for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AbbreviationCandidate {
    pub original: String,
    pub expansion: String,
    pub source: ExpansionSource,
}

/// Resolves abbreviated tokens and accumulates the results.
#[derive(Debug, Clone)]
pub struct AbbreviationResolver<'a> {
    markers: Vec<String>,
    rules: Vec<Replacement>,
    verification: VerificationPolicy,
    dictionary: &'a AbbreviationDictionary,
    expanded: Vec<AbbreviationCandidate>,
    rejected: Vec<AbbreviationCandidate>,
}

impl<'a> AbbreviationResolver<'a> {
    pub fn new(config: &PipelineConfig, dictionary: &'a AbbreviationDictionary) -> Self {
        Self {
            markers: config
                .markers
                .iter()
                .filter(|m| !m.is_empty())
                .cloned()
                .collect(),
            rules: config.expansion_rules.clone(),
            verification: config.verification,
            dictionary,
            expanded: Vec::new(),
            rejected: Vec::new(),
        }
    }

    pub fn is_abbreviated(&self, word: &str) -> bool {
        self.markers.iter().any(|marker| word.contains(marker.as_str()))
    }

    /// Resolve a single token without recording it.
    ///
    /// Tokens without a marker are not abbreviations and yield `None`.
    pub fn resolve(&self, word: &str) -> Option<AbbreviationCandidate> {
        if !self.is_abbreviated(word) {
            return None;
        }

        let (expansion, source) = match self.dictionary.get(word) {
            Some(expansion) => (expansion.to_string(), ExpansionSource::Dictionary),
            None => {
                let mut expansion = word.to_string();
                for (from, to) in &self.rules {
                    if !from.is_empty() {
                        expansion = expansion.replace(from.as_str(), to);
                    }
                }
                (expansion, ExpansionSource::Rules)
            }
        };

        Some(AbbreviationCandidate {
            original: word.to_string(),
            expansion,
            source,
        })
    }

    /// Resolve a token and record the result. No-op expansions are kept.
    pub fn expand_abbreviation(&mut self, word: &str) -> Option<&AbbreviationCandidate> {
        let candidate = self.resolve(word)?;
        tracing::debug!(
            "Expanded {} -> {} ({:?})",
            candidate.original,
            candidate.expansion,
            candidate.source
        );
        self.expanded.push(candidate);
        self.expanded.last()
    }

    pub fn expand_all<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for word in words {
            self.expand_abbreviation(word.as_ref());
        }
    }

    /// Whether an expansion passes the configured verification policy.
    pub fn verify(&self, candidate: &AbbreviationCandidate, lexicon: &Lexicon) -> bool {
        match self.verification {
            VerificationPolicy::Bypass => true,
            VerificationPolicy::Lexicon => lexicon.contains(&candidate.expansion),
        }
    }

    /// Write every recorded expansion back into the document.
    ///
    /// Expansions failing verification are still written but are also
    /// reported through [`rejected`](Self::rejected).
    pub fn apply_to(&mut self, document: &mut Document, lexicon: &Lexicon) {
        let mut rejected = Vec::new();
        for candidate in &self.expanded {
            if !self.verify(candidate, lexicon) {
                tracing::warn!(
                    "Expansion not attested in lexicon: {} -> {}",
                    candidate.original,
                    candidate.expansion
                );
                rejected.push(candidate.clone());
            }
            document.replace_word(&candidate.original, &candidate.expansion);
        }
        self.rejected.extend(rejected);
    }

    pub fn expanded(&self) -> &[AbbreviationCandidate] {
        &self.expanded
    }

    pub fn rejected(&self) -> &[AbbreviationCandidate] {
        &self.rejected
    }

    pub fn into_results(self) -> (Vec<AbbreviationCandidate>, Vec<AbbreviationCandidate>) {
        (self.expanded, self.rejected)
    }
}
