//! Lexicon-backed morphological normalisation.
//!
//! Every word attested in the lexicon has the stem of its lemma replaced by
//! the stem of its super-lemma, so that spelling variants collapse onto one
//! canonical form (`dampnabitur` with lemma `dampno` and super-lemma
//! `damno@V` becomes `damnabitur`). Stems are obtained by stripping an
//! inflectional ending whose size depends on the part of speech.

use crate::audit::{AuditSink, NormalizationRecord};
use crate::config::PipelineConfig;
use crate::lexicon::{Lexicon, PartOfSpeech, SuperLemma};
use crate::text::{self, Document};

/// Result of normalising a single token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WordOutcome {
    Normalized(NormalizationRecord),
    /// Not in the lexicon.
    NotFound,
    /// Super-lemma is on the stopword list.
    Stopword,
    /// Super-lemma base and lemma end in different characters.
    Mismatch { lemma: String, super_lemma: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LemmaMismatch {
    pub word: String,
    pub lemma: String,
    pub super_lemma: String,
}

#[derive(Debug, Clone, Default)]
pub struct NormalizationReport {
    pub records: Vec<NormalizationRecord>,
    pub not_found: Vec<String>,
    pub mismatches: Vec<LemmaMismatch>,
    pub stopwords: Vec<String>,
}

pub struct Normalizer<'a> {
    lexicon: &'a Lexicon,
    config: &'a PipelineConfig,
}

impl<'a> Normalizer<'a> {
    pub fn new(lexicon: &'a Lexicon, config: &'a PipelineConfig) -> Self {
        Self { lexicon, config }
    }

    /// Strip the inflectional ending from super-lemma base and lemma.
    ///
    /// Returns `(super_lemma_root, lemma_root)`. The character count is
    /// decided on the super-lemma base and applied to both.
    pub fn strip_root(&self, super_lemma: &SuperLemma, lemma: &str) -> (String, String) {
        let base = super_lemma.base.as_str();
        match super_lemma.pos {
            PartOfSpeech::Verb => {
                let n = if base.ends_with("or") {
                    2
                } else if base.ends_with("sco") {
                    3
                } else {
                    1
                };
                (drop_last_chars(base, n), drop_last_chars(lemma, n))
            }
            PartOfSpeech::Adverb => (base.to_string(), lemma.to_string()),
            PartOfSpeech::Pronoun => {
                let n = if base.ends_with("er") { 2 } else { 1 };
                (drop_last_chars(base, n), drop_last_chars(lemma, n))
            }
            _ => match self
                .config
                .noun_endings
                .iter()
                .find(|ending| !ending.is_empty() && base.ends_with(ending.as_str()))
            {
                Some(ending) => {
                    let n = ending.chars().count();
                    (drop_last_chars(base, n), drop_last_chars(lemma, n))
                }
                None => (base.to_string(), lemma.to_string()),
            },
        }
    }

    /// Compute the normalised form of one token without touching any text.
    pub fn normalize_word(&self, word: &str) -> WordOutcome {
        let Some(entry) = self.lexicon.get(word) else {
            return WordOutcome::NotFound;
        };
        let super_lemma = &entry.super_lemma;
        let lemma = entry.lemma.as_str();

        if self.config.stopwords.contains(&super_lemma.to_string()) {
            return WordOutcome::Stopword;
        }
        if super_lemma.base.chars().next_back() != lemma.chars().next_back() {
            return WordOutcome::Mismatch {
                lemma: lemma.to_string(),
                super_lemma: super_lemma.to_string(),
            };
        }

        let (super_root, lemma_root) = self.strip_root(super_lemma, lemma);

        let (super_sub, lemma_sub) = if word.chars().next().is_some_and(char::is_uppercase) {
            (capitalize(&super_root), capitalize(&lemma_root))
        } else {
            (super_root.clone(), lemma_root.clone())
        };

        // First occurrence only; the lemma stem is expected once in the word.
        let mut normalized = if lemma_sub.is_empty() {
            word.to_string()
        } else {
            word.replacen(&lemma_sub, &super_sub, 1)
        };

        if super_lemma.pos == PartOfSpeech::Verb {
            let ending = normalized.replacen(&super_sub, "", 1);
            tracing::trace!("Verb ending of {}: {}", normalized, ending);
            normalized =
                text::apply_replacements(&normalized, &self.config.verb_endings_to_normalise);
        }

        WordOutcome::Normalized(NormalizationRecord {
            word: word.to_string(),
            super_lemma: super_lemma.to_string(),
            lemma: lemma.to_string(),
            super_lemma_root: super_root,
            lemma_root,
            part_of_speech: super_lemma.pos.tag().to_string(),
            normalized,
        })
    }

    /// Normalise every distinct word of the document in place.
    ///
    /// Character canonicalisation runs over the whole text after each
    /// normalised or unknown word and once more at the end.
    pub fn normalize(
        &self,
        document: &mut Document,
        audit: &mut dyn AuditSink,
    ) -> NormalizationReport {
        let canonical = &self.config.characters_to_normalise;
        let mut report = NormalizationReport::default();

        for word in document.unique_words() {
            match self.normalize_word(&word) {
                WordOutcome::Normalized(record) => {
                    tracing::debug!("Normalised {} -> {}", record.word, record.normalized);
                    document.replace_word(&record.word, &record.normalized);
                    if let Err(e) = audit.record(&record) {
                        tracing::warn!("Failed to write audit record for {}: {}", word, e);
                    }
                    report.records.push(record);
                }
                WordOutcome::NotFound => {
                    tracing::debug!("Not in lexicon: {}", word);
                    report.not_found.push(word);
                }
                WordOutcome::Stopword => {
                    report.stopwords.push(word);
                    continue;
                }
                WordOutcome::Mismatch { lemma, super_lemma } => {
                    tracing::warn!(
                        "Lemma/super-lemma mismatch for {}: {} {}",
                        word,
                        super_lemma,
                        lemma
                    );
                    report.mismatches.push(LemmaMismatch {
                        word,
                        lemma,
                        super_lemma,
                    });
                    continue;
                }
            }
            document.apply_replacements(canonical);
        }

        document.apply_replacements(canonical);
        if let Err(e) = audit.flush() {
            tracing::warn!("Failed to flush audit trail: {}", e);
        }

        tracing::info!(
            "Normalisation: {} normalised, {} not in lexicon, {} mismatches, {} stopwords",
            report.records.len(),
            report.not_found.len(),
            report.mismatches.len(),
            report.stopwords.len()
        );
        report
    }
}

fn drop_last_chars(s: &str, n: usize) -> String {
    let keep = s.chars().count().saturating_sub(n);
    s.chars().take(keep).collect()
}

/// Uppercase the first character and lowercase the rest.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_defaults;
    use crate::lexicon::LexiconEntry;

    fn lexicon(rows: &[(&str, &str, &str)]) -> Lexicon {
        Lexicon::from_entries(
            rows.iter()
                .map(|(surface, lemma, sl)| LexiconEntry::new(surface, lemma, sl)),
        )
    }

    fn roots(super_lemma: &str, lemma: &str) -> (String, String) {
        let config = load_defaults().unwrap();
        let lexicon = Lexicon::new();
        Normalizer::new(&lexicon, &config).strip_root(&SuperLemma::parse(super_lemma), lemma)
    }

    #[test]
    fn test_verb_roots() {
        assert_eq!(roots("amor@V", "amor").0, "am");
        assert_eq!(roots("cresco@V", "cresco").0, "cre");
        assert_eq!(roots("amo@V", "amo").0, "am");
        assert_eq!(roots("damno@V", "dampno"), ("damn".to_string(), "dampn".to_string()));
    }

    #[test]
    fn test_adverb_keeps_base() {
        assert_eq!(roots("bene@ADV", "bene"), ("bene".to_string(), "bene".to_string()));
    }

    #[test]
    fn test_pronoun_roots() {
        assert_eq!(roots("noster@PRO", "noster").0, "nost");
        assert_eq!(roots("ille@PRO", "ille").0, "ill");
    }

    #[test]
    fn test_noun_strips_first_matching_ending_only() {
        assert_eq!(roots("dominus@NN", "dominus").0, "domin");
        assert_eq!(roots("templum@NN", "templum").0, "templ");
        assert_eq!(roots("gratia@NN", "gracia"), ("grati".to_string(), "graci".to_string()));
        assert_eq!(roots("rex@NN", "rex").0, "rex");
    }

    #[test]
    fn test_stripping_saturates_on_short_words() {
        assert_eq!(roots("or@V", "o"), (String::new(), String::new()));
    }

    #[test]
    fn test_lemma_substitution() {
        let config = load_defaults().unwrap();
        let lexicon = lexicon(&[("dampnabitur", "dampno", "damno@V")]);
        let normalizer = Normalizer::new(&lexicon, &config);
        match normalizer.normalize_word("dampnabitur") {
            WordOutcome::Normalized(record) => {
                assert_eq!(record.normalized, "damnabitur");
                assert_eq!(record.super_lemma_root, "damn");
                assert_eq!(record.lemma_root, "dampn");
                assert_eq!(record.part_of_speech, "V");
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_capitalisation_is_propagated() {
        let config = load_defaults().unwrap();
        let lexicon = lexicon(&[("damno", "damno", "dampno@V")]);
        let normalizer = Normalizer::new(&lexicon, &config);
        match normalizer.normalize_word("Damno") {
            WordOutcome::Normalized(record) => assert_eq!(record.normalized, "Dampno"),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_stopword_and_mismatch_are_skipped() {
        let config = load_defaults().unwrap();
        let lexicon = lexicon(&[("alea", "alea", "alea@NN"), ("eius", "is", "ea@PRO")]);
        let normalizer = Normalizer::new(&lexicon, &config);
        assert_eq!(normalizer.normalize_word("alea"), WordOutcome::Stopword);
        assert!(matches!(
            normalizer.normalize_word("eius"),
            WordOutcome::Mismatch { .. }
        ));
        assert_eq!(normalizer.normalize_word("xyz"), WordOutcome::NotFound);
    }

    #[test]
    fn test_normalize_document() {
        let config = load_defaults().unwrap();
        let lexicon = lexicon(&[
            ("dampnabitur", "dampno", "damno@V"),
            ("alea", "alea", "alea@NN"),
        ]);
        let mut document = Document::new("qui dampnabitur ſed\nalea dampnabitur est");
        let mut audit: Vec<NormalizationRecord> = Vec::new();
        let report = Normalizer::new(&lexicon, &config).normalize(&mut document, &mut audit);

        assert_eq!(document.text(), "qui damnabitur sed\nalea damnabitur est");
        assert_eq!(audit.len(), 1);
        assert_eq!(report.stopwords, ["alea"]);
        assert_eq!(report.not_found, ["est", "qui", "ſed"]);
    }
}
