//! Online access to the Frankfurt Latin Lexicon.
//!
//! The service answers one word per request, e.g.
//!
//! ```text
//! {"draw":null,"recordsTotal":9642318,"recordsFiltered":1,
//!  "data":[["<a href=\"...\">damno@V</a>","<a href=\"...\">dampno</a>",
//!           "dampnabitur","V","","","SINGULAR","PERSON_3","FUTURE",...]]}
//! ```
//!
//! Only the first row is used. A failed request never aborts a batch; the
//! word is reported and left out of the resulting lexicon.

use std::time::Duration;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

use super::{Lexicon, LexiconEntry};
use crate::config::OnlineConfig;
use crate::error::{Error, Result};

lazy_static! {
    static ref HTML_TAG: Regex = Regex::new(r"<[^>]*>").unwrap();
}

#[derive(Debug, Deserialize)]
struct FllResponse {
    #[serde(default)]
    data: Vec<Vec<serde_json::Value>>,
}

/// Source of lexicon entries queried one word at a time.
pub trait LexiconClient {
    /// `Ok(None)` means the service answered but does not know the word.
    fn query(&self, word: &str) -> Result<Option<LexiconEntry>>;

    /// Query every word, returning one outcome per word in input order.
    fn query_batch(&self, words: &[String]) -> Vec<(String, Result<Option<LexiconEntry>>)> {
        words
            .iter()
            .map(|word| (word.clone(), self.query(word)))
            .collect()
    }
}

/// Blocking HTTP client for the FLL word-form endpoint.
pub struct FllClient {
    client: reqwest::blocking::Client,
    base_url: String,
    query_param: String,
}

impl FllClient {
    pub fn new(config: &OnlineConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.url.clone(),
            query_param: config.query_param.clone(),
        })
    }

    /// Endpoint URL searching for `word`, with the word percent-encoded.
    pub fn request_url(&self, word: &str) -> Result<reqwest::Url> {
        reqwest::Url::parse_with_params(&self.base_url, [(self.query_param.as_str(), word)])
            .map_err(|e| Error::Query {
                word: word.to_string(),
                reason: format!("invalid lexicon URL {}: {}", self.base_url, e),
            })
    }
}

impl LexiconClient for FllClient {
    fn query(&self, word: &str) -> Result<Option<LexiconEntry>> {
        let url = self.request_url(word)?;
        let query_error = |e: reqwest::Error| Error::Query {
            word: word.to_string(),
            reason: e.to_string(),
        };
        let body = self
            .client
            .get(url)
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.text())
            .map_err(query_error)?;
        parse_response(word, &body)
    }
}

fn cell_text(row: &[serde_json::Value], index: usize) -> Option<String> {
    let raw = row.get(index)?.as_str()?;
    Some(HTML_TAG.replace_all(raw, "").trim().to_string())
}

/// Parse a raw service response into the entry of its first row.
pub fn parse_response(word: &str, body: &str) -> Result<Option<LexiconEntry>> {
    let response: FllResponse = serde_json::from_str(body)
        .map_err(|e| Error::json(format!("lexicon response for '{word}'"), e))?;

    let Some(row) = response.data.first() else {
        return Ok(None);
    };

    let shape_error = || Error::Query {
        word: word.to_string(),
        reason: format!("unexpected row shape: {} columns", row.len()),
    };
    let super_lemma = cell_text(row, 0).ok_or_else(shape_error)?;
    let lemma = cell_text(row, 1).ok_or_else(shape_error)?;
    let surface_form = cell_text(row, 2).ok_or_else(shape_error)?;

    Ok(Some(LexiconEntry::new(&surface_form, &lemma, &super_lemma)))
}

/// Build a lexicon from online lookups of `words`.
///
/// Returns the lexicon together with the words whose query failed.
pub fn build_lexicon<C: LexiconClient + ?Sized>(
    client: &C,
    words: &[String],
) -> (Lexicon, Vec<(String, Error)>) {
    let mut lexicon = Lexicon::new();
    let mut failures = Vec::new();

    for (word, outcome) in client.query_batch(words) {
        match outcome {
            Ok(Some(entry)) => {
                lexicon.insert(entry);
            }
            Ok(None) => tracing::debug!("'{}' not found online", word),
            Err(e) => {
                tracing::warn!("Lexicon query failed: {}", e);
                failures.push((word, e));
            }
        }
    }

    tracing::info!(
        "Online lexicon: {} of {} words found, {} failed",
        lexicon.len(),
        words.len(),
        failures.len()
    );
    (lexicon, failures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::PartOfSpeech;
    use std::collections::HashMap;

    const DAMPNABITUR: &str = r#"{"draw":null,"recordsTotal":9642318,"data":[["<a href=\"https://lta.bbaw.de/lexicon/fll/wf?sl=4683867\" title=\"4684631\">damno@V</a>","<a href=\"https://lta.bbaw.de/lexicon/fll/wf?l=4684305\">dampno</a>","dampnabitur","V","","","SINGULAR","PERSON_3","FUTURE","INDICATIVE","PASSIVE"]],"recordsFiltered":1}"#;

    struct FakeClient {
        answers: HashMap<&'static str, &'static str>,
    }

    impl LexiconClient for FakeClient {
        fn query(&self, word: &str) -> Result<Option<LexiconEntry>> {
            match self.answers.get(word) {
                Some(body) => parse_response(word, body),
                None => Err(Error::Query {
                    word: word.to_string(),
                    reason: "connection reset".to_string(),
                }),
            }
        }
    }

    #[test]
    fn test_request_url_encodes_the_word() {
        let config = OnlineConfig {
            url: "https://lta.bbaw.de/lexicon/fll/process/wf".to_string(),
            query_param: "columns[2][search][value]".to_string(),
            timeout_secs: 1,
        };
        let client = FllClient::new(&config).unwrap();
        for word in ["et&cetera", "ab#c", "a+b", "dn\u{304}s"] {
            let url = client.request_url(word).unwrap();
            assert_eq!(url.fragment(), None);
            let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
            assert_eq!(
                pairs,
                [("columns[2][search][value]".to_string(), word.to_string())]
            );
        }
    }

    #[test]
    fn test_parse_response_strips_markup() {
        let entry = parse_response("dampnabitur", DAMPNABITUR).unwrap().unwrap();
        assert_eq!(entry.surface_form, "dampnabitur");
        assert_eq!(entry.lemma, "dampno");
        assert_eq!(entry.super_lemma.base, "damno");
        assert_eq!(entry.super_lemma.pos, PartOfSpeech::Verb);
    }

    #[test]
    fn test_parse_response_without_rows() {
        let body = r#"{"draw":null,"recordsTotal":0,"data":[],"recordsFiltered":0}"#;
        assert!(parse_response("xyz", body).unwrap().is_none());
    }

    #[test]
    fn test_parse_response_short_row_is_an_error() {
        let body = r#"{"data":[["damno@V"]]}"#;
        assert!(parse_response("x", body).is_err());
    }

    #[test]
    fn test_batch_continues_past_failures() {
        let client = FakeClient {
            answers: HashMap::from([
                ("dampnabitur", DAMPNABITUR),
                ("xyz", r#"{"data":[]}"#),
            ]),
        };
        let words = vec![
            "dampnabitur".to_string(),
            "offline".to_string(),
            "xyz".to_string(),
        ];
        let (lexicon, failures) = build_lexicon(&client, &words);
        assert_eq!(lexicon.len(), 1);
        assert!(lexicon.contains("dampnabitur"));
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, "offline");
    }
}
