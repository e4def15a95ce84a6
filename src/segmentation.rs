//! Repair of words split across a line break.

use lazy_static::lazy_static;
use regex::Regex;

use crate::lexicon::Lexicon;

lazy_static! {
    // word characters, one newline, word characters
    static ref LINEBREAK_PATTERN: Regex = Regex::new(r"(?m)\b\w+\n\w+\b").unwrap();
}

/// A line break that was removed because the joined word is attested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentationRepair {
    pub original: String,
    pub merged: String,
}

pub struct SegmentationRepairer<'a> {
    lexicon: &'a Lexicon,
}

impl<'a> SegmentationRepairer<'a> {
    pub fn new(lexicon: &'a Lexicon) -> Self {
        Self { lexicon }
    }

    /// Join `word\nword` pairs whose concatenation is in the lexicon.
    ///
    /// Matches are collected once over the input; each accepted match then
    /// replaces every literal occurrence in the evolving text.
    pub fn repair(&self, text: &str) -> (String, Vec<SegmentationRepair>) {
        let instances: Vec<&str> = LINEBREAK_PATTERN
            .find_iter(text)
            .map(|m| m.as_str())
            .collect();

        let mut result = text.to_string();
        let mut repairs = Vec::new();

        for instance in instances {
            let merged = instance.replace('\n', "");
            if !self.lexicon.contains(&merged) {
                continue;
            }
            tracing::debug!("Joining {:?} -> {}", instance, merged);
            result = result.replace(instance, &merged);
            repairs.push(SegmentationRepair {
                original: instance.to_string(),
                merged,
            });
        }

        tracing::info!("Segmentation: {} line breaks repaired", repairs.len());
        (result, repairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::LexiconEntry;

    fn lexicon(words: &[&str]) -> Lexicon {
        Lexicon::from_entries(
            words
                .iter()
                .map(|w| LexiconEntry::new(w, w, &format!("{w}@NN"))),
        )
    }

    #[test]
    fn test_attested_merge() {
        let lexicon = lexicon(&["regnum"]);
        let (text, repairs) = SegmentationRepairer::new(&lexicon).repair("reg\nnum");
        assert_eq!(text, "regnum");
        assert_eq!(repairs.len(), 1);
    }

    #[test]
    fn test_unattested_merge_is_left_alone() {
        let lexicon = lexicon(&["alia"]);
        let (text, repairs) = SegmentationRepairer::new(&lexicon).repair("reg\nnum");
        assert_eq!(text, "reg\nnum");
        assert!(repairs.is_empty());
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let lexicon = lexicon(&["regnum"]);
        let (text, _) = SegmentationRepairer::new(&lexicon).repair("in Reg\nnum dei");
        assert_eq!(text, "in Regnum dei");
    }

    #[test]
    fn test_every_occurrence_is_replaced() {
        let lexicon = lexicon(&["regnum"]);
        let (text, repairs) =
            SegmentationRepairer::new(&lexicon).repair("a reg\nnum b\nc reg\nnum d");
        assert_eq!(text, "a regnum b\nc regnum d");
        // Both matches are accepted; the second finds nothing left to replace.
        assert_eq!(repairs.len(), 2);
    }

    #[test]
    fn test_blank_line_is_not_a_split() {
        let lexicon = lexicon(&["regnum"]);
        let (text, _) = SegmentationRepairer::new(&lexicon).repair("reg\n\nnum");
        assert_eq!(text, "reg\n\nnum");
    }
}
