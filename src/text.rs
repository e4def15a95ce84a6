//! Document text container.
//!
//! Holds the mutable text of one HTR page and the word-boundary-safe
//! substitution shared by abbreviation expansion and normalisation.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use unicode_normalization::UnicodeNormalization;
use whatlang::Lang;

use crate::config::{Replacement, UnicodeForm};
use crate::error::{Error, Result};

/// Full text of one document, mutated in place by each stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    text: String,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Read a document from disk. A missing file is a fatal resource error.
    ///
    /// Line endings are unified to `\n`.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = Error::read_required("input text", path)?;
        Ok(Self::new(normalize_line_endings(&raw)))
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: String) {
        self.text = text;
    }

    pub fn into_text(self) -> String {
        self.text
    }

    /// Write the current text, creating parent directories as needed.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        fs::write(path, &self.text).map_err(|e| Error::io(path, e))
    }

    pub fn normalize_line_endings(&mut self) {
        if self.text.contains('\r') {
            self.text = normalize_line_endings(&self.text);
        }
    }

    pub fn normalize_unicode(&mut self, form: UnicodeForm) {
        match form {
            UnicodeForm::None => {}
            UnicodeForm::Nfc => self.text = self.text.nfc().collect(),
            UnicodeForm::Nfd => self.text = self.text.nfd().collect(),
        }
    }

    /// Remove every occurrence of each listed character sequence.
    pub fn clean<S: AsRef<str>>(&mut self, characters_to_clean: &[S]) {
        for character in characters_to_clean {
            let character = character.as_ref();
            if !character.is_empty() && self.text.contains(character) {
                self.text = self.text.replace(character, "");
            }
        }
    }

    /// Distinct whitespace-delimited tokens, sorted.
    ///
    /// This is a snapshot; recompute it after every stage that edits the text.
    pub fn unique_words(&self) -> BTreeSet<String> {
        unique_words(&self.text)
    }

    /// Replace `original` with `replacement` where it stands as a whole word.
    ///
    /// Returns the number of replaced occurrences.
    pub fn replace_word(&mut self, original: &str, replacement: &str) -> usize {
        let (text, count) = replace_word(&self.text, original, replacement);
        if count > 0 {
            self.text = text;
        }
        count
    }

    /// Apply ordered substring replacements to the whole text.
    pub fn apply_replacements(&mut self, replacements: &[Replacement]) {
        self.text = apply_replacements(&self.text, replacements);
    }

    /// Best-guess language of the text, if whatlang is confident about it.
    pub fn detect_language(&self) -> Option<Lang> {
        whatlang::detect(&self.text)
            .filter(|info| info.is_reliable())
            .map(|info| info.lang())
    }
}

/// Turn `\r\n` and lone `\r` into `\n`.
pub fn normalize_line_endings(text: &str) -> String {
    if !text.contains('\r') {
        return text.to_string();
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}

pub fn unique_words(text: &str) -> BTreeSet<String> {
    text.split_whitespace().map(str::to_string).collect()
}

/// Ordered replace-all of each `(from, to)` pair.
pub fn apply_replacements(text: &str, replacements: &[Replacement]) -> String {
    let mut result = text.to_string();
    for (from, to) in replacements {
        if !from.is_empty() && result.contains(from.as_str()) {
            result = result.replace(from.as_str(), to);
        }
    }
    result
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Boundary {
    Space,
    Line,
    /// Start or end of the text; stands in for either a space or a newline.
    Edge,
    Other,
}

impl Boundary {
    fn of(c: Option<char>) -> Self {
        match c {
            Some(' ') => Boundary::Space,
            Some('\n') => Boundary::Line,
            None => Boundary::Edge,
            Some(_) => Boundary::Other,
        }
    }

    fn is_space(self) -> bool {
        matches!(self, Boundary::Space | Boundary::Edge)
    }

    fn is_line(self) -> bool {
        matches!(self, Boundary::Line | Boundary::Edge)
    }
}

/// Boundary-safe replace over a string slice.
///
/// An occurrence qualifies when it is framed space/space, newline/space or
/// space/newline. Anything else, including a word alone between two line
/// breaks, is left as it is.
pub fn replace_word(text: &str, original: &str, replacement: &str) -> (String, usize) {
    if original.is_empty() || !text.contains(original) {
        return (text.to_string(), 0);
    }

    let mut result = String::with_capacity(text.len());
    let mut last = 0;
    let mut count = 0;

    for (start, matched) in text.match_indices(original) {
        let end = start + matched.len();
        let before = Boundary::of(text[..start].chars().next_back());
        let after = Boundary::of(text[end..].chars().next());

        let bounded = (before.is_space() && after.is_space())
            || (before.is_line() && after.is_space())
            || (before.is_space() && after.is_line());
        if !bounded {
            continue;
        }

        result.push_str(&text[last..start]);
        result.push_str(replacement);
        last = end;
        count += 1;
    }

    result.push_str(&text[last..]);
    (result, count)
}
