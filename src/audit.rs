//! Append-only audit trail of normalised words.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::error::{Error, Result};

/// Intermediate and final forms of one normalised word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizationRecord {
    pub word: String,
    pub super_lemma: String,
    pub lemma: String,
    pub super_lemma_root: String,
    pub lemma_root: String,
    pub part_of_speech: String,
    pub normalized: String,
}

/// Destination for normalisation records. Never read back by the pipeline.
pub trait AuditSink {
    fn record(&mut self, record: &NormalizationRecord) -> Result<()>;

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

impl AuditSink for Vec<NormalizationRecord> {
    fn record(&mut self, record: &NormalizationRecord) -> Result<()> {
        self.push(record.clone());
        Ok(())
    }
}

/// Writes records as CSV rows.
pub struct CsvAuditWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvAuditWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(inner),
        }
    }

    fn without_header(inner: W) -> Self {
        Self {
            writer: csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(inner),
        }
    }
}

impl CsvAuditWriter<std::fs::File> {
    /// Open `path` for appending. The header row is written only into a new
    /// or empty file.
    pub fn append_to_path(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| Error::io(path, e))?;
        let is_empty = file.metadata().map_err(|e| Error::io(path, e))?.len() == 0;
        Ok(if is_empty {
            Self::new(file)
        } else {
            Self::without_header(file)
        })
    }
}

impl<W: Write> AuditSink for CsvAuditWriter<W> {
    fn record(&mut self, record: &NormalizationRecord) -> Result<()> {
        self.writer.serialize(record)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| Error::Csv(csv::Error::from(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(word: &str) -> NormalizationRecord {
        NormalizationRecord {
            word: word.to_string(),
            super_lemma: "damno@V".to_string(),
            lemma: "dampno".to_string(),
            super_lemma_root: "damn".to_string(),
            lemma_root: "dampn".to_string(),
            part_of_speech: "V".to_string(),
            normalized: "damnabitur".to_string(),
        }
    }

    #[test]
    fn test_append_writes_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("normalized_words.csv");

        for word in ["dampnabitur", "Dampnabitur"] {
            let mut writer = CsvAuditWriter::append_to_path(&path).unwrap();
            writer.record(&record(word)).unwrap();
            writer.flush().unwrap();
        }

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "word,super_lemma,lemma,super_lemma_root,lemma_root,part_of_speech,normalized"
        );
        assert_eq!(lines[2], "Dampnabitur,damno@V,dampno,damn,dampn,V,damnabitur");
    }
}
