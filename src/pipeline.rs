//! Stage orchestration for one document.
//!
//! Order matters: expansions are written back before segmentation repair,
//! and normalisation looks up the words produced by both earlier stages.
//! After every stage the current text is handed to a [`StageObserver`].

use std::fs;
use std::path::{Path, PathBuf};

use whatlang::Lang;

use crate::abbreviation::{AbbreviationCandidate, AbbreviationDictionary, AbbreviationResolver};
use crate::audit::{AuditSink, CsvAuditWriter};
use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::lexicon::Lexicon;
use crate::normalizer::{NormalizationReport, Normalizer};
use crate::segmentation::{SegmentationRepair, SegmentationRepairer};
use crate::text::Document;

pub const AUDIT_FILE: &str = "normalized_words.csv";
pub const NORMALIZATION_ERRORS_FILE: &str = "normalisation_errors.txt";
pub const EXPANSION_ERRORS_FILE: &str = "expansion_errors.tsv";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Expansion,
    Segmentation,
    Normalization,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Expansion, Stage::Segmentation, Stage::Normalization];

    /// File name of the snapshot written after this stage.
    pub fn file_name(self) -> &'static str {
        match self {
            Stage::Expansion => "01_text_after_expansion.txt",
            Stage::Segmentation => "02_text_after_segmentation.txt",
            Stage::Normalization => "03_text_after_normalisation.txt",
        }
    }
}

/// Receives the document text at each stage boundary.
pub trait StageObserver {
    fn on_stage(&mut self, stage: Stage, document: &Document) -> Result<()>;
}

pub struct NoopObserver;

impl StageObserver for NoopObserver {
    fn on_stage(&mut self, _stage: Stage, _document: &Document) -> Result<()> {
        Ok(())
    }
}

/// Keeps every snapshot in memory.
#[derive(Debug, Default)]
pub struct SnapshotCollector {
    pub snapshots: Vec<(Stage, String)>,
}

impl StageObserver for SnapshotCollector {
    fn on_stage(&mut self, stage: Stage, document: &Document) -> Result<()> {
        self.snapshots.push((stage, document.text().to_string()));
        Ok(())
    }
}

/// Persists each snapshot under a fixed file name in `dir`.
pub struct SnapshotWriter {
    dir: PathBuf,
}

impl SnapshotWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl StageObserver for SnapshotWriter {
    fn on_stage(&mut self, stage: Stage, document: &Document) -> Result<()> {
        let path = self.dir.join(stage.file_name());
        tracing::debug!("Writing {}", path.display());
        document.write_to(&path)
    }
}

#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    pub expansions: Vec<AbbreviationCandidate>,
    pub rejected_expansions: Vec<AbbreviationCandidate>,
    pub repairs: Vec<SegmentationRepair>,
    pub normalization: NormalizationReport,
    pub language: Option<Lang>,
}

impl PipelineReport {
    /// Write the lookup misses and rejected expansions next to the snapshots.
    pub fn write_side_lists(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;

        let misses = self.normalization.not_found.join("\n");
        let path = dir.join(NORMALIZATION_ERRORS_FILE);
        fs::write(&path, misses).map_err(|e| Error::io(&path, e))?;

        let rejected: Vec<String> = self
            .rejected_expansions
            .iter()
            .map(|c| format!("{}\t{}", c.original, c.expansion))
            .collect();
        let path = dir.join(EXPANSION_ERRORS_FILE);
        fs::write(&path, rejected.join("\n")).map_err(|e| Error::io(&path, e))
    }
}

/// Read-only resources shared by every run.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    dictionary: AbbreviationDictionary,
    lexicon: Lexicon,
}

impl Pipeline {
    pub fn new(
        config: PipelineConfig,
        dictionary: AbbreviationDictionary,
        lexicon: Lexicon,
    ) -> Self {
        Self {
            config,
            dictionary,
            lexicon,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Clean the raw text: line endings, unicode form, deletion list,
    /// language check.
    pub fn prepare(&self, document: &mut Document) -> Option<Lang> {
        document.normalize_line_endings();
        document.normalize_unicode(self.config.unicode_form);
        document.clean(&self.config.characters_to_clean);

        if !self.config.language_check {
            return None;
        }
        let language = document.detect_language();
        if let Some(lang) = language.filter(|lang| *lang != Lang::Lat) {
            tracing::warn!("Document does not look like Latin (detected {})", lang.eng_name());
        }
        language
    }

    pub fn run(
        &self,
        document: &mut Document,
        observer: &mut dyn StageObserver,
        audit: &mut dyn AuditSink,
    ) -> Result<PipelineReport> {
        let language = self.prepare(document);

        let mut resolver = AbbreviationResolver::new(&self.config, &self.dictionary);
        resolver.expand_all(document.unique_words());
        resolver.apply_to(document, &self.lexicon);
        let (expansions, rejected_expansions) = resolver.into_results();
        tracing::info!(
            "Expansion: {} abbreviations expanded, {} not attested",
            expansions.len(),
            rejected_expansions.len()
        );
        observer.on_stage(Stage::Expansion, document)?;

        let (text, repairs) = SegmentationRepairer::new(&self.lexicon).repair(document.text());
        document.set_text(text);
        observer.on_stage(Stage::Segmentation, document)?;

        let normalization = Normalizer::new(&self.lexicon, &self.config).normalize(document, audit);
        observer.on_stage(Stage::Normalization, document)?;

        Ok(PipelineReport {
            expansions,
            rejected_expansions,
            repairs,
            normalization,
            language,
        })
    }

    /// Process one text file, writing snapshots, audit CSV and side lists
    /// into `output_dir`.
    pub fn process_file(&self, input: &Path, output_dir: &Path) -> Result<PipelineReport> {
        let mut document = Document::from_path(input)?;
        let mut snapshots = SnapshotWriter::new(output_dir);
        let mut audit = CsvAuditWriter::append_to_path(&output_dir.join(AUDIT_FILE))?;

        tracing::info!("Processing {}", input.display());
        let report = self.run(&mut document, &mut snapshots, &mut audit)?;
        report.write_side_lists(output_dir)?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_defaults;
    use crate::lexicon::LexiconEntry;

    fn pipeline() -> Pipeline {
        let lexicon = Lexicon::from_entries([
            LexiconEntry::new("dominus", "dominus", "dominus@NN"),
            LexiconEntry::new("regnum", "regnum", "regnum@NN"),
            LexiconEntry::new("dampnabitur", "dampno", "damno@V"),
        ]);
        let dictionary: AbbreviationDictionary =
            [("dn\u{304}s".to_string(), "dominus".to_string())].into_iter().collect();
        Pipeline::new(load_defaults().unwrap(), dictionary, lexicon)
    }

    #[test]
    fn test_stage_order_and_snapshots() {
        let pipeline = pipeline();
        let mut document = Document::new("ait dn\u{304}s. reg\nnum dampnabitur ſed");
        let mut observer = SnapshotCollector::default();
        let mut audit: Vec<crate::audit::NormalizationRecord> = Vec::new();

        let report = pipeline.run(&mut document, &mut observer, &mut audit).unwrap();

        let stages: Vec<Stage> = observer.snapshots.iter().map(|(s, _)| *s).collect();
        assert_eq!(stages, Stage::ALL);
        assert_eq!(observer.snapshots[0].1, "ait dominus reg\nnum dampnabitur ſed");
        assert_eq!(observer.snapshots[1].1, "ait dominus regnum dampnabitur ſed");
        assert_eq!(document.text(), "ait dominus regnum damnabitur sed");
        assert_eq!(report.expansions.len(), 1);
        assert_eq!(report.repairs.len(), 1);
        assert_eq!(audit.len(), 3);
    }
}
