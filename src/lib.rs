//! Post-processing of handwritten-text-recognition output for medieval Latin.
//!
//! A document passes through three stages, each rewriting the same text:
//! abbreviation expansion ([`abbreviation`]), repair of words split by line
//! breaks ([`segmentation`]) and lexicon-backed normalisation of word forms
//! ([`normalizer`]). [`pipeline::Pipeline`] wires them together.

pub mod abbreviation;
pub mod audit;
pub mod batch;
pub mod config;
pub mod error;
pub mod lexicon;
pub mod normalizer;
pub mod pipeline;
pub mod segmentation;
pub mod text;

#[cfg(feature = "python")]
mod python;

pub use abbreviation::{AbbreviationCandidate, AbbreviationDictionary, AbbreviationResolver};
pub use audit::{AuditSink, CsvAuditWriter, NormalizationRecord};
pub use config::{Loader, PipelineConfig, VerificationPolicy};
pub use error::{Error, Result};
pub use lexicon::{Lexicon, LexiconEntry, PartOfSpeech, SuperLemma};
pub use normalizer::{NormalizationReport, Normalizer, WordOutcome};
pub use pipeline::{Pipeline, PipelineReport, Stage, StageObserver};
pub use segmentation::SegmentationRepairer;
pub use text::Document;
