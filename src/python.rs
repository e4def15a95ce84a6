//! Python extension module.
//!
//! Resources are loaded once with `init_pipeline` and reused by every call.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use pyo3::exceptions::{PyIOError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use crate::abbreviation::AbbreviationDictionary;
use crate::audit::NormalizationRecord;
use crate::batch;
use crate::config::Loader;
use crate::error::Error;
use crate::lexicon::Lexicon;
use crate::pipeline::{NoopObserver, Pipeline};
use crate::text::Document;

/// Global pipeline instance (loaded once, reused)
static PIPELINE: OnceLock<Pipeline> = OnceLock::new();

fn to_py_err(e: Error) -> PyErr {
    match e {
        Error::MissingResource { .. } | Error::Io { .. } => PyIOError::new_err(e.to_string()),
        _ => PyValueError::new_err(e.to_string()),
    }
}

fn pipeline() -> PyResult<&'static Pipeline> {
    PIPELINE
        .get()
        .ok_or_else(|| {
            PyRuntimeError::new_err("pipeline not initialised, call init_pipeline first")
        })
}

/// Load lexicon, abbreviation dictionary and configuration.
/// Returns False if a pipeline was already initialised.
#[pyfunction]
#[pyo3(signature = (lexicon_path, dictionary_path, config_path=None))]
fn init_pipeline(
    lexicon_path: String,
    dictionary_path: String,
    config_path: Option<String>,
) -> PyResult<bool> {
    let mut loader = Loader::new();
    if let Some(path) = config_path {
        loader = loader.with_file(path);
    }
    let config = loader.build().map_err(to_py_err)?;
    let dictionary =
        AbbreviationDictionary::from_path(Path::new(&dictionary_path)).map_err(to_py_err)?;
    let lexicon = Lexicon::from_tsv_path(Path::new(&lexicon_path)).map_err(to_py_err)?;

    Ok(PIPELINE.set(Pipeline::new(config, dictionary, lexicon)).is_ok())
}

/// Run all stages over a string.
/// Returns: (normalised_text, words_not_in_lexicon)
#[pyfunction]
fn postprocess_text(text: String) -> PyResult<(String, Vec<String>)> {
    let pipeline = pipeline()?;
    let mut document = Document::new(text);
    let mut audit: Vec<NormalizationRecord> = Vec::new();
    let report = pipeline
        .run(&mut document, &mut NoopObserver, &mut audit)
        .map_err(to_py_err)?;
    Ok((document.into_text(), report.normalization.not_found))
}

/// Process a single file, writing snapshots and audit trail to output_dir.
/// Returns: (expansions, repairs, normalised_words, words_not_in_lexicon)
#[pyfunction]
fn postprocess_file(
    input_path: String,
    output_dir: String,
) -> PyResult<(usize, usize, usize, Vec<String>)> {
    let report = pipeline()?
        .process_file(Path::new(&input_path), Path::new(&output_dir))
        .map_err(to_py_err)?;
    Ok((
        report.expansions.len(),
        report.repairs.len(),
        report.normalization.records.len(),
        report.normalization.not_found,
    ))
}

/// Batch process files into one sub-directory per input.
/// Returns: (processed_count, HashMap<input_path, error_message>)
#[pyfunction]
fn postprocess_batch(
    input_paths: Vec<String>,
    output_root: String,
) -> PyResult<(u64, HashMap<String, String>)> {
    let inputs: Vec<PathBuf> = input_paths.into_iter().map(PathBuf::from).collect();
    let outcomes = batch::process_batch(pipeline()?, &inputs, Path::new(&output_root));

    let mut processed = 0;
    let mut failures = HashMap::new();
    for outcome in outcomes {
        match outcome.result {
            Ok(_) => processed += 1,
            Err(e) => {
                failures.insert(outcome.input.display().to_string(), e.to_string());
            }
        }
    }
    Ok((processed, failures))
}

#[pymodule]
fn htr_postprocess(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(init_pipeline, m)?)?;
    m.add_function(wrap_pyfunction!(postprocess_text, m)?)?;
    m.add_function(wrap_pyfunction!(postprocess_file, m)?)?;
    m.add_function(wrap_pyfunction!(postprocess_batch, m)?)?;
    Ok(())
}
