//! Processing many documents with independent pipeline runs.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::error::Result;
use crate::pipeline::{Pipeline, PipelineReport};

pub struct BatchOutcome {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub result: Result<PipelineReport>,
}

fn stem_of(input: &Path) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string())
}

/// One distinct output directory per input, in input order:
/// `<output_root>/<file stem>`.
///
/// Inputs sharing a file stem get `_2`, `_3`, ... suffixes so that no two
/// documents write into the same directory.
pub fn output_dirs(inputs: &[PathBuf], output_root: &Path) -> Vec<PathBuf> {
    let mut taken = HashSet::new();
    inputs
        .iter()
        .map(|input| {
            let stem = stem_of(input);
            let mut name = stem.clone();
            let mut n = 1;
            while !taken.insert(name.clone()) {
                n += 1;
                name = format!("{stem}_{n}");
            }
            output_root.join(name)
        })
        .collect()
}

/// Run every input in parallel. A failing document does not stop the others.
pub fn process_batch(
    pipeline: &Pipeline,
    inputs: &[PathBuf],
    output_root: &Path,
) -> Vec<BatchOutcome> {
    let dirs = output_dirs(inputs, output_root);
    inputs
        .par_iter()
        .zip(dirs)
        .map(|(input, output_dir)| {
            let result = pipeline.process_file(input, &output_dir);
            if let Err(e) = &result {
                tracing::error!("Failed to process {}: {}", input.display(), e);
            }
            BatchOutcome {
                input: input.clone(),
                output_dir,
                result,
            }
        })
        .collect()
}
