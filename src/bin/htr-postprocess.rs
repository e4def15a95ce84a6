use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use htr_postprocess::abbreviation::AbbreviationDictionary;
use htr_postprocess::batch;
use htr_postprocess::config::{Loader, PipelineConfig};
use htr_postprocess::lexicon::Lexicon;
use htr_postprocess::lexicon::online::{self, FllClient};
use htr_postprocess::pipeline::Pipeline;
use htr_postprocess::text::Document;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Verification {
    Bypass,
    Lexicon,
}

/// Expand abbreviations, repair line breaks and normalise Latin HTR output.
#[derive(Debug, Parser)]
#[command(name = "htr-postprocess", version)]
struct Args {
    /// Plain text files exported from HTR
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// JSON object mapping abbreviations to expansions
    #[arg(long)]
    dictionary: PathBuf,

    /// Frankfurt Latin Lexicon TSV export
    #[arg(long, required_unless_present = "online", conflicts_with = "online")]
    lexicon: Option<PathBuf>,

    /// Build the lexicon by querying the online FLL for every word
    #[arg(long)]
    online: bool,

    /// JSON cache for online lookups; reused when it exists
    #[arg(long, requires = "online")]
    lexicon_cache: Option<PathBuf>,

    /// Configuration file layered over the built-in defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the expansion verification policy
    #[arg(long, value_enum)]
    verification: Option<Verification>,

    /// Directory for snapshots, audit CSV and error lists
    #[arg(long, short, default_value = "output")]
    output_dir: PathBuf,
}

fn load_config(args: &Args) -> Result<PipelineConfig> {
    let mut loader = Loader::new();
    if let Some(path) = &args.config {
        loader = loader.with_file(path);
    }
    if let Some(policy) = args.verification {
        let value = match policy {
            Verification::Bypass => "bypass",
            Verification::Lexicon => "lexicon",
        };
        loader = loader.set_override("verification", value)?;
    }
    loader.build().context("Failed to load configuration")
}

/// Lowercase words of every cleaned input, for online lookup.
fn collect_words(inputs: &[PathBuf], config: &PipelineConfig) -> Result<Vec<String>> {
    let mut words = BTreeSet::new();
    for input in inputs {
        let mut document = Document::from_path(input)?;
        document.normalize_unicode(config.unicode_form);
        document.clean(&config.characters_to_clean);
        words.extend(document.unique_words().into_iter().map(|w| w.to_lowercase()));
    }
    Ok(words.into_iter().collect())
}

fn load_lexicon(args: &Args, config: &PipelineConfig) -> Result<Lexicon> {
    if let Some(path) = &args.lexicon {
        return Lexicon::from_tsv_path(path)
            .with_context(|| format!("Failed to load lexicon {}", path.display()));
    }

    if let Some(cache) = args.lexicon_cache.as_deref().filter(|p| p.exists()) {
        tracing::info!("Using cached online lexicon {}", cache.display());
        return Ok(Lexicon::load_json(cache)?);
    }

    let words = collect_words(&args.inputs, config)?;
    let client = FllClient::new(&config.online)?;
    let (lexicon, failures) = online::build_lexicon(&client, &words);
    if !failures.is_empty() {
        tracing::warn!("{} words could not be looked up online", failures.len());
    }
    if let Some(cache) = &args.lexicon_cache {
        lexicon.save_json(cache)?;
    }
    Ok(lexicon)
}

fn run(args: Args) -> Result<()> {
    let config = load_config(&args)?;
    let dictionary = AbbreviationDictionary::from_path(&args.dictionary)
        .with_context(|| format!("Failed to load dictionary {}", args.dictionary.display()))?;
    let lexicon = load_lexicon(&args, &config)?;
    let pipeline = Pipeline::new(config, dictionary, lexicon);

    if let [input] = args.inputs.as_slice() {
        let report = pipeline
            .process_file(input, &args.output_dir)
            .with_context(|| format!("Failed to process {}", input.display()))?;
        print_summary(input, &args.output_dir, &report);
        return Ok(());
    }

    let outcomes = batch::process_batch(&pipeline, &args.inputs, &args.output_dir);
    let mut failed = 0;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(report) => print_summary(&outcome.input, &outcome.output_dir, report),
            Err(e) => {
                failed += 1;
                eprintln!("{}: {}", outcome.input.display(), e);
            }
        }
    }
    if failed > 0 {
        bail!("{} of {} documents failed", failed, outcomes.len());
    }
    Ok(())
}

fn print_summary(input: &Path, output_dir: &Path, report: &htr_postprocess::PipelineReport) {
    println!(
        "{} -> {}: {} expansions ({} unattested), {} line breaks repaired, \
         {} words normalised, {} not in lexicon, {} lemma mismatches",
        input.display(),
        output_dir.display(),
        report.expansions.len(),
        report.rejected_expansions.len(),
        report.repairs.len(),
        report.normalization.records.len(),
        report.normalization.not_found.len(),
        report.normalization.mismatches.len(),
    );
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    run(Args::parse())
}
