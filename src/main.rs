// src/main.rs - batch scorer for healthcare entity name pairs
//
// Reads a JSON array of name pairs, runs each through the scoring engine,
// and writes one result per pair. A failed pair is reported in place and
// never aborts the run.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

use entity_comparison::lexicon::LexiconTables;
use entity_comparison::{Lexicon, ScoreOutcome, ScoringEngine, SideMetadata, StaticGeoTable};

#[derive(Parser, Debug)]
#[command(
    name = "entity_comparison",
    about = "Score pairs of healthcare organization and facility names"
)]
struct Args {
    /// JSON file containing the array of pairs to score
    #[arg(long)]
    pairs: PathBuf,

    /// Geography table JSON (locations plus hospital location ids)
    #[arg(long)]
    geo_table: Option<PathBuf>,

    /// Lexicon tables JSON overriding the builtin alias tables
    #[arg(long)]
    lexicon: Option<PathBuf>,

    /// Output path for the results JSON; stdout when omitted
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct PairInput {
    name_one: Option<String>,
    name_two: Option<String>,
    #[serde(default)]
    meta_one: SideMetadata,
    #[serde(default)]
    meta_two: SideMetadata,
}

#[derive(Debug, Serialize)]
struct PairResult {
    name_one: Option<String>,
    name_two: Option<String>,
    score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<ScoreOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    let run_id = Uuid::new_v4();
    let started = Utc::now();
    info!("Starting comparison run {} at {}", run_id, started.to_rfc3339());

    let lexicon = load_lexicon(&args)?;
    let geo = load_geo_table(&args)?;
    info!("Geography table holds {} locations", geo.len());

    let engine = ScoringEngine::new(Arc::new(lexicon), Arc::new(geo));

    let raw = fs::read_to_string(&args.pairs)
        .with_context(|| format!("Failed to read pairs file {}", args.pairs.display()))?;
    let pairs: Vec<PairInput> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse pairs file {}", args.pairs.display()))?;
    info!("Loaded {} pairs", pairs.len());

    let progress = ProgressBar::new(pairs.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .context("Invalid progress bar template")?
            .progress_chars("#>-"),
    );

    let mut results = Vec::with_capacity(pairs.len());
    let mut failed = 0usize;

    for pair in &pairs {
        let outcome = engine.score_pair(
            pair.name_one.as_deref(),
            pair.name_two.as_deref(),
            &pair.meta_one,
            &pair.meta_two,
        );
        let result = match outcome {
            Ok(outcome) => PairResult {
                name_one: pair.name_one.clone(),
                name_two: pair.name_two.clone(),
                score: outcome.score(),
                outcome: Some(outcome),
                error: None,
            },
            Err(e) => {
                warn!(
                    "Scoring failed for pair ({:?}, {:?}): {}",
                    pair.name_one, pair.name_two, e
                );
                failed += 1;
                PairResult {
                    name_one: pair.name_one.clone(),
                    name_two: pair.name_two.clone(),
                    score: None,
                    outcome: None,
                    error: Some(e.to_string()),
                }
            }
        };
        results.push(result);
        progress.inc(1);
    }
    progress.finish_with_message("Scoring complete");

    let rendered = serde_json::to_string_pretty(&results).context("Failed to render results")?;
    match &args.output {
        Some(path) => {
            fs::write(path, rendered)
                .with_context(|| format!("Failed to write results to {}", path.display()))?;
            info!("Wrote {} results to {}", results.len(), path.display());
        }
        None => println!("{rendered}"),
    }

    let elapsed = Utc::now().signed_duration_since(started);
    info!(
        "Run {} finished: {} pairs, {} failed, {:.2}s",
        run_id,
        results.len(),
        failed,
        elapsed.num_milliseconds() as f64 / 1000.0
    );
    Ok(())
}

fn load_lexicon(args: &Args) -> Result<Lexicon> {
    match &args.lexicon {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("Failed to read lexicon file {}", path.display()))?;
            let tables: LexiconTables = serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse lexicon file {}", path.display()))?;
            Ok(Lexicon::from_tables(tables))
        }
        None => Ok(Lexicon::builtin()),
    }
}

fn load_geo_table(args: &Args) -> Result<StaticGeoTable> {
    match &args.geo_table {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("Failed to read geography table {}", path.display()))?;
            let file = serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse geography table {}", path.display()))?;
            Ok(StaticGeoTable::from_file(file))
        }
        None => Ok(StaticGeoTable::default()),
    }
}
