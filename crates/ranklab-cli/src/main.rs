//! Ranklab CLI - batch evaluation runner.
//!
//! Runs a batch of labeled queries against a live search backend under one
//! or more ranking configurations and reports retrieval metrics.
//!
//! # Usage
//!
//! ```bash
//! # Aggregate table over the default metric set
//! rl --endpoint http://localhost:8080 --queries labeled.jsonl --models models.json
//!
//! # Per-query breakdown with chosen metrics, as JSON
//! rl --endpoint http://localhost:8080 --queries labeled.jsonl --models models.json \
//!    --metrics recall@5,ndcg@5 --per-query --json
//!
//! # Keep going when individual queries fail
//! rl --endpoint http://localhost:8080 --queries labeled.jsonl --models models.json \
//!    --on-error skip
//! ```

mod models;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use ranklab_core::client::SearchClient;
use ranklab_core::config::{DEFAULT_CONCURRENCY, DEFAULT_HITS};
use ranklab_core::evaluation::{load_labeled_queries, BatchEvaluator, EvalOptions, FailurePolicy};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OnError {
    /// Fail the batch on the first query error
    Abort,
    /// Log and drop failing (query, model) pairs
    Skip,
}

impl From<OnError> for FailurePolicy {
    fn from(value: OnError) -> Self {
        match value {
            OnError::Abort => FailurePolicy::Abort,
            OnError::Skip => FailurePolicy::Skip,
        }
    }
}

/// Evaluate search ranking quality against a live backend.
#[derive(Parser, Debug)]
#[command(name = "rl", version, about)]
struct Cli {
    /// Base URL of the search backend
    #[arg(long)]
    endpoint: String,

    /// Labeled queries (JSONL, one query per line)
    #[arg(long)]
    queries: PathBuf,

    /// Query models (JSON array)
    #[arg(long)]
    models: PathBuf,

    /// Metrics to compute (comma-separated)
    #[arg(
        long,
        value_delimiter = ',',
        default_values_t = [
            "match_ratio".to_string(),
            "recall@10".to_string(),
            "reciprocal_rank@10".to_string(),
            "ndcg@10".to_string(),
        ]
    )]
    metrics: Vec<String>,

    /// Backend field used as document identity
    #[arg(long, default_value = "id")]
    id_field: String,

    /// Hits requested per query
    #[arg(long, default_value_t = DEFAULT_HITS)]
    hits: usize,

    /// Maximum in-flight queries
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    concurrency: usize,

    /// Report per-query rows instead of the aggregate table
    #[arg(long)]
    per_query: bool,

    /// Output the report as JSON
    #[arg(long)]
    json: bool,

    /// What to do when a query execution fails
    #[arg(long, value_enum, default_value = "abort")]
    on_error: OnError,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let queries = load_labeled_queries(&cli.queries)
        .with_context(|| format!("failed to load labeled queries: {}", cli.queries.display()))?;
    let models = models::load_models(&cli.models)?;
    let metrics = models::parse_metrics(&cli.metrics)?;
    info!(
        queries = queries.len(),
        models = models.len(),
        metrics = metrics.len(),
        "loaded evaluation inputs"
    );

    let client = SearchClient::new(&cli.endpoint)?;
    let options = EvalOptions {
        id_field: cli.id_field.clone(),
        hits: cli.hits,
        concurrency: cli.concurrency,
        failure_policy: cli.on_error.into(),
        per_query: cli.per_query,
    };

    let total = (queries.len() * models.len()) as u64;
    let progress = if cli.json {
        None
    } else {
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{msg} [{bar:40}] {pos}/{len}")
                .unwrap(),
        );
        pb.set_message("Evaluating");
        Some(pb)
    };

    let mut evaluator = BatchEvaluator::new(&client, options);
    if let Some(pb) = &progress {
        let pb = pb.clone();
        evaluator = evaluator.with_progress(move |done, _total| pb.set_position(done as u64));
    }

    let report = evaluator.evaluate(&queries, &models, &metrics).await?;
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    if cli.json {
        println!("{}", output::format_json(&report));
    } else {
        print!("{}", output::format_human(&report));
    }

    Ok(())
}
