//! Evaluation engine: labeled queries, metrics, and batch aggregation.
//!
//! Evaluation runs against a live backend: each (query, ranking
//! configuration) pair triggers one query execution, the returned ranking
//! is scored by every requested metric, and per-query records are either
//! returned as-is or reduced to per-(model, metric) summary statistics.
//!
//! # Example
//!
//! ```ignore
//! use ranklab_core::client::SearchClient;
//! use ranklab_core::evaluation::{BatchEvaluator, EvalOptions, Metric};
//! use ranklab_core::evaluation::labeled::load_labeled_queries;
//!
//! let client = SearchClient::new("http://localhost:8080")?;
//! let queries = load_labeled_queries(Path::new("labeled.jsonl"))?;
//! let metrics = vec![Metric::MatchRatio, Metric::recall(10)?, Metric::ndcg(10)?];
//!
//! let evaluator = BatchEvaluator::new(&client, EvalOptions::default());
//! let report = evaluator.evaluate(&queries, &models, &metrics).await?;
//! ```
//!
//! # Metrics Reference
//!
//! | Metric | Description |
//! |--------|-------------|
//! | match_ratio | Fraction of the collection matched before the ranking cutoff |
//! | recall@k | Fraction of relevant documents found in the top-k |
//! | reciprocal_rank@k | 1/rank of the first relevant document in the top-k |
//! | ndcg@k | Rank quality with graded judgments, log2 position discount |

pub mod evaluator;
pub mod labeled;
pub mod metrics;
pub mod report;
pub mod stats;

pub use evaluator::{evaluate_query, BatchEvaluator, EvalOptions, FailurePolicy};
pub use labeled::{load_labeled_queries, LabeledQuery, RelevantDoc};
pub use metrics::{
    match_ratio, ndcg_at_k, recall_at_k, reciprocal_rank_at_k, Metric,
};
pub use report::{summarize, EvalReport, MetricSummary, QueryRecord};
