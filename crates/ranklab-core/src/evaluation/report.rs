//! Evaluation report types and aggregation.
//!
//! A batch evaluation produces either the flat per-query records or a
//! summary table: one row per (model, metric) group with mean, median, and
//! population standard deviation computed across the query dimension.
//! Grouping uses ordered maps so report rows come out in a deterministic
//! order regardless of the completion order of the underlying queries.

use crate::evaluation::stats::{mean, median, std_pop};
use serde::Serialize;
use std::collections::BTreeMap;

/// Flat record for one evaluated (query, model) pair.
///
/// `metrics` maps stable metric names (e.g. `recall_10`) to scores.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryRecord {
    /// Name of the ranking configuration
    pub model: String,
    /// Id of the labeled query
    pub query_id: String,
    /// Metric name → score
    pub metrics: BTreeMap<String, f64>,
}

/// Summary row for one (model, metric) group.
#[derive(Debug, Clone, Serialize)]
pub struct MetricSummary {
    /// Name of the ranking configuration
    pub model: String,
    /// Metric name
    pub metric: String,
    /// Mean across queries
    pub mean: f64,
    /// Median across queries
    pub median: f64,
    /// Population standard deviation across queries (0 for one query)
    pub std: f64,
}

/// Result of a batch evaluation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EvalReport {
    /// One row per (model, query) pair
    PerQuery {
        /// Flat records in (model, query) input order
        records: Vec<QueryRecord>,
    },
    /// One row per (model, metric) group
    Summary {
        /// Rows ordered by model name, then metric name
        groups: Vec<MetricSummary>,
    },
}

impl EvalReport {
    /// Number of rows in the report.
    pub fn len(&self) -> usize {
        match self {
            EvalReport::PerQuery { records } => records.len(),
            EvalReport::Summary { groups } => groups.len(),
        }
    }

    /// True when the report carries no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Groups per-query records by (model, metric) and reduces each group.
///
/// Aggregation is order-independent: any permutation of `records` yields
/// the same summary rows in the same order.
pub fn summarize(records: &[QueryRecord]) -> Vec<MetricSummary> {
    let mut groups: BTreeMap<(String, String), Vec<f64>> = BTreeMap::new();
    for record in records {
        for (metric, value) in &record.metrics {
            groups
                .entry((record.model.clone(), metric.clone()))
                .or_default()
                .push(*value);
        }
    }

    groups
        .into_iter()
        .map(|((model, metric), values)| MetricSummary {
            model,
            metric,
            mean: mean(&values),
            median: median(&values),
            std: std_pop(&values),
        })
        .collect()
}
