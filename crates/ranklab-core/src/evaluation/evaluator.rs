//! Query and batch evaluation.
//!
//! [`evaluate_query`] scores one labeled query under one ranking
//! configuration: it issues a single live query through the
//! [`QueryExecutor`] collaborator, extracts the ordered ids and match
//! metadata from the response, and computes every requested metric.
//!
//! [`BatchEvaluator`] runs the (model × query) cross product. Pairs share
//! no mutable state, so they are scheduled concurrently on a bounded
//! worker pool; aggregation is order-independent, so completion order
//! never affects the report.

use crate::client::QueryExecutor;
use crate::config::{DEFAULT_CONCURRENCY, DEFAULT_HITS};
use crate::error::EvalError;
use crate::evaluation::labeled::LabeledQuery;
use crate::evaluation::metrics::Metric;
use crate::evaluation::report::{summarize, EvalReport, QueryRecord};
use crate::query::{QueryModel, RecallRestriction};
use futures::stream::{self, StreamExt};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::warn;

/// What to do when one (query, model) pair fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Fail the whole batch with the pair's error; no partial report
    #[default]
    Abort,
    /// Log the pair's error and aggregate over the remaining pairs
    Skip,
}

/// Progress callback: (completed pairs, total pairs).
pub type ProgressFn = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// Options for a batch evaluation run.
#[derive(Debug, Clone)]
pub struct EvalOptions {
    /// Backend field holding document identity, matched against judgments
    pub id_field: String,
    /// Hit depth requested per query
    pub hits: usize,
    /// Maximum in-flight query executions
    pub concurrency: usize,
    /// Per-pair failure handling
    pub failure_policy: FailurePolicy,
    /// Return per-query rows instead of the aggregate table
    pub per_query: bool,
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self {
            id_field: "id".to_string(),
            hits: DEFAULT_HITS,
            concurrency: DEFAULT_CONCURRENCY,
            failure_policy: FailurePolicy::Abort,
            per_query: false,
        }
    }
}

/// Evaluates one labeled query under one ranking configuration.
///
/// Issues exactly one query execution (results are never cached; each
/// call is a live query) and scores every metric against the returned
/// ranking. Against a deterministic backend this is idempotent.
///
/// # Errors
///
/// Malformed judgments surface as [`EvalError::Data`]; an executor failure
/// surfaces as [`EvalError::QueryExecution`] tagged with the query id and
/// model name.
pub async fn evaluate_query<E>(
    executor: &E,
    query: &LabeledQuery,
    model: &QueryModel,
    metrics: &[Metric],
    id_field: &str,
    hits: usize,
    recall: Option<&RecallRestriction>,
) -> Result<QueryRecord, EvalError>
where
    E: QueryExecutor + ?Sized,
{
    query.validate()?;

    let response = executor
        .execute_query(model, &query.query_text, hits, recall)
        .await
        .map_err(|source| EvalError::QueryExecution {
            query_id: query.query_id.clone(),
            model: model.name.clone(),
            source,
        })?;

    let ranked_ids = response.ranked_ids(id_field);
    let mut values = BTreeMap::new();
    for metric in metrics {
        values.insert(
            metric.name(),
            metric.score(
                &ranked_ids,
                &query.relevant_docs,
                response.total_matched,
                response.collection_size,
            ),
        );
    }

    Ok(QueryRecord {
        model: model.name.clone(),
        query_id: query.query_id.clone(),
        metrics: values,
    })
}

/// Evaluates labeled queries across ranking configurations.
pub struct BatchEvaluator<'a, E: QueryExecutor + ?Sized> {
    executor: &'a E,
    options: EvalOptions,
    progress: Option<ProgressFn>,
}

impl<'a, E: QueryExecutor + ?Sized> BatchEvaluator<'a, E> {
    /// Creates a batch evaluator over `executor`.
    pub fn new(executor: &'a E, options: EvalOptions) -> Self {
        Self {
            executor,
            options,
            progress: None,
        }
    }

    /// Registers a callback invoked after each completed pair.
    pub fn with_progress(mut self, callback: impl Fn(usize, usize) + Send + Sync + 'static) -> Self {
        self.progress = Some(Arc::new(callback));
        self
    }

    /// Evaluates every (model, query) pair and builds the report.
    ///
    /// Inputs are validated up front so a malformed model or judgment fails
    /// the batch before the first query is issued. Pair results are
    /// reassembled in (model, query) input order before the failure policy
    /// is applied, so which error aborts the batch does not depend on
    /// network timing.
    pub async fn evaluate(
        &self,
        queries: &[LabeledQuery],
        models: &[QueryModel],
        metrics: &[Metric],
    ) -> Result<EvalReport, EvalError> {
        for model in models {
            model.validate()?;
        }
        for query in queries {
            query.validate()?;
        }

        let total = models.len() * queries.len();
        let completed = AtomicUsize::new(0);
        let completed = &completed;

        let pairs: Vec<(usize, &QueryModel, &LabeledQuery)> = models
            .iter()
            .flat_map(|model| queries.iter().map(move |query| (model, query)))
            .enumerate()
            .map(|(idx, (model, query))| (idx, model, query))
            .collect();

        let mut results: Vec<(usize, Result<QueryRecord, EvalError>)> =
            stream::iter(pairs.into_iter().map(|(idx, model, query)| async move {
                let record = evaluate_query(
                    self.executor,
                    query,
                    model,
                    metrics,
                    &self.options.id_field,
                    self.options.hits,
                    None,
                )
                .await;
                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                if let Some(progress) = self.progress.as_deref() {
                    progress(done, total);
                }
                (idx, record)
            }))
            .buffer_unordered(self.options.concurrency.max(1))
            .collect()
            .await;

        results.sort_by_key(|(idx, _)| *idx);

        let mut records = Vec::with_capacity(results.len());
        for (_, result) in results {
            match result {
                Ok(record) => records.push(record),
                Err(err) => match self.options.failure_policy {
                    FailurePolicy::Abort => return Err(err),
                    FailurePolicy::Skip => {
                        warn!(error = %err, "skipping failed evaluation pair");
                    }
                },
            }
        }

        if self.options.per_query {
            Ok(EvalReport::PerQuery { records })
        } else {
            Ok(EvalReport::Summary {
                groups: summarize(&records),
            })
        }
    }

    /// Streaming variant of [`evaluate`]: delivers each record to
    /// `on_record` as its query completes, in completion order.
    ///
    /// Returns the number of delivered records. Under
    /// [`FailurePolicy::Abort`] records delivered before the failing pair
    /// have already been observed by the callback; callers that need
    /// all-or-nothing semantics should use [`evaluate`], which discards
    /// partial results on abort.
    ///
    /// [`evaluate`]: BatchEvaluator::evaluate
    pub async fn evaluate_each<F>(
        &self,
        queries: &[LabeledQuery],
        models: &[QueryModel],
        metrics: &[Metric],
        mut on_record: F,
    ) -> Result<usize, EvalError>
    where
        F: FnMut(QueryRecord),
    {
        for model in models {
            model.validate()?;
        }
        for query in queries {
            query.validate()?;
        }

        let pairs = models
            .iter()
            .flat_map(|model| queries.iter().map(move |query| (model, query)));

        let mut results = stream::iter(pairs.map(|(model, query)| async move {
            evaluate_query(
                self.executor,
                query,
                model,
                metrics,
                &self.options.id_field,
                self.options.hits,
                None,
            )
            .await
        }))
        .buffer_unordered(self.options.concurrency.max(1));

        let mut delivered = 0;
        while let Some(result) = results.next().await {
            match result {
                Ok(record) => {
                    delivered += 1;
                    on_record(record);
                }
                Err(err) => match self.options.failure_policy {
                    FailurePolicy::Abort => return Err(err),
                    FailurePolicy::Skip => {
                        warn!(error = %err, "skipping failed evaluation pair");
                    }
                },
            }
        }

        Ok(delivered)
    }
}
