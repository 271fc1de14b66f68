//! # Ranklab Core
//!
//! Client library for remote search ranking backends: build query models,
//! execute queries over HTTP, and evaluate retrieval quality over batches
//! of labeled queries.
//!
//! ## Modules
//!
//! - [`query`] - Query models: match specifications, ranking profiles, request builder
//! - [`client`] - The [`QueryExecutor`](client::QueryExecutor) collaborator trait and its HTTP implementation
//! - [`evaluation`] - Metrics, labeled data, and per-query/aggregate batch evaluation
//! - [`config`] - Default constants shared by library and CLI
//! - [`error`] - Error taxonomy: configuration, transport, and data errors

pub mod client;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod query;

pub use client::{Hit, QueryExecutor, SearchClient, SearchResponse};
pub use error::{ConfigError, DataError, EvalError, QueryError};
pub use evaluation::{
    BatchEvaluator, EvalOptions, EvalReport, FailurePolicy, LabeledQuery, Metric, MetricSummary,
    QueryRecord, RelevantDoc,
};
pub use query::{MatchSpec, QueryModel, RankProfile, RecallRestriction};
