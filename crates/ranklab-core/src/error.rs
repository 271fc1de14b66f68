//! Error types for ranklab-core.
//!
//! Errors follow the taxonomy used throughout the crate: configuration
//! problems fail fast at construction time, transport/backend failures are
//! tagged with enough context to locate the failing (query, model) pair, and
//! malformed labeled data is rejected before any query is issued. Metric
//! computation itself never errors: empty-but-well-formed inputs produce
//! defined zero values instead.

use thiserror::Error;

/// Errors raised when constructing metrics or query models.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Metric cutoff `at` was zero
    #[error("metric cutoff must be at least 1")]
    ZeroCutoff,
    /// Metric name could not be parsed
    #[error("unknown metric `{0}`")]
    UnknownMetric(String),
    /// Query model name was empty
    #[error("query model name must not be empty")]
    EmptyModelName,
    /// weakAnd/nearestNeighbor targetNumHits annotation was zero
    #[error("targetNumHits must be at least 1")]
    ZeroTargetHits,
    /// nearestNeighbor referenced an empty tensor field name
    #[error("nearestNeighbor requires non-empty tensor field names")]
    EmptyTensorField,
    /// A union match specification contained no operators
    #[error("union requires at least one operator")]
    EmptyUnion,
}

/// Errors raised while executing a query against the backend.
#[derive(Debug, Clone, Error)]
pub enum QueryError {
    /// Endpoint URL could not be used to build a client or request
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
    /// Transport-level failure (connect, timeout, TLS)
    #[error("request failed: {0}")]
    Request(String),
    /// Backend answered with a non-success status
    #[error("backend returned status {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, truncated for logging
        message: String,
    },
    /// Response body did not match the expected envelope
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Errors raised while loading or validating labeled queries.
#[derive(Debug, Error)]
pub enum DataError {
    /// Same doc id judged twice within one query
    #[error("duplicate relevant doc `{doc_id}` in query `{query_id}`")]
    DuplicateDoc {
        /// Query containing the duplicate
        query_id: String,
        /// Offending doc id
        doc_id: String,
    },
    /// Relevance judgments must be non-negative
    #[error("negative relevance score {score} for doc `{doc_id}` in query `{query_id}`")]
    NegativeScore {
        /// Query containing the judgment
        query_id: String,
        /// Judged doc id
        doc_id: String,
        /// The rejected score
        score: f64,
    },
    /// Labeled data file missing on disk
    #[error("missing labeled data file: {0}")]
    MissingFile(String),
    /// I/O failure reading labeled data
    #[error("failed to read labeled data: {0}")]
    Io(#[from] std::io::Error),
    /// A line of the JSONL file failed to parse
    #[error("line {line}: {source}")]
    Parse {
        /// 1-based line number
        line: usize,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },
}

/// Top-level evaluation error.
///
/// `QueryExecution` carries the `query_id` and `model` of the failing pair so
/// batch callers can locate it regardless of scheduling order.
#[derive(Debug, Error)]
pub enum EvalError {
    /// A query execution against the backend failed
    #[error("query `{query_id}` under model `{model}` failed: {source}")]
    QueryExecution {
        /// Id of the labeled query that was being evaluated
        query_id: String,
        /// Name of the ranking configuration in use
        model: String,
        /// Underlying transport/backend error
        #[source]
        source: QueryError,
    },
    /// Invalid metric or model configuration
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Invalid labeled data
    #[error(transparent)]
    Data(#[from] DataError),
}
