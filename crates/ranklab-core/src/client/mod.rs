//! Query execution against a remote search backend.
//!
//! The evaluation engine consumes exactly one collaborator interface,
//! [`QueryExecutor`]: execute one query under a named ranking configuration
//! and return the ranked hits plus match metadata. [`SearchClient`] is the
//! bundled HTTP implementation; tests and embedders can substitute their
//! own executor (an in-memory engine, a recorded fixture) by implementing
//! the trait.

mod http;

pub use http::SearchClient;

use crate::error::QueryError;
use crate::query::{QueryModel, RecallRestriction};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};

/// One ranked hit as returned by the backend.
///
/// `fields` is the backend's field map for the document; the evaluation
/// layer extracts document identity from it via a caller-chosen id field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Hit {
    /// Backend relevance score for this hit
    #[serde(default)]
    pub relevance: f64,
    /// Document fields
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl Hit {
    /// Returns the value of `field` rendered as a document id, if present.
    ///
    /// String fields are used as-is; numeric fields are rendered in their
    /// canonical decimal form so they compare equal to string judgments.
    pub fn id(&self, field: &str) -> Option<String> {
        match self.fields.get(field) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Response to one query execution.
///
/// `total_matched` and `collection_size` are side-channel metadata from the
/// response envelope: they describe the match phase before the ranking
/// cutoff and are not derivable from `hits`.
#[derive(Debug, Clone, Default)]
pub struct SearchResponse {
    /// Ranked hits, best first, at most the requested depth
    pub hits: Vec<Hit>,
    /// Number of documents matched by the query before the ranking cutoff
    pub total_matched: u64,
    /// Number of documents in the searched collection
    pub collection_size: u64,
}

impl SearchResponse {
    /// Extracts the ordered document ids via `id_field`.
    ///
    /// Hits without the field are dropped; order of the remaining hits is
    /// preserved.
    pub fn ranked_ids(&self, id_field: &str) -> Vec<String> {
        self.hits.iter().filter_map(|hit| hit.id(id_field)).collect()
    }
}

/// Executes a single query under a ranking configuration.
///
/// Implementations are expected to be stateless per call: executing the
/// same query twice issues two backend round trips and, given a
/// deterministic backend, returns identical responses.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Executes `query_text` under `model`, returning up to `hits` ranked
    /// results. `recall` restricts the matched set to an explicit id list.
    async fn execute_query(
        &self,
        model: &QueryModel,
        query_text: &str,
        hits: usize,
        recall: Option<&RecallRestriction>,
    ) -> Result<SearchResponse, QueryError>;
}
