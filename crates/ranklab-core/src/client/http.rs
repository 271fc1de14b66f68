//! HTTP implementation of [`QueryExecutor`].
//!
//! Speaks the backend's JSON search API: the request body built by
//! [`QueryModel::request_body`] is POSTed to `{base_url}/search/`, and the
//! response envelope is unpacked into a [`SearchResponse`]. The reqwest
//! client is pooled and reused across requests, which matters during batch
//! evaluation where hundreds of requests hit the same endpoint.

use super::{Hit, QueryExecutor, SearchResponse};
use crate::config::{POOL_MAX_IDLE_PER_HOST, REQUEST_TIMEOUT_SECS, USER_AGENT};
use crate::error::QueryError;
use crate::query::{QueryModel, RecallRestriction};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Characters of a failing response body kept in the error message.
const ERROR_BODY_MAX_LEN: usize = 512;

/// Pooled HTTP client bound to one search endpoint.
#[derive(Debug, Clone)]
pub struct SearchClient {
    http: reqwest::Client,
    search_url: String,
}

impl SearchClient {
    /// Creates a client for `base_url` (e.g. `http://localhost:8080`).
    ///
    /// The client carries the crate-level defaults: request timeout,
    /// user agent, and per-host connection pooling.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, QueryError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
            .build()
            .map_err(|e| QueryError::InvalidEndpoint(e.to_string()))?;
        Ok(Self::with_client(http, base_url))
    }

    /// Creates a client reusing an existing `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: impl AsRef<str>) -> Self {
        let search_url = format!("{}/search/", base_url.as_ref().trim_end_matches('/'));
        Self { http, search_url }
    }

    /// The resolved search endpoint URL.
    pub fn search_url(&self) -> &str {
        &self.search_url
    }
}

#[async_trait]
impl QueryExecutor for SearchClient {
    async fn execute_query(
        &self,
        model: &QueryModel,
        query_text: &str,
        hits: usize,
        recall: Option<&RecallRestriction>,
    ) -> Result<SearchResponse, QueryError> {
        let body = model.request_body(query_text, hits, recall);
        debug!(model = %model.name, hits, "issuing query");

        let response = self
            .http
            .post(&self.search_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| QueryError::Request(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| QueryError::Request(e.to_string()))?;

        if !status.is_success() {
            let message: String = text.chars().take(ERROR_BODY_MAX_LEN).collect();
            return Err(QueryError::Status {
                status: status.as_u16(),
                message,
            });
        }

        parse_envelope(&text)
    }
}

// Response envelope: `root.fields.totalCount` counts documents matched
// before the ranking cutoff, `root.coverage.documents` is the collection
// size, and `root.children` carries the ranked hits.

#[derive(Deserialize)]
struct Envelope {
    root: Root,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Root {
    fields: RootFields,
    coverage: Coverage,
    children: Vec<Hit>,
}

#[derive(Deserialize, Default)]
struct RootFields {
    #[serde(rename = "totalCount", default)]
    total_count: u64,
}

#[derive(Deserialize, Default)]
struct Coverage {
    #[serde(default)]
    documents: u64,
}

fn parse_envelope(body: &str) -> Result<SearchResponse, QueryError> {
    let envelope: Envelope =
        serde_json::from_str(body).map_err(|e| QueryError::MalformedResponse(e.to_string()))?;
    Ok(SearchResponse {
        hits: envelope.root.children,
        total_matched: envelope.root.fields.total_count,
        collection_size: envelope.root.coverage.documents,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_envelope_full() {
        let body = r#"{
            "root": {
                "fields": {"totalCount": 1083},
                "coverage": {"documents": 62529, "full": true},
                "children": [
                    {"id": "index:content/0/aa", "relevance": 0.92, "fields": {"id": "d1", "title": "first"}},
                    {"id": "index:content/0/ab", "relevance": 0.45, "fields": {"id": "d2"}}
                ]
            }
        }"#;
        let response = parse_envelope(body).unwrap();
        assert_eq!(response.total_matched, 1083);
        assert_eq!(response.collection_size, 62529);
        assert_eq!(response.ranked_ids("id"), vec!["d1", "d2"]);
        assert!((response.hits[0].relevance - 0.92).abs() < 1e-9);
    }

    #[test]
    fn test_parse_envelope_no_children() {
        // Backends omit `children` entirely when nothing matched.
        let body = r#"{"root": {"fields": {"totalCount": 0}, "coverage": {"documents": 10}}}"#;
        let response = parse_envelope(body).unwrap();
        assert!(response.hits.is_empty());
        assert_eq!(response.total_matched, 0);
        assert_eq!(response.collection_size, 10);
    }

    #[test]
    fn test_parse_envelope_malformed() {
        let result = parse_envelope("not json");
        assert!(matches!(result, Err(QueryError::MalformedResponse(_))));
    }

    #[test]
    fn test_search_url_normalization() {
        let http = reqwest::Client::new();
        let client = SearchClient::with_client(http, "http://localhost:8080/");
        assert_eq!(client.search_url(), "http://localhost:8080/search/");
    }
}
