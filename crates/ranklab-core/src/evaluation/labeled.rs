//! Labeled queries and relevance judgments.
//!
//! A labeled query is the unit of evaluation input: a query string plus the
//! set of documents known to be relevant to it. Judgments are an unordered
//! set (order in the file carries no meaning) and each doc id may appear
//! at most once per query.
//!
//! # File Format
//!
//! Labeled data is stored as JSONL, one query per line:
//!
//! ```text
//! {"query_id": "q1", "query_text": "total eclipse", "relevant_docs": [{"doc_id": "d3"}, {"doc_id": "d7", "score": 2.0}]}
//! ```
//!
//! `score` defaults to 1.0. Negative scores are rejected: some upstream
//! judgment sources use negative values as error sentinels, and silently
//! treating them as gains would corrupt every metric downstream.

use crate::error::DataError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

fn default_score() -> f64 {
    1.0
}

/// A relevance judgment: one document judged relevant to a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelevantDoc {
    /// Judged document id
    #[serde(alias = "id")]
    pub doc_id: String,
    /// Graded relevance; 1.0 when the source provides only binary judgments
    #[serde(default = "default_score")]
    pub score: f64,
}

impl RelevantDoc {
    /// Binary judgment with score 1.0.
    pub fn new(doc_id: impl Into<String>) -> Self {
        Self {
            doc_id: doc_id.into(),
            score: 1.0,
        }
    }

    /// Graded judgment.
    pub fn graded(doc_id: impl Into<String>, score: f64) -> Self {
        Self {
            doc_id: doc_id.into(),
            score,
        }
    }
}

/// A query with its relevance judgments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledQuery {
    /// Identifier keying per-query rows in evaluation reports
    pub query_id: String,
    /// Query text sent to the backend
    pub query_text: String,
    /// Relevance judgments; may be empty (metrics then score 0)
    #[serde(default)]
    pub relevant_docs: Vec<RelevantDoc>,
}

impl LabeledQuery {
    /// Creates a labeled query without validating; call [`validate`] before
    /// evaluation, or use [`load_labeled_queries`] which validates on load.
    ///
    /// [`validate`]: LabeledQuery::validate
    pub fn new(
        query_id: impl Into<String>,
        query_text: impl Into<String>,
        relevant_docs: Vec<RelevantDoc>,
    ) -> Self {
        Self {
            query_id: query_id.into(),
            query_text: query_text.into(),
            relevant_docs,
        }
    }

    /// Rejects duplicate doc ids and negative relevance scores.
    ///
    /// Empty `relevant_docs` is well-formed: metrics score it as defined
    /// zeros rather than erroring.
    pub fn validate(&self) -> Result<(), DataError> {
        let mut seen = HashSet::new();
        for doc in &self.relevant_docs {
            if !seen.insert(doc.doc_id.as_str()) {
                return Err(DataError::DuplicateDoc {
                    query_id: self.query_id.clone(),
                    doc_id: doc.doc_id.clone(),
                });
            }
            if doc.score < 0.0 {
                return Err(DataError::NegativeScore {
                    query_id: self.query_id.clone(),
                    doc_id: doc.doc_id.clone(),
                    score: doc.score,
                });
            }
        }
        Ok(())
    }
}

/// Loads labeled queries from a JSONL file, validating each line.
///
/// # Arguments
///
/// * `path` - File with one JSON-encoded [`LabeledQuery`] per line; blank
///   lines are skipped.
///
/// # Errors
///
/// [`DataError::MissingFile`] if the path does not exist, [`DataError::Parse`]
/// with the 1-based line number for malformed lines, and the validation
/// errors of [`LabeledQuery::validate`].
pub fn load_labeled_queries(path: &Path) -> Result<Vec<LabeledQuery>, DataError> {
    if !path.exists() {
        return Err(DataError::MissingFile(path.display().to_string()));
    }

    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut queries = Vec::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let query: LabeledQuery = serde_json::from_str(&line).map_err(|source| {
            DataError::Parse {
                line: line_num + 1,
                source,
            }
        })?;
        query.validate()?;
        queries.push(query);
    }

    Ok(queries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_defaults_to_one() {
        let doc: RelevantDoc = serde_json::from_str(r#"{"doc_id": "d1"}"#).unwrap();
        assert_eq!(doc.score, 1.0);
    }

    #[test]
    fn test_id_alias_accepted() {
        let doc: RelevantDoc = serde_json::from_str(r#"{"id": "d1", "score": 2.0}"#).unwrap();
        assert_eq!(doc.doc_id, "d1");
        assert_eq!(doc.score, 2.0);
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let query = LabeledQuery::new(
            "q1",
            "text",
            vec![RelevantDoc::new("d1"), RelevantDoc::new("d1")],
        );
        assert!(matches!(
            query.validate(),
            Err(DataError::DuplicateDoc { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_negative_scores() {
        let query = LabeledQuery::new("q1", "text", vec![RelevantDoc::graded("d1", -1.0)]);
        assert!(matches!(
            query.validate(),
            Err(DataError::NegativeScore { score, .. }) if score == -1.0
        ));
    }

    #[test]
    fn test_validate_accepts_empty_judgments() {
        let query = LabeledQuery::new("q1", "text", vec![]);
        assert!(query.validate().is_ok());
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_labeled_queries(Path::new("/nonexistent/labeled.jsonl"));
        assert!(matches!(result, Err(DataError::MissingFile(_))));
    }
}
