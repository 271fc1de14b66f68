//! Loading query models and parsing metric specifications.
//!
//! # Model File Format
//!
//! A JSON array of query models:
//!
//! ```json
//! [
//!   {
//!     "name": "weakand-bm25",
//!     "match_spec": {"type": "weak_and", "hits": 100, "field": "default"},
//!     "rank_profile": {"name": "bm25"}
//!   },
//!   {
//!     "name": "semantic",
//!     "match_spec": {
//!       "type": "ann",
//!       "doc_vector": "embedding",
//!       "query_vector": "query_embedding",
//!       "hits": 100
//!     },
//!     "rank_profile": {"name": "closeness"}
//!   }
//! ]
//! ```
//!
//! Omitted fields fall back to the library defaults (`and` match phase,
//! `default` rank profile).

use anyhow::{bail, Context, Result};
use ranklab_core::evaluation::Metric;
use ranklab_core::query::QueryModel;
use std::collections::HashSet;
use std::path::Path;

/// Loads and validates query models from a JSON file.
pub fn load_models(path: &Path) -> Result<Vec<QueryModel>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read models file: {}", path.display()))?;
    let models: Vec<QueryModel> = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse models file: {}", path.display()))?;

    if models.is_empty() {
        bail!("models file {} contains no models", path.display());
    }

    let mut names = HashSet::new();
    for model in &models {
        model
            .validate()
            .with_context(|| format!("invalid model `{}`", model.name))?;
        if !names.insert(model.name.as_str()) {
            bail!("duplicate model name `{}`", model.name);
        }
    }

    Ok(models)
}

/// Parses metric specifications like `recall@10` or `match_ratio`.
pub fn parse_metrics(specs: &[String]) -> Result<Vec<Metric>> {
    specs
        .iter()
        .map(|spec| {
            spec.parse::<Metric>()
                .with_context(|| format!("invalid metric `{}`", spec))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ranklab_core::evaluation::Metric;

    #[test]
    fn test_parse_metrics() {
        let specs = vec!["match_ratio".to_string(), "recall@10".to_string()];
        let metrics = parse_metrics(&specs).unwrap();
        assert_eq!(metrics, vec![Metric::MatchRatio, Metric::Recall { at: 10 }]);
    }

    #[test]
    fn test_parse_metrics_rejects_unknown() {
        let specs = vec!["f1@10".to_string()];
        assert!(parse_metrics(&specs).is_err());
    }
}
