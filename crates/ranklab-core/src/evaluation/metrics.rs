//! Retrieval-evaluation metrics.
//!
//! Implements the metrics computed per (query, ranking configuration) pair:
//! match ratio, Recall@k, ReciprocalRank@k, and NDCG@k. All are pure
//! functions of the ranked id list, the relevance judgments, and (for match
//! ratio) the match metadata from the response envelope.
//!
//! Edge-case policy, covered by tests: metrics never fail on
//! empty-but-well-formed input. Empty judgments score 0 for Recall,
//! ReciprocalRank, and NDCG; a zero-document collection scores 0 for match
//! ratio. Lists shorter than `k` are scored over the available prefix.
//!
//! # References
//!
//! - Järvelin & Kekäläinen (2002). "Cumulated gain-based evaluation of IR techniques"

use crate::error::ConfigError;
use crate::evaluation::labeled::RelevantDoc;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// A retrieval metric with its cutoff parameter.
///
/// Constructed through the checked helpers ([`Metric::recall`] etc.) so a
/// metric value always carries a usable cutoff; a cutoff of 0 is a
/// [`ConfigError`] at construction time, never a NaN at scoring time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    /// Fraction of the collection matched before the ranking cutoff
    MatchRatio,
    /// Fraction of relevant documents found in the top-k
    Recall {
        /// Scoring window
        at: usize,
    },
    /// Inverse rank of the first relevant document in the top-k
    ReciprocalRank {
        /// Scoring window
        at: usize,
    },
    /// Normalized discounted cumulative gain over the top-k
    Ndcg {
        /// Scoring window
        at: usize,
    },
}

impl Metric {
    /// Recall@`at`.
    pub fn recall(at: usize) -> Result<Self, ConfigError> {
        check_cutoff(at)?;
        Ok(Metric::Recall { at })
    }

    /// ReciprocalRank@`at`.
    pub fn reciprocal_rank(at: usize) -> Result<Self, ConfigError> {
        check_cutoff(at)?;
        Ok(Metric::ReciprocalRank { at })
    }

    /// NDCG@`at`.
    pub fn ndcg(at: usize) -> Result<Self, ConfigError> {
        check_cutoff(at)?;
        Ok(Metric::Ndcg { at })
    }

    /// Stable column key for reports, e.g. `recall_10`.
    pub fn name(&self) -> String {
        match self {
            Metric::MatchRatio => "match_ratio".to_string(),
            Metric::Recall { at } => format!("recall_{}", at),
            Metric::ReciprocalRank { at } => format!("reciprocal_rank_{}", at),
            Metric::Ndcg { at } => format!("ndcg_{}", at),
        }
    }

    /// Scores this metric for one evaluated query.
    ///
    /// # Arguments
    ///
    /// * `ranked_ids` - Ordered ids returned by the backend, best first
    /// * `relevant_docs` - Relevance judgments for the query
    /// * `total_matched` - Documents matched before the ranking cutoff
    /// * `collection_size` - Documents in the searched collection
    pub fn score(
        &self,
        ranked_ids: &[String],
        relevant_docs: &[RelevantDoc],
        total_matched: u64,
        collection_size: u64,
    ) -> f64 {
        match self {
            Metric::MatchRatio => match_ratio(total_matched, collection_size),
            Metric::Recall { at } => recall_at_k(ranked_ids, relevant_docs, *at),
            Metric::ReciprocalRank { at } => reciprocal_rank_at_k(ranked_ids, relevant_docs, *at),
            Metric::Ndcg { at } => ndcg_at_k(ranked_ids, relevant_docs, *at),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::MatchRatio => write!(f, "match_ratio"),
            Metric::Recall { at } => write!(f, "recall@{}", at),
            Metric::ReciprocalRank { at } => write!(f, "reciprocal_rank@{}", at),
            Metric::Ndcg { at } => write!(f, "ndcg@{}", at),
        }
    }
}

impl FromStr for Metric {
    type Err = ConfigError;

    /// Parses `match_ratio`, `recall@K`, `reciprocal_rank@K` (alias `rr@K`),
    /// and `ndcg@K`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "match_ratio" {
            return Ok(Metric::MatchRatio);
        }
        let (kind, at) = s
            .split_once('@')
            .ok_or_else(|| ConfigError::UnknownMetric(s.to_string()))?;
        let at: usize = at
            .parse()
            .map_err(|_| ConfigError::UnknownMetric(s.to_string()))?;
        match kind {
            "recall" => Metric::recall(at),
            "reciprocal_rank" | "rr" => Metric::reciprocal_rank(at),
            "ndcg" => Metric::ndcg(at),
            _ => Err(ConfigError::UnknownMetric(s.to_string())),
        }
    }
}

fn check_cutoff(at: usize) -> Result<(), ConfigError> {
    if at == 0 {
        return Err(ConfigError::ZeroCutoff);
    }
    Ok(())
}

/// Set of ids judged relevant (score > 0) for binary metrics.
fn relevant_set(relevant_docs: &[RelevantDoc]) -> HashSet<&str> {
    relevant_docs
        .iter()
        .filter(|doc| doc.score > 0.0)
        .map(|doc| doc.doc_id.as_str())
        .collect()
}

/// Fraction of the collection matched by the query before ranking.
///
/// Defined as 0.0 when the collection is empty.
pub fn match_ratio(total_matched: u64, collection_size: u64) -> f64 {
    if collection_size == 0 {
        return 0.0;
    }
    total_matched as f64 / collection_size as f64
}

/// Recall@k: `|relevant ∩ top_k| / |relevant|`.
///
/// Defined as 0.0 when there are no relevant documents. Distinct ids are
/// counted, so a backend that returns a duplicate hit cannot inflate the
/// score.
pub fn recall_at_k(ranked_ids: &[String], relevant_docs: &[RelevantDoc], k: usize) -> f64 {
    let relevant = relevant_set(relevant_docs);
    if relevant.is_empty() {
        return 0.0;
    }
    let found: HashSet<&str> = ranked_ids
        .iter()
        .take(k)
        .map(String::as_str)
        .filter(|id| relevant.contains(id))
        .collect();
    found.len() as f64 / relevant.len() as f64
}

/// ReciprocalRank@k: `1 / rank` of the first relevant document, 1-based,
/// within the top-k window; 0.0 when none appears.
pub fn reciprocal_rank_at_k(ranked_ids: &[String], relevant_docs: &[RelevantDoc], k: usize) -> f64 {
    let relevant = relevant_set(relevant_docs);
    for (i, id) in ranked_ids.iter().take(k).enumerate() {
        if relevant.contains(id.as_str()) {
            return 1.0 / (i + 1) as f64;
        }
    }
    0.0
}

/// NDCG@k with linear gain and log2 discount.
///
/// `DCG@k = Σ gain_i / log2(i + 1)` over 1-based positions, where `gain_i`
/// is the judged relevance score of the document at position i (0 when
/// unjudged). Normalized by the ideal DCG: judgment scores sorted
/// descending, truncated at k. Defined as 0.0 when the ideal DCG is 0
/// (no judgments, or all judgments scored 0).
pub fn ndcg_at_k(ranked_ids: &[String], relevant_docs: &[RelevantDoc], k: usize) -> f64 {
    let gains: HashMap<&str, f64> = relevant_docs
        .iter()
        .map(|doc| (doc.doc_id.as_str(), doc.score))
        .collect();

    let dcg: f64 = ranked_ids
        .iter()
        .take(k)
        .enumerate()
        .map(|(i, id)| gains.get(id.as_str()).copied().unwrap_or(0.0) / discount(i + 1))
        .sum();

    let mut ideal: Vec<f64> = relevant_docs.iter().map(|doc| doc.score).collect();
    ideal.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
    let idcg: f64 = ideal
        .iter()
        .take(k)
        .enumerate()
        .map(|(i, gain)| gain / discount(i + 1))
        .sum();

    if idcg <= 0.0 {
        return 0.0;
    }
    dcg / idcg
}

/// Logarithmic discount for a 1-based position: `log2(position + 1)`.
#[inline]
fn discount(position: usize) -> f64 {
    (position as f64 + 1.0).log2()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn binary(raw: &[&str]) -> Vec<RelevantDoc> {
        raw.iter().map(|id| RelevantDoc::new(*id)).collect()
    }

    #[test]
    fn test_match_ratio() {
        assert!((match_ratio(1083, 62529) - 1083.0 / 62529.0).abs() < 1e-12);
        assert_eq!(match_ratio(5, 0), 0.0);
        assert_eq!(match_ratio(0, 100), 0.0);
    }

    #[test]
    fn test_recall_counts_found_relevant() {
        let ranked = ids(&["d1", "d2", "d3", "d4", "d5"]);
        let relevant = binary(&["d1", "d3", "d9"]);

        // d9 never appears in the ranked list
        assert!((recall_at_k(&ranked, &relevant, 1) - 1.0 / 3.0).abs() < 1e-12);
        assert!((recall_at_k(&ranked, &relevant, 3) - 2.0 / 3.0).abs() < 1e-12);
        assert!((recall_at_k(&ranked, &relevant, 5) - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_recall_empty_judgments_is_zero() {
        let ranked = ids(&["d1", "d2"]);
        assert_eq!(recall_at_k(&ranked, &[], 10), 0.0);
        assert_eq!(reciprocal_rank_at_k(&ranked, &[], 10), 0.0);
    }

    #[test]
    fn test_recall_monotone_in_k() {
        let ranked = ids(&["a", "b", "c", "d", "e", "f"]);
        let relevant = binary(&["b", "e", "x"]);
        let mut previous = 0.0;
        for k in 1..=8 {
            let current = recall_at_k(&ranked, &relevant, k);
            assert!(current >= previous, "recall dropped at k={}", k);
            previous = current;
        }
    }

    #[test]
    fn test_recall_ignores_duplicate_hits() {
        let ranked = ids(&["d1", "d1", "d1"]);
        let relevant = binary(&["d1", "d2"]);
        assert!((recall_at_k(&ranked, &relevant, 3) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_reciprocal_rank_window() {
        let relevant = binary(&["d3"]);

        assert_eq!(reciprocal_rank_at_k(&ids(&["d3", "a", "b"]), &relevant, 10), 1.0);
        assert!(
            (reciprocal_rank_at_k(&ids(&["a", "b", "d3"]), &relevant, 10) - 1.0 / 3.0).abs()
                < 1e-12
        );
        // First relevant hit is outside the window
        assert_eq!(reciprocal_rank_at_k(&ids(&["a", "b", "d3"]), &relevant, 2), 0.0);
        assert_eq!(reciprocal_rank_at_k(&ids(&["a", "b"]), &relevant, 10), 0.0);
    }

    #[test]
    fn test_reciprocal_rank_takes_discrete_values() {
        // RR@k ranges over {0} ∪ {1/1, ..., 1/k}
        let relevant = binary(&["r"]);
        for position in 0..5 {
            let mut ranked = ids(&["a", "b", "c", "d", "e"]);
            ranked[position] = "r".to_string();
            let rr = reciprocal_rank_at_k(&ranked, &relevant, 5);
            assert!((rr - 1.0 / (position + 1) as f64).abs() < 1e-12);
        }
    }

    #[test]
    fn test_ndcg_perfect_ranking_is_one() {
        let ranked = ids(&["d1", "d2", "d3"]);
        let relevant = vec![
            RelevantDoc::graded("d1", 2.0),
            RelevantDoc::graded("d2", 1.0),
        ];
        assert!((ndcg_at_k(&ranked, &relevant, 10) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_ndcg_reversed_ranking_below_one() {
        let ranked = ids(&["d3", "d2", "d1"]);
        let relevant = vec![
            RelevantDoc::graded("d1", 2.0),
            RelevantDoc::graded("d2", 1.0),
        ];
        let ndcg = ndcg_at_k(&ranked, &relevant, 10);
        assert!(ndcg > 0.0 && ndcg < 1.0);
    }

    #[test]
    fn test_ndcg_bounded() {
        let ranked = ids(&["a", "b", "c", "d"]);
        let relevant = vec![
            RelevantDoc::graded("c", 3.0),
            RelevantDoc::graded("z", 1.0),
            RelevantDoc::graded("a", 0.5),
        ];
        for k in 1..=6 {
            let ndcg = ndcg_at_k(&ranked, &relevant, k);
            assert!((0.0..=1.0).contains(&ndcg), "ndcg@{} = {}", k, ndcg);
        }
    }

    #[test]
    fn test_ndcg_empty_judgments_is_zero() {
        assert_eq!(ndcg_at_k(&ids(&["a", "b"]), &[], 10), 0.0);
    }

    #[test]
    fn test_ndcg_equal_gains_permutation_invariant() {
        // Equally scored relevant docs can appear in any ideal order
        let relevant = vec![
            RelevantDoc::graded("a", 1.0),
            RelevantDoc::graded("b", 1.0),
        ];
        let forward = ndcg_at_k(&ids(&["a", "b"]), &relevant, 10);
        let backward = ndcg_at_k(&ids(&["b", "a"]), &relevant, 10);
        assert!((forward - backward).abs() < 1e-12);
        assert!((forward - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_metric_names() {
        assert_eq!(Metric::MatchRatio.name(), "match_ratio");
        assert_eq!(Metric::recall(10).unwrap().name(), "recall_10");
        assert_eq!(
            Metric::reciprocal_rank(5).unwrap().name(),
            "reciprocal_rank_5"
        );
        assert_eq!(Metric::ndcg(3).unwrap().name(), "ndcg_3");
    }

    #[test]
    fn test_metric_construction_rejects_zero_cutoff() {
        assert_eq!(Metric::recall(0).unwrap_err(), ConfigError::ZeroCutoff);
        assert_eq!(Metric::ndcg(0).unwrap_err(), ConfigError::ZeroCutoff);
    }

    #[test]
    fn test_metric_parsing() {
        assert_eq!("match_ratio".parse::<Metric>().unwrap(), Metric::MatchRatio);
        assert_eq!(
            "recall@10".parse::<Metric>().unwrap(),
            Metric::Recall { at: 10 }
        );
        assert_eq!(
            "rr@5".parse::<Metric>().unwrap(),
            Metric::ReciprocalRank { at: 5 }
        );
        assert_eq!("ndcg@3".parse::<Metric>().unwrap(), Metric::Ndcg { at: 3 });
        assert!(matches!(
            "precision@5".parse::<Metric>(),
            Err(ConfigError::UnknownMetric(_))
        ));
        assert!(matches!(
            "recall@0".parse::<Metric>(),
            Err(ConfigError::ZeroCutoff)
        ));
    }
}
