//! Output formatting for evaluation reports.
//!
//! Supports a fixed-width terminal table and JSON for scripting.

use ranklab_core::evaluation::{EvalReport, QueryRecord};
use std::collections::BTreeSet;

/// Formats a report as JSON.
pub fn format_json(report: &EvalReport) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}

/// Formats a report as a human-readable table.
pub fn format_human(report: &EvalReport) -> String {
    match report {
        EvalReport::Summary { groups } => {
            let mut out = String::new();
            out.push_str(&format!(
                "{:<20} {:<20} {:>10} {:>10} {:>10}\n",
                "MODEL", "METRIC", "MEAN", "MEDIAN", "STD"
            ));
            for group in groups {
                out.push_str(&format!(
                    "{:<20} {:<20} {:>10.4} {:>10.4} {:>10.4}\n",
                    group.model, group.metric, group.mean, group.median, group.std
                ));
            }
            out
        }
        EvalReport::PerQuery { records } => format_per_query(records),
    }
}

fn format_per_query(records: &[QueryRecord]) -> String {
    // Column set is the union of metric names across records; records from
    // a single run always share the same set, but don't assume it.
    let columns: BTreeSet<&str> = records
        .iter()
        .flat_map(|r| r.metrics.keys().map(String::as_str))
        .collect();

    let mut out = String::new();
    out.push_str(&format!("{:<20} {:<16}", "MODEL", "QUERY"));
    for column in &columns {
        out.push_str(&format!(" {:>18}", column));
    }
    out.push('\n');

    for record in records {
        out.push_str(&format!("{:<20} {:<16}", record.model, record.query_id));
        for column in &columns {
            match record.metrics.get(*column) {
                Some(value) => out.push_str(&format!(" {:>18.4}", value)),
                None => out.push_str(&format!(" {:>18}", "-")),
            }
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ranklab_core::evaluation::MetricSummary;

    #[test]
    fn test_format_summary_table() {
        let report = EvalReport::Summary {
            groups: vec![MetricSummary {
                model: "weakand".to_string(),
                metric: "recall_10".to_string(),
                mean: 0.75,
                median: 0.75,
                std: 0.25,
            }],
        };
        let text = format_human(&report);
        assert!(text.contains("MODEL"));
        assert!(text.contains("weakand"));
        assert!(text.contains("0.7500"));
    }

    #[test]
    fn test_format_per_query_table() {
        let report = EvalReport::PerQuery {
            records: vec![QueryRecord {
                model: "or".to_string(),
                query_id: "q1".to_string(),
                metrics: [("ndcg_10".to_string(), 0.5)].into_iter().collect(),
            }],
        };
        let text = format_human(&report);
        assert!(text.contains("ndcg_10"));
        assert!(text.contains("q1"));
        assert!(text.contains("0.5000"));
    }

    #[test]
    fn test_format_json_round_trips() {
        let report = EvalReport::PerQuery { records: vec![] };
        let json = format_json(&report);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["kind"], "per_query");
    }
}
