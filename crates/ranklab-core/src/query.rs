//! Query models: named ranking configurations and the request builder.
//!
//! A [`QueryModel`] pairs a match specification (which documents enter the
//! match phase) with a ranking profile (how matched documents are ordered).
//! Match specifications form a closed enum: each variant contributes a
//! where-clause fragment and optional query properties, and the builder
//! combines them into the outbound request body. Adding a match kind means
//! adding a variant; the compiler then points at every site that must
//! handle it.
//!
//! # Example
//!
//! ```
//! use ranklab_core::query::{MatchSpec, QueryModel, RankProfile};
//!
//! let model = QueryModel::new(
//!     "weakand-bm25",
//!     MatchSpec::WeakAnd { hits: 100, field: "default".into() },
//!     RankProfile::named("bm25"),
//! ).unwrap();
//!
//! let body = model.request_body("total eclipse of the heart", 10, None);
//! assert!(body["yql"].as_str().unwrap().contains("weakAnd"));
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

fn default_weak_and_hits() -> usize {
    100
}

fn default_ann_hits() -> usize {
    10
}

fn default_field() -> String {
    "default".to_string()
}

/// Match-phase specification for a query model.
///
/// Each variant produces one fragment of the where clause. `Union` combines
/// fragments with `or`, widening the matched set; its query properties are
/// the merged properties of its operators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatchSpec {
    /// Match documents containing any query term
    Or,
    /// Match documents containing all query terms
    And,
    /// weakAnd operator: approximate OR with an upper bound on the
    /// number of documents exposed to ranking
    WeakAnd {
        /// targetNumHits annotation
        #[serde(default = "default_weak_and_hits")]
        hits: usize,
        /// Field each term is matched against
        #[serde(default = "default_field")]
        field: String,
    },
    /// Approximate nearest-neighbor match over a tensor field. The query
    /// vector is produced by the backend's configured embedder from the
    /// query text.
    Ann {
        /// Document-side tensor field
        doc_vector: String,
        /// Query-side tensor name
        query_vector: String,
        /// targetNumHits annotation
        #[serde(default = "default_ann_hits")]
        hits: usize,
        /// Optional label for rank-feature references; omitted when empty
        #[serde(default)]
        label: String,
    },
    /// Union of match specifications, combined with `or`
    Union {
        /// Operators whose matched sets are unioned
        operators: Vec<MatchSpec>,
    },
}

impl Default for MatchSpec {
    fn default() -> Self {
        MatchSpec::And
    }
}

impl MatchSpec {
    /// Checks annotation and field-name invariants, recursing into unions.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            MatchSpec::Or | MatchSpec::And => Ok(()),
            MatchSpec::WeakAnd { hits, .. } => {
                if *hits == 0 {
                    return Err(ConfigError::ZeroTargetHits);
                }
                Ok(())
            }
            MatchSpec::Ann {
                doc_vector,
                query_vector,
                hits,
                ..
            } => {
                if *hits == 0 {
                    return Err(ConfigError::ZeroTargetHits);
                }
                if doc_vector.is_empty() || query_vector.is_empty() {
                    return Err(ConfigError::EmptyTensorField);
                }
                Ok(())
            }
            MatchSpec::Union { operators } => {
                if operators.is_empty() {
                    return Err(ConfigError::EmptyUnion);
                }
                for op in operators {
                    op.validate()?;
                }
                Ok(())
            }
        }
    }

    /// Renders this specification's where-clause fragment for `query_text`.
    pub fn where_fragment(&self, query_text: &str) -> String {
        match self {
            MatchSpec::Or => r#"([{"grammar": "any"}]userInput(@userQuery))"#.to_string(),
            MatchSpec::And => "(userInput(@userQuery))".to_string(),
            MatchSpec::WeakAnd { hits, field } => {
                let terms: Vec<String> = query_text
                    .split_whitespace()
                    .map(|term| format!("{} contains \"{}\"", field, escape_term(term)))
                    .collect();
                format!(
                    "([{{\"targetNumHits\": {}}}]weakAnd({}))",
                    hits,
                    terms.join(", ")
                )
            }
            MatchSpec::Ann {
                doc_vector,
                query_vector,
                hits,
                label,
            } => {
                if label.is_empty() {
                    format!(
                        "([{{\"targetNumHits\": {}}}]nearestNeighbor({}, {}))",
                        hits, doc_vector, query_vector
                    )
                } else {
                    format!(
                        "([{{\"targetNumHits\": {}, \"label\": \"{}\"}}]nearestNeighbor({}, {}))",
                        hits, label, doc_vector, query_vector
                    )
                }
            }
            MatchSpec::Union { operators } => operators
                .iter()
                .map(|op| op.where_fragment(query_text))
                .collect::<Vec<_>>()
                .join(" or "),
        }
    }

    /// Query properties this specification adds to the request body.
    ///
    /// Properties are keyed by their wire name; unions merge operator
    /// properties, later operators winning on key collisions.
    pub fn query_properties(&self, query_text: &str) -> Map<String, Value> {
        let mut properties = Map::new();
        self.collect_properties(query_text, &mut properties);
        properties
    }

    fn collect_properties(&self, query_text: &str, out: &mut Map<String, Value>) {
        match self {
            MatchSpec::Or | MatchSpec::And => {
                out.insert("userQuery".to_string(), json!(query_text));
            }
            MatchSpec::WeakAnd { .. } => {}
            MatchSpec::Ann { query_vector, .. } => {
                out.insert("userQuery".to_string(), json!(query_text));
                out.insert(
                    format!("input.query({})", query_vector),
                    json!("embed(@userQuery)"),
                );
            }
            MatchSpec::Union { operators } => {
                for op in operators {
                    op.collect_properties(query_text, out);
                }
            }
        }
    }
}

/// Escapes a query term for embedding inside a quoted where-clause string.
fn escape_term(term: &str) -> String {
    term.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Ranking profile applied after the match phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankProfile {
    /// Profile name as configured on the backend
    pub name: String,
    /// Whether the backend should return computed rank features with each hit
    #[serde(default)]
    pub list_features: bool,
}

impl RankProfile {
    /// Profile with the given name and rank features disabled.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            list_features: false,
        }
    }
}

impl Default for RankProfile {
    fn default() -> Self {
        Self::named("default")
    }
}

/// A named ranking configuration: match specification plus ranking profile.
///
/// Models are immutable once constructed; the name keys result grouping in
/// evaluation reports, so it must be unique among the models of one batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryModel {
    /// Name used to key evaluation results
    pub name: String,
    /// Match-phase specification
    #[serde(default)]
    pub match_spec: MatchSpec,
    /// Ranking profile
    #[serde(default)]
    pub rank_profile: RankProfile,
}

impl QueryModel {
    /// Creates a validated query model.
    ///
    /// Fails fast on an empty name or a malformed match specification, so a
    /// model that constructs successfully can always be sent to the backend.
    pub fn new(
        name: impl Into<String>,
        match_spec: MatchSpec,
        rank_profile: RankProfile,
    ) -> Result<Self, ConfigError> {
        let model = Self {
            name: name.into(),
            match_spec,
            rank_profile,
        };
        model.validate()?;
        Ok(model)
    }

    /// Re-checks construction invariants (useful after deserializing).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.is_empty() {
            return Err(ConfigError::EmptyModelName);
        }
        self.match_spec.validate()
    }

    /// Builds the JSON request body for one query execution.
    ///
    /// `recall` restricts the matched set to the listed ids; used for
    /// controlled experiments where only a known candidate pool may match.
    pub fn request_body(
        &self,
        query_text: &str,
        hits: usize,
        recall: Option<&RecallRestriction>,
    ) -> Value {
        let mut body = Map::new();
        body.insert(
            "yql".to_string(),
            json!(format!(
                "select * from sources * where {};",
                self.match_spec.where_fragment(query_text)
            )),
        );
        body.insert("hits".to_string(), json!(hits));
        body.insert(
            "ranking".to_string(),
            json!({
                "profile": self.rank_profile.name,
                "listFeatures": self.rank_profile.list_features,
            }),
        );
        for (key, value) in self.match_spec.query_properties(query_text) {
            body.insert(key, value);
        }
        if let Some(restriction) = recall {
            body.insert("recall".to_string(), json!(restriction.to_recall_param()));
        }
        Value::Object(body)
    }
}

/// Restricts the matched set to an explicit list of document ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecallRestriction {
    /// Field holding the document identity on the backend
    pub field: String,
    /// Ids allowed to match
    pub doc_ids: Vec<String>,
}

impl RecallRestriction {
    /// Creates a restriction over `field` allowing only `doc_ids` to match.
    pub fn new(field: impl Into<String>, doc_ids: Vec<String>) -> Self {
        Self {
            field: field.into(),
            doc_ids,
        }
    }

    /// Renders the wire-level recall parameter, e.g. `+(id:0 id:3)`.
    pub fn to_recall_param(&self) -> String {
        let terms: Vec<String> = self
            .doc_ids
            .iter()
            .map(|id| format!("{}:{}", self.field, id))
            .collect();
        format!("+({})", terms.join(" "))
    }
}
