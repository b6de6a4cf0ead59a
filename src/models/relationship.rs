//! Relationship model for typed, directed edges between nodes.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The fixed set of relationship types.
///
/// The Cypher relationship type is taken from [`RelationType::label`] only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationType {
    RelatedTo,
    References,
    IsPartOf,
    HasPart,
    DependsOn,
    IsPrecededBy,
}

impl RelationType {
    /// The Cypher relationship type for this variant.
    pub fn label(&self) -> &'static str {
        match self {
            RelationType::RelatedTo => "RELATED_TO",
            RelationType::References => "REFERENCES",
            RelationType::IsPartOf => "IS_PART_OF",
            RelationType::HasPart => "HAS_PART",
            RelationType::DependsOn => "DEPENDS_ON",
            RelationType::IsPrecededBy => "IS_PRECEDED_BY",
        }
    }

    /// Returns a static slice of all relationship types.
    pub fn all() -> &'static [RelationType] {
        &[
            RelationType::RelatedTo,
            RelationType::References,
            RelationType::IsPartOf,
            RelationType::HasPart,
            RelationType::DependsOn,
            RelationType::IsPrecededBy,
        ]
    }
}

impl std::fmt::Display for RelationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RelationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RelationType::all()
            .iter()
            .copied()
            .find(|t| t.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let valid: Vec<&str> = RelationType::all().iter().map(|t| t.label()).collect();
                format!(
                    "Invalid relationship type '{}'. Valid values: {}",
                    s,
                    valid.join(", ")
                )
            })
    }
}

/// A relationship creation request, or one stored edge.
///
/// A request may fan out to several targets; each stored edge has exactly one
/// target and its own identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(default)]
    pub id: String,
    pub source_id: String,
    pub target_ids: Vec<String>,
    #[serde(rename = "type")]
    pub rel_type: RelationType,
    #[serde(default)]
    pub description: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl Relationship {
    /// Creates a relationship request from `source_id` to every id in `target_ids`.
    pub fn new<I, S>(source_id: impl Into<String>, target_ids: I, rel_type: RelationType) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: String::new(),
            source_id: source_id.into(),
            target_ids: target_ids.into_iter().map(Into::into).collect(),
            rel_type,
            description: String::new(),
            created_at: None,
        }
    }

    /// Builder-style helper to set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}
