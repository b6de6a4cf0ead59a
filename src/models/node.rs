//! Node model representing typed entries in the knowledge graph.

use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The fixed set of node types.
///
/// Each type doubles as a structural label on the stored `:Node`, so the label
/// text must come from [`NodeType::label`] and never from caller input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeType {
    Concept,
    Note,
    Reference,
}

impl NodeType {
    /// The Cypher label (and stored `type` property) for this node type.
    pub fn label(&self) -> &'static str {
        match self {
            NodeType::Concept => "CONCEPT",
            NodeType::Note => "NOTE",
            NodeType::Reference => "REFERENCE",
        }
    }

    /// Returns a static slice of all node types.
    pub fn all() -> &'static [NodeType] {
        &[NodeType::Concept, NodeType::Note, NodeType::Reference]
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for NodeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeType::all()
            .iter()
            .copied()
            .find(|t| t.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                format!(
                    "Invalid node type '{}'. Valid values: CONCEPT, NOTE, REFERENCE",
                    s
                )
            })
    }
}

/// A node in the knowledge graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Server-generated identifier; empty until the node is stored.
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Tag names; duplicates collapse.
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl Node {
    /// Creates an unsaved node. Identifier and timestamps are assigned by the store.
    pub fn new(title: impl Into<String>, content: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            id: String::new(),
            title: title.into(),
            content: content.into(),
            node_type,
            created_at: None,
            updated_at: None,
            tags: BTreeSet::new(),
        }
    }

    /// Builder-style helper to set the tag set.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Builder-style helper to set the identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Tags as a list, in the order they are bound to Cypher parameters.
    pub fn tag_list(&self) -> Vec<String> {
        self.tags.iter().cloned().collect()
    }
}
