//! Domain models for the knowledge graph.

mod node;
mod relationship;
mod search;

pub use node::{Node, NodeType};
pub use relationship::{RelationType, Relationship};
pub use search::SearchCriteria;
