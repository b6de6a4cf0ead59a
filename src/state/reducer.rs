//! Pure state transitions for the client-side graph view.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{Node, RelationType, Relationship};

/// One directed edge as seen by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub id: String,
    pub source_id: String,
    pub target_id: String,
    #[serde(rename = "type")]
    pub rel_type: RelationType,
    pub description: String,
}

/// Identifier-keyed snapshot of everything the client knows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphState {
    pub nodes: BTreeMap<String, Node>,
    pub edges: BTreeMap<String, Edge>,
}

impl GraphState {
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Edges leaving or entering the given node.
    pub fn edges_of<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges
            .values()
            .filter(move |e| e.source_id == node_id || e.target_id == node_id)
    }
}

/// Something that happened to the stored graph.
#[derive(Debug, Clone)]
pub enum GraphEvent {
    /// A fresh node set replaces the cached one.
    NodesLoaded(Vec<Node>),
    NodeCreated(Node),
    NodeUpdated(Node),
    NodeDeleted(String),
    /// Edges created by one request; `ids` pair up with `rel.target_ids`.
    RelationshipsCreated {
        rel: Relationship,
        ids: Vec<String>,
    },
    RelationshipDeleted(String),
}

/// Applies `event` to `state`.
pub fn reduce(mut state: GraphState, event: GraphEvent) -> GraphState {
    match event {
        GraphEvent::NodesLoaded(nodes) => {
            state.nodes = nodes.into_iter().map(|n| (n.id.clone(), n)).collect();
            let nodes = &state.nodes;
            state
                .edges
                .retain(|_, e| nodes.contains_key(&e.source_id) && nodes.contains_key(&e.target_id));
        }
        GraphEvent::NodeCreated(node) | GraphEvent::NodeUpdated(node) => {
            state.nodes.insert(node.id.clone(), node);
        }
        GraphEvent::NodeDeleted(id) => {
            state.nodes.remove(&id);
            state
                .edges
                .retain(|_, e| e.source_id != id && e.target_id != id);
        }
        GraphEvent::RelationshipsCreated { rel, ids } => {
            for (id, target) in ids.into_iter().zip(rel.target_ids.iter()) {
                let edge = Edge {
                    id: id.clone(),
                    source_id: rel.source_id.clone(),
                    target_id: target.clone(),
                    rel_type: rel.rel_type,
                    description: rel.description.clone(),
                };
                state.edges.insert(id, edge);
            }
        }
        GraphEvent::RelationshipDeleted(id) => {
            state.edges.remove(&id);
        }
    }
    state
}
