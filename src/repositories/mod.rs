//! Data access layer for graph operations.
//!
//! [`NodeRepository`] is the capability the rest of the application depends
//! on; [`GraphNodeRepository`] implements it with Cypher over any
//! [`GraphClient`](crate::graph::GraphClient).

mod node;
mod statements;

use async_trait::async_trait;

use crate::error::AppError;
use crate::graph::CallContext;
use crate::models::{Node, Relationship, SearchCriteria};

pub use node::GraphNodeRepository;

/// Persistence operations for nodes and relationships.
///
/// Every call runs as one unit of work bounded by the given [`CallContext`].
#[async_trait]
pub trait NodeRepository: Send + Sync {
    /// Stores a new node and returns its server-generated identifier.
    async fn create_node(&self, ctx: &CallContext, node: &Node) -> Result<String, AppError>;

    /// Loads a node with its tag set. Fails with [`AppError::NodeNotFound`].
    async fn get_node(&self, ctx: &CallContext, id: &str) -> Result<Node, AppError>;

    /// Replaces title, content, type and tags of an existing node.
    async fn update_node(&self, ctx: &CallContext, node: &Node) -> Result<(), AppError>;

    /// Deletes a node and every relationship touching it. Missing ids are a no-op.
    async fn delete_node(&self, ctx: &CallContext, id: &str) -> Result<(), AppError>;

    /// Creates one edge per target and returns their identifiers in target order.
    async fn create_relationship(
        &self,
        ctx: &CallContext,
        rel: &Relationship,
    ) -> Result<Vec<String>, AppError>;

    /// Deletes one edge by identifier. Missing ids are a no-op.
    async fn delete_relationship(&self, ctx: &CallContext, id: &str) -> Result<(), AppError>;

    async fn search_nodes(
        &self,
        ctx: &CallContext,
        query: &str,
        criteria: SearchCriteria,
    ) -> Result<Vec<Node>, AppError>;
}
