//! Node use cases.

use crate::error::AppError;
use crate::graph::CallContext;
use crate::models::{Node, Relationship, SearchCriteria};
use crate::repositories::NodeRepository;

/// Use-case facade over a [`NodeRepository`].
///
/// Arguments and results pass through unchanged; the facade is the seam
/// front ends depend on instead of the repository itself.
#[derive(Clone)]
pub struct NodeService<R: NodeRepository> {
    repository: R,
}

impl<R: NodeRepository> NodeService<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub async fn create_node(&self, ctx: &CallContext, node: &Node) -> Result<String, AppError> {
        self.repository.create_node(ctx, node).await
    }

    pub async fn get_node(&self, ctx: &CallContext, id: &str) -> Result<Node, AppError> {
        self.repository.get_node(ctx, id).await
    }

    pub async fn update_node(&self, ctx: &CallContext, node: &Node) -> Result<(), AppError> {
        self.repository.update_node(ctx, node).await
    }

    pub async fn delete_node(&self, ctx: &CallContext, id: &str) -> Result<(), AppError> {
        self.repository.delete_node(ctx, id).await
    }

    pub async fn create_relationship(
        &self,
        ctx: &CallContext,
        rel: &Relationship,
    ) -> Result<Vec<String>, AppError> {
        self.repository.create_relationship(ctx, rel).await
    }

    pub async fn delete_relationship(&self, ctx: &CallContext, id: &str) -> Result<(), AppError> {
        self.repository.delete_relationship(ctx, id).await
    }

    pub async fn search_nodes(
        &self,
        ctx: &CallContext,
        query: &str,
        criteria: SearchCriteria,
    ) -> Result<Vec<Node>, AppError> {
        self.repository.search_nodes(ctx, query, criteria).await
    }
}
