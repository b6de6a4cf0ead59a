//! Node service decorated with an identifier-keyed client cache.

use tokio::sync::RwLock;

use crate::error::AppError;
use crate::graph::CallContext;
use crate::models::{Node, Relationship, SearchCriteria};
use crate::repositories::NodeRepository;
use crate::services::NodeService;
use crate::state::reducer::{reduce, GraphEvent, GraphState};

/// Wraps a [`NodeService`] and keeps a [`GraphState`] in step with every
/// successful call. Failed calls leave the cache untouched.
pub struct CachedNodeService<R: NodeRepository> {
    service: NodeService<R>,
    state: RwLock<GraphState>,
}

impl<R: NodeRepository> CachedNodeService<R> {
    pub fn new(service: NodeService<R>) -> Self {
        Self {
            service,
            state: RwLock::new(GraphState::default()),
        }
    }

    /// A copy of the current cache.
    pub async fn snapshot(&self) -> GraphState {
        self.state.read().await.clone()
    }

    async fn apply(&self, event: GraphEvent) {
        let mut state = self.state.write().await;
        let current = std::mem::take(&mut *state);
        *state = reduce(current, event);
    }

    /// Creates the node, then caches the stored version (with its server
    /// assigned id and timestamps).
    ///
    /// The write has committed once the id is known, so a failed re-read only
    /// degrades the cached copy to the caller's node without timestamps.
    pub async fn create_node(&self, ctx: &CallContext, node: &Node) -> Result<String, AppError> {
        let id = self.service.create_node(ctx, node).await?;
        let cached = self
            .stored_or(ctx, &id, || node.clone().with_id(id.clone()))
            .await;
        self.apply(GraphEvent::NodeCreated(cached)).await;
        Ok(id)
    }

    pub async fn get_node(&self, ctx: &CallContext, id: &str) -> Result<Node, AppError> {
        let node = self.service.get_node(ctx, id).await?;
        self.apply(GraphEvent::NodeUpdated(node.clone())).await;
        Ok(node)
    }

    pub async fn update_node(&self, ctx: &CallContext, node: &Node) -> Result<(), AppError> {
        self.service.update_node(ctx, node).await?;
        let cached = self.stored_or(ctx, &node.id, || node.clone()).await;
        self.apply(GraphEvent::NodeUpdated(cached)).await;
        Ok(())
    }

    /// Re-reads a node after a committed write, falling back to `written`.
    async fn stored_or(
        &self,
        ctx: &CallContext,
        id: &str,
        written: impl FnOnce() -> Node,
    ) -> Node {
        match self.service.get_node(ctx, id).await {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(id, error = %e, "Cache refresh failed after write");
                written()
            }
        }
    }

    pub async fn delete_node(&self, ctx: &CallContext, id: &str) -> Result<(), AppError> {
        self.service.delete_node(ctx, id).await?;
        self.apply(GraphEvent::NodeDeleted(id.to_string())).await;
        Ok(())
    }

    pub async fn create_relationship(
        &self,
        ctx: &CallContext,
        rel: &Relationship,
    ) -> Result<Vec<String>, AppError> {
        let ids = self.service.create_relationship(ctx, rel).await?;
        self.apply(GraphEvent::RelationshipsCreated {
            rel: rel.clone(),
            ids: ids.clone(),
        })
        .await;
        Ok(ids)
    }

    pub async fn delete_relationship(&self, ctx: &CallContext, id: &str) -> Result<(), AppError> {
        self.service.delete_relationship(ctx, id).await?;
        self.apply(GraphEvent::RelationshipDeleted(id.to_string()))
            .await;
        Ok(())
    }

    /// Runs the search and makes its results the cached node set.
    pub async fn search_nodes(
        &self,
        ctx: &CallContext,
        query: &str,
        criteria: SearchCriteria,
    ) -> Result<Vec<Node>, AppError> {
        let nodes = self.service.search_nodes(ctx, query, criteria).await?;
        self.apply(GraphEvent::NodesLoaded(nodes.clone())).await;
        Ok(nodes)
    }
}
