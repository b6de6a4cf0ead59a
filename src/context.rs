//! Application context holding shared dependencies.

use std::sync::Arc;

use crate::config::Config;
use crate::error::AppError;
use crate::graph::backends::neo4j::Neo4jClient;
use crate::graph::{CallContext, Graph};
use crate::repositories::GraphNodeRepository;
use crate::services::NodeService;
use crate::state::CachedNodeService;

/// Graph type used throughout the application.
pub type AppGraph = Arc<Graph<Neo4jClient>>;

/// Cached node service wired to the production repository.
pub type AppNodeCache = CachedNodeService<GraphNodeRepository<Neo4jClient>>;

/// Root application context.
///
/// Cheap to clone; every field is shared.
#[derive(Clone)]
pub struct Context {
    /// Neo4j graph wrapper.
    pub graph: AppGraph,
    /// Application configuration.
    pub config: Arc<Config>,
}

impl Context {
    /// Creates a new context with the given dependencies.
    pub fn new(graph: Graph<Neo4jClient>, config: Config) -> Self {
        Self {
            graph: Arc::new(graph),
            config: Arc::new(config),
        }
    }

    /// Connects to Neo4j and proves the connection before returning.
    pub async fn connect(config: Config) -> Result<Self, AppError> {
        tracing::info!("Connecting to Neo4j at {}", config.neo4j.uri);
        let client = Neo4jClient::connect(&config.neo4j).await?;
        client.verify_connectivity().await?;
        Ok(Self::new(Graph::new(client), config))
    }

    /// The node facade over the shared graph, with its client-side cache.
    pub fn cached_node_service(&self) -> AppNodeCache {
        CachedNodeService::new(NodeService::new(GraphNodeRepository::new(
            self.graph.clone(),
        )))
    }

    /// A fresh call context bounded by the configured repository timeout.
    pub fn call_context(&self) -> CallContext {
        match self.config.repository.timeout() {
            Some(timeout) => CallContext::with_timeout(timeout),
            None => CallContext::background(),
        }
    }
}
