//! Cypher-backed node repository.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::cypher;
use crate::error::AppError;
use crate::graph::{CallContext, Graph, GraphClient, QueryExt, Row};
use crate::models::{Node, NodeType, Relationship, SearchCriteria};
use crate::repositories::statements;
use crate::repositories::NodeRepository;

/// [`NodeRepository`] implementation issuing Cypher through a [`Graph`].
pub struct GraphNodeRepository<C: GraphClient> {
    graph: Arc<Graph<C>>,
}

impl<C: GraphClient> Clone for GraphNodeRepository<C> {
    fn clone(&self) -> Self {
        Self {
            graph: self.graph.clone(),
        }
    }
}

impl<C: GraphClient> GraphNodeRepository<C> {
    pub fn new(graph: Arc<Graph<C>>) -> Self {
        Self { graph }
    }

    /// Converts a row projected with the node columns into a [`Node`].
    fn row_to_node(row: &Row) -> Result<Node, AppError> {
        let type_label: String = row.get("type")?;
        let node_type: NodeType = type_label.parse().map_err(AppError::Internal)?;

        Ok(Node {
            id: row.get("id")?,
            title: row.get_opt("title")?.unwrap_or_default(),
            content: row.get_opt("content")?.unwrap_or_default(),
            node_type,
            created_at: Self::timestamp(row, "created_at")?,
            updated_at: Self::timestamp(row, "updated_at")?,
            tags: row
                .get_opt::<BTreeSet<String>>("tags")?
                .unwrap_or_default(),
        })
    }

    fn timestamp(row: &Row, column: &str) -> Result<Option<DateTime<Utc>>, AppError> {
        Ok(row
            .get_opt::<i64>(column)?
            .map(DateTime::<Utc>::from_timestamp_nanos))
    }
}

/// Source and targets in first-seen order, without repeats.
fn endpoint_ids(rel: &Relationship) -> Vec<String> {
    let mut seen = HashSet::new();
    std::iter::once(&rel.source_id)
        .chain(rel.target_ids.iter())
        .filter(|id| seen.insert(*id))
        .cloned()
        .collect()
}

/// Pairs created edges with the requested targets so the returned identifiers
/// follow the input target order. Repeated targets consume one edge each.
fn order_by_targets(targets: &[String], rows: Vec<Row>) -> Result<Vec<String>, AppError> {
    let created = rows.len();
    let mut by_target: HashMap<String, VecDeque<String>> = HashMap::new();
    for row in rows {
        let target: String = row.get("target_id")?;
        let id: String = row.get("id")?;
        by_target.entry(target).or_default().push_back(id);
    }

    targets
        .iter()
        .map(|target| {
            by_target
                .get_mut(target)
                .and_then(VecDeque::pop_front)
                .ok_or(AppError::PartialResult {
                    requested: targets.len(),
                    created,
                })
        })
        .collect()
}

#[async_trait]
impl<C: GraphClient> NodeRepository for GraphNodeRepository<C> {
    async fn create_node(&self, ctx: &CallContext, node: &Node) -> Result<String, AppError> {
        let cypher = statements::create_node(node.node_type);
        let title = node.title.clone();
        let content = node.content.clone();
        let node_type = node.node_type;
        let tags = node.tag_list();

        let id = self
            .graph
            .write(ctx, move |tx| {
                Box::pin(async move {
                    let row = tx
                        .query(&cypher)
                        .param("title", title)
                        .param("content", content)
                        .param("type", node_type.label())
                        .param("tags", tags)
                        .fetch_one()
                        .await?;
                    row.map(|row| row.get_opt::<String>("id"))
                        .transpose()?
                        .flatten()
                        .ok_or_else(|| AppError::query("no identifier returned", &cypher))
                })
            })
            .await?;

        tracing::debug!(id = %id, node_type = %node.node_type, "node created");
        Ok(id)
    }

    async fn get_node(&self, ctx: &CallContext, id: &str) -> Result<Node, AppError> {
        let cypher = statements::get_node();
        let node_id = id.to_string();

        let row = self
            .graph
            .read(ctx, move |tx| {
                Box::pin(async move { tx.query(&cypher).param("id", node_id).fetch_single().await })
            })
            .await?;

        match row {
            Some(row) => Self::row_to_node(&row),
            None => Err(AppError::NodeNotFound(id.to_string())),
        }
    }

    async fn update_node(&self, ctx: &CallContext, node: &Node) -> Result<(), AppError> {
        if node.id.is_empty() {
            return Err(AppError::Validation(
                "node id is required for update".to_string(),
            ));
        }

        let cypher = statements::update_node(node.node_type);
        let id = node.id.clone();
        let title = node.title.clone();
        let content = node.content.clone();
        let node_type = node.node_type;
        let tags = node.tag_list();

        self.graph
            .write(ctx, move |tx| {
                Box::pin(async move {
                    let row = tx
                        .query(&cypher)
                        .param("id", &id)
                        .param("title", title)
                        .param("content", content)
                        .param("type", node_type.label())
                        .param("tags", tags)
                        .fetch_one()
                        .await?;
                    match row {
                        Some(_) => Ok(()),
                        None => Err(AppError::NodeNotFound(id)),
                    }
                })
            })
            .await?;

        tracing::debug!(id = %node.id, "node updated");
        Ok(())
    }

    async fn delete_node(&self, ctx: &CallContext, id: &str) -> Result<(), AppError> {
        let node_id = id.to_string();

        self.graph
            .write(ctx, move |tx| {
                Box::pin(async move {
                    cypher!(tx, statements::DELETE_NODE, id = node_id)
                        .run()
                        .await
                })
            })
            .await?;

        tracing::debug!(id = %id, "node deleted");
        Ok(())
    }

    async fn create_relationship(
        &self,
        ctx: &CallContext,
        rel: &Relationship,
    ) -> Result<Vec<String>, AppError> {
        if rel.source_id.is_empty() {
            return Err(AppError::Validation(
                "relationship source id is required".to_string(),
            ));
        }
        if rel.target_ids.is_empty() {
            return Err(AppError::Validation(
                "relationship needs at least one target".to_string(),
            ));
        }

        let cypher = statements::create_relationship(rel.rel_type);
        let endpoints = endpoint_ids(rel);
        let source_id = rel.source_id.clone();
        let targets = rel.target_ids.clone();
        let description = rel.description.clone();

        let ids = self
            .graph
            .write(ctx, move |tx| {
                Box::pin(async move {
                    let existing = tx
                        .query(statements::EXISTING_NODES)
                        .param("ids", &endpoints)
                        .fetch_all()
                        .await?
                        .iter()
                        .map(|row| row.get::<String>("id"))
                        .collect::<Result<HashSet<_>, _>>()?;

                    let missing: Vec<String> = endpoints
                        .into_iter()
                        .filter(|id| !existing.contains(id))
                        .collect();
                    if !missing.is_empty() {
                        return Err(AppError::MissingNodes(missing));
                    }

                    let rows = tx
                        .query(&cypher)
                        .param("source_id", source_id)
                        .param("target_ids", &targets)
                        .param("description", description)
                        .fetch_all()
                        .await?;
                    order_by_targets(&targets, rows)
                })
            })
            .await?;

        tracing::debug!(
            source = %rel.source_id,
            rel_type = %rel.rel_type,
            count = ids.len(),
            "relationships created"
        );
        Ok(ids)
    }

    async fn delete_relationship(&self, ctx: &CallContext, id: &str) -> Result<(), AppError> {
        let rel_id = id.to_string();

        self.graph
            .write(ctx, move |tx| {
                Box::pin(async move {
                    tx.query(statements::DELETE_RELATIONSHIP)
                        .param("id", rel_id)
                        .run()
                        .await
                })
            })
            .await?;

        tracing::debug!(id = %id, "relationship deleted");
        Ok(())
    }

    async fn search_nodes(
        &self,
        ctx: &CallContext,
        query: &str,
        criteria: SearchCriteria,
    ) -> Result<Vec<Node>, AppError> {
        let cypher = statements::search_nodes(criteria);
        let needle = query.to_lowercase();

        let rows = self
            .graph
            .read(ctx, move |tx| {
                Box::pin(async move {
                    let mut q = tx.query(&cypher);
                    if statements::uses_query(criteria) {
                        q = q.param("query", needle);
                    }
                    q.fetch_all().await
                })
            })
            .await?;

        tracing::debug!(%criteria, results = rows.len(), "search finished");
        rows.iter().map(Self::row_to_node).collect()
    }
}
