//! Graph abstraction layer for backend-agnostic database access.
//!
//! Application code talks to the database through a small hierarchy of
//! traits so the repository can be exercised against a scripted client in
//! tests and against Neo4j in production.
//!
//! # Architecture
//!
//! - [`CypherExecutor`] - Execute Cypher queries
//! - [`Transaction`] - Transaction lifecycle (commit/rollback)
//! - [`GraphClient`] - Connection management and transaction creation
//! - [`Graph`] - Runs one unit of work per read or write transaction
//!
//! # Usage
//!
//! ```ignore
//! use knowledge_manager::graph::{CallContext, Graph, QueryExt};
//!
//! let graph = Graph::new(client);
//!
//! // Auto-commit query
//! graph.query("RETURN 1 AS ok").run().await?;
//!
//! // Unit of work inside a write transaction
//! let id = graph
//!     .write(&ctx, move |tx| {
//!         Box::pin(async move {
//!             let row = tx
//!                 .query("CREATE (n:Node {id: randomUUID()}) RETURN n.id AS id")
//!                 .fetch_one()
//!                 .await?;
//!             Ok(row)
//!         })
//!     })
//!     .await?;
//! ```

mod call;
mod cypher;
mod macros;
mod query;
mod row;
mod traits;

pub mod backends;

#[cfg(test)]
pub(crate) mod testing;

// Re-export core types
pub use call::CallContext;
pub use cypher::{extract_return_columns, ParseError};
pub use query::{Query, QueryExt};
pub use row::{Params, Row, RowStream};
pub use traits::{AccessMode, CypherExecutor, GraphClient, Transaction};

// Re-export macro (defined at crate root via #[macro_export])
#[doc(inline)]
pub use crate::cypher;

// --- Graph wrapper struct ---

use futures::future::BoxFuture;

use crate::error::AppError;

/// High-level wrapper providing a convenient API for graph operations.
///
/// `Graph` wraps any [`GraphClient`] and provides:
/// - Direct queries (auto-commit per query)
/// - Units of work run inside a read or write transaction, raced against
///   the caller's [`CallContext`]
pub struct Graph<C: GraphClient> {
    client: C,
}

impl<C: GraphClient> Graph<C> {
    /// Creates a new graph wrapper around the given client.
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Creates a query builder for a direct (auto-commit) query.
    ///
    /// Each query executes in its own implicit transaction.
    pub fn query(&self, cypher: &str) -> Query<'_, C> {
        Query::new(&self.client, cypher)
    }

    /// Runs `work` inside a read transaction.
    ///
    /// The transaction is always rolled back, whatever the outcome.
    pub async fn read<R, F>(&self, ctx: &CallContext, work: F) -> Result<R, AppError>
    where
        R: Send,
        F: for<'t> FnOnce(&'t C::Tx) -> BoxFuture<'t, Result<R, AppError>> + Send,
    {
        self.unit_of_work(ctx, AccessMode::Read, work).await
    }

    /// Runs `work` inside a write transaction.
    ///
    /// Commits when `work` succeeds; rolls back on error, cancellation or
    /// deadline expiry.
    ///
    /// # Example
    ///
    /// ```ignore
    /// graph
    ///     .write(&ctx, move |tx| {
    ///         Box::pin(async move {
    ///             tx.query("MATCH (n:Node {id: $id}) DETACH DELETE n")
    ///                 .param("id", id)
    ///                 .run()
    ///                 .await
    ///         })
    ///     })
    ///     .await?;
    /// ```
    pub async fn write<R, F>(&self, ctx: &CallContext, work: F) -> Result<R, AppError>
    where
        R: Send,
        F: for<'t> FnOnce(&'t C::Tx) -> BoxFuture<'t, Result<R, AppError>> + Send,
    {
        self.unit_of_work(ctx, AccessMode::Write, work).await
    }

    async fn unit_of_work<R, F>(
        &self,
        ctx: &CallContext,
        mode: AccessMode,
        work: F,
    ) -> Result<R, AppError>
    where
        R: Send,
        F: for<'t> FnOnce(&'t C::Tx) -> BoxFuture<'t, Result<R, AppError>> + Send,
    {
        if let Some(err) = ctx.err() {
            return Err(err);
        }

        let tx = tokio::select! {
            biased;
            err = ctx.done() => return Err(err),
            tx = self.client.begin(mode) => tx?,
        };

        let outcome = tokio::select! {
            biased;
            err = ctx.done() => Err(err),
            result = work(&tx) => result,
        };

        match (mode, outcome) {
            (AccessMode::Write, Ok(value)) => {
                tx.commit().await?;
                Ok(value)
            }
            (_, outcome) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::warn!(%mode, error = %rollback_err, "rollback failed");
                }
                outcome
            }
        }
    }
}

// Forward CypherExecutor to the underlying client for convenience
#[async_trait::async_trait]
impl<C: GraphClient> CypherExecutor for Graph<C> {
    async fn execute_cypher(
        &self,
        cypher: &str,
        params: Params,
    ) -> Result<RowStream<'_>, AppError> {
        self.client.execute_cypher(cypher, params).await
    }

    async fn run_cypher(&self, cypher: &str, params: Params) -> Result<(), AppError> {
        self.client.run_cypher(cypher, params).await
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{row, ScriptedClient};
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    #[tokio::test]
    async fn test_write_commits_on_success() {
        let client = ScriptedClient::new();
        client.reply(vec![row([("id", json!("n-1"))])]);
        let graph = Graph::new(client.clone());

        let id: String = graph
            .write(&CallContext::background(), |tx| {
                Box::pin(async move {
                    let row = tx.query("RETURN 'n-1' AS id").fetch_one().await?;
                    row.ok_or_else(|| AppError::Internal("no row".into()))?
                        .get("id")
                })
            })
            .await
            .unwrap();

        assert_eq!(id, "n-1");
        assert_eq!(client.commits(), 1);
        assert_eq!(client.rollbacks(), 0);
        assert_eq!(client.begins(), vec![AccessMode::Write]);
    }

    #[tokio::test]
    async fn test_write_rolls_back_on_error() {
        let client = ScriptedClient::new();
        client.fail(AppError::query("boom", "CREATE (n)"));
        let graph = Graph::new(client.clone());

        let err = graph
            .write(&CallContext::background(), |tx| {
                Box::pin(async move { tx.query("CREATE (n)").run().await })
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Query { .. }));
        assert_eq!(client.commits(), 0);
        assert_eq!(client.rollbacks(), 1);
    }

    #[tokio::test]
    async fn test_read_never_commits() {
        let client = ScriptedClient::new();
        let graph = Graph::new(client.clone());

        let rows = graph
            .read(&CallContext::background(), |tx| {
                Box::pin(async move { tx.query("MATCH (n) RETURN n.id AS id").fetch_all().await })
            })
            .await
            .unwrap();

        assert!(rows.is_empty());
        assert_eq!(client.commits(), 0);
        assert_eq!(client.rollbacks(), 1);
        assert_eq!(client.begins(), vec![AccessMode::Read]);
    }

    #[tokio::test]
    async fn test_cancelled_context_never_begins() {
        let client = ScriptedClient::new();
        let graph = Graph::new(client.clone());
        let ctx = CallContext::background();
        ctx.cancel();

        let err = graph
            .write(&ctx, |tx| Box::pin(async move { tx.query("CREATE (n)").run().await }))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Cancelled));
        assert!(client.begins().is_empty());
    }

    #[tokio::test]
    async fn test_deadline_aborts_hanging_work_and_rolls_back() {
        let client = ScriptedClient::new();
        client.hang();
        let graph = Graph::new(client.clone());
        let ctx = CallContext::with_timeout(Duration::from_millis(20));

        let err = graph
            .write(&ctx, |tx| Box::pin(async move { tx.query("CREATE (n)").run().await }))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::DeadlineExceeded));
        assert_eq!(client.commits(), 0);
        assert_eq!(client.rollbacks(), 1);
    }

    #[tokio::test]
    async fn test_cancellation_during_work() {
        let client = ScriptedClient::new();
        client.hang();
        let graph = Graph::new(client.clone());
        let ctx = CallContext::background();
        let canceller = ctx.clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            canceller.cancel();
        });

        let err = graph
            .write(&ctx, |tx| Box::pin(async move { tx.query("CREATE (n)").run().await }))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Cancelled));
        assert_eq!(client.rollbacks(), 1);
    }

    #[tokio::test]
    async fn test_rollback_failure_keeps_original_error() {
        let client = ScriptedClient::new();
        client.fail(AppError::Validation("bad input".into()));
        client.fail_rollback();
        let graph = Graph::new(client.clone());

        let err = graph
            .write(&CallContext::background(), |tx| {
                Box::pin(async move { tx.query("CREATE (n)").run().await })
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_auto_commit_query_bypasses_transactions() {
        let client = ScriptedClient::new();
        let graph = Graph::new(client.clone());

        graph.query("RETURN 1 AS ok").run().await.unwrap();

        assert!(client.begins().is_empty());
        assert_eq!(client.statements()[0].0, "RETURN 1 AS ok");
    }
}
