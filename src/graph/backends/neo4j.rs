//! Neo4j backend over the Bolt protocol.
//!
//! # Example
//!
//! ```ignore
//! use knowledge_manager::graph::backends::neo4j::Neo4jClient;
//! use knowledge_manager::graph::{Graph, QueryExt};
//!
//! let client = Neo4jClient::connect(&config.neo4j).await?;
//! let graph = Graph::new(client);
//!
//! let rows = graph.query("MATCH (n:Node) RETURN n.id AS id")
//!     .fetch_all()
//!     .await?;
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use neo4rs::{BoltNull, BoltType, ConfigBuilder, Txn};
use serde_json::Value as JsonValue;
use tokio::sync::Mutex;

use crate::config::Neo4jConfig;
use crate::error::AppError;
use crate::graph::cypher::{extract_return_columns, ParseError};
use crate::graph::row::{Params, Row, RowStream};
use crate::graph::traits::{AccessMode, CypherExecutor, GraphClient, Transaction};

/// Neo4j graph client.
///
/// Wraps the driver's connection pool. This type is cheap to clone.
#[derive(Clone)]
pub struct Neo4jClient {
    graph: neo4rs::Graph,
}

impl Neo4jClient {
    /// Connects to Neo4j using the given settings.
    pub async fn connect(config: &Neo4jConfig) -> Result<Self, AppError> {
        let mut builder = ConfigBuilder::default()
            .uri(config.uri.as_str())
            .user(config.user.as_str())
            .password(config.password.as_deref().unwrap_or_default())
            .max_connections(config.max_connections)
            .fetch_size(config.fetch_size);
        if let Some(database) = &config.database {
            builder = builder.db(database.as_str());
        }
        let driver_config = builder.build().map_err(AppError::Connection)?;

        let graph = neo4rs::Graph::connect(driver_config)
            .await
            .map_err(AppError::Connection)?;
        tracing::info!(uri = %config.uri, "connected to neo4j");

        Ok(Self { graph })
    }

    /// Round-trips a trivial statement to prove the server is reachable.
    pub async fn verify_connectivity(&self) -> Result<(), AppError> {
        self.graph
            .run(neo4rs::query("RETURN 1 AS ok"))
            .await
            .map_err(AppError::Connection)
    }
}

#[async_trait]
impl CypherExecutor for Neo4jClient {
    async fn execute_cypher(
        &self,
        cypher: &str,
        params: Params,
    ) -> Result<RowStream<'_>, AppError> {
        use async_stream::try_stream;

        let columns = match result_columns(cypher)? {
            Some(columns) => columns,
            None => {
                self.run_cypher(cypher, params).await?;
                return Ok(Box::pin(futures::stream::empty()));
            }
        };
        let q = build_query(cypher, params)?;
        let cypher = cypher.to_string();
        let graph = self.graph.clone();

        Ok(Box::pin(try_stream! {
            let mut stream = graph
                .execute(q)
                .await
                .map_err(|e| AppError::query(e, &cypher))?;
            while let Some(row) = stream.next().await.map_err(|e| AppError::query(e, &cypher))? {
                yield convert_row(&row, &columns)?;
            }
        }))
    }

    async fn run_cypher(&self, cypher: &str, params: Params) -> Result<(), AppError> {
        let q = build_query(cypher, params)?;
        self.graph
            .run(q)
            .await
            .map_err(|e| AppError::query(e, cypher))
    }
}

#[async_trait]
impl GraphClient for Neo4jClient {
    type Tx = Neo4jTransaction;

    async fn begin(&self, mode: AccessMode) -> Result<Self::Tx, AppError> {
        let txn = self
            .graph
            .start_txn()
            .await
            .map_err(|e| AppError::query(e, "BEGIN"))?;
        tracing::debug!(%mode, "transaction started");

        Ok(Neo4jTransaction {
            txn: Mutex::new(Some(txn)),
            mode,
            finished: false,
            interrupted: AtomicBool::new(false),
        })
    }
}

/// An explicit Neo4j transaction.
///
/// The driver needs exclusive access to the transaction while a statement
/// runs, so statements are serialized through a mutex and their rows are
/// collected before the lock is released. The transaction must be committed
/// or rolled back; dropping it unfinished logs a warning and leaves the
/// server to roll it back.
///
/// A statement whose future is dropped before its results are consumed (a
/// cancelled or expired call) leaves the Bolt connection mid-stream, where a
/// `ROLLBACK` would be rejected. Such a transaction is rolled back by
/// discarding it instead: the pool resets the connection on reuse, which
/// ends the server-side transaction.
pub struct Neo4jTransaction {
    txn: Mutex<Option<Txn>>,
    mode: AccessMode,
    finished: bool,
    interrupted: AtomicBool,
}

impl Neo4jTransaction {
    fn closed() -> AppError {
        AppError::Internal("transaction already finished".to_string())
    }
}

#[async_trait]
impl CypherExecutor for Neo4jTransaction {
    async fn execute_cypher(
        &self,
        cypher: &str,
        params: Params,
    ) -> Result<RowStream<'_>, AppError> {
        let columns = match result_columns(cypher)? {
            Some(columns) => columns,
            None => {
                self.run_cypher(cypher, params).await?;
                return Ok(Box::pin(futures::stream::empty()));
            }
        };
        let q = build_query(cypher, params)?;

        let mut guard = self.txn.lock().await;
        let txn = guard.as_mut().ok_or_else(Self::closed)?;
        let pending = PendingResult::start(&self.interrupted);
        let mut stream = txn.execute(q).await.map_err(|e| AppError::query(e, cypher))?;

        let mut rows = Vec::new();
        while let Some(row) = stream
            .next(txn.handle())
            .await
            .map_err(|e| AppError::query(e, cypher))?
        {
            rows.push(convert_row(&row, &columns));
        }
        pending.consumed();

        Ok(Box::pin(futures::stream::iter(rows)))
    }

    async fn run_cypher(&self, cypher: &str, params: Params) -> Result<(), AppError> {
        let q = build_query(cypher, params)?;
        let mut guard = self.txn.lock().await;
        let txn = guard.as_mut().ok_or_else(Self::closed)?;
        let pending = PendingResult::start(&self.interrupted);
        txn.run(q).await.map_err(|e| AppError::query(e, cypher))?;
        pending.consumed();
        Ok(())
    }
}

#[async_trait]
impl Transaction for Neo4jTransaction {
    async fn commit(mut self) -> Result<(), AppError> {
        self.finished = true;
        let txn = self.txn.lock().await.take().ok_or_else(Self::closed)?;
        txn.commit()
            .await
            .map_err(|e| AppError::query(e, "COMMIT"))?;
        tracing::debug!(mode = %self.mode, "transaction committed");
        Ok(())
    }

    async fn rollback(mut self) -> Result<(), AppError> {
        self.finished = true;
        let txn = self.txn.lock().await.take().ok_or_else(Self::closed)?;
        if self.interrupted.load(Ordering::Acquire) {
            drop(txn);
            tracing::debug!(mode = %self.mode, "interrupted transaction discarded");
            return Ok(());
        }
        txn.rollback()
            .await
            .map_err(|e| AppError::query(e, "ROLLBACK"))?;
        tracing::debug!(mode = %self.mode, "transaction rolled back");
        Ok(())
    }
}

impl Drop for Neo4jTransaction {
    fn drop(&mut self) {
        if !self.finished {
            tracing::warn!(
                mode = %self.mode,
                "Neo4jTransaction dropped without commit or rollback"
            );
        }
    }
}

/// Marks a statement whose results are still on the wire.
///
/// The flag is set on creation and cleared only by [`PendingResult::consumed`],
/// so a statement abandoned mid-stream (or failed by the server) stays marked.
struct PendingResult<'a> {
    flag: &'a AtomicBool,
}

impl<'a> PendingResult<'a> {
    fn start(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Release);
        Self { flag }
    }

    fn consumed(self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Column names a statement returns, or `None` for statements without RETURN.
fn result_columns(cypher: &str) -> Result<Option<Vec<String>>, AppError> {
    match extract_return_columns(cypher) {
        Ok(columns) => Ok(Some(columns)),
        Err(ParseError::NoReturnClause) => Ok(None),
        Err(ParseError::ReturnStarNotSupported) => Err(AppError::Internal(
            "RETURN * is not supported - please specify columns explicitly".into(),
        )),
        Err(ParseError::InvalidSyntax(msg)) => {
            Err(AppError::Internal(format!("Cypher syntax error: {}", msg)))
        }
    }
}

/// Builds a driver query with every parameter converted to a Bolt value.
fn build_query(cypher: &str, params: Params) -> Result<neo4rs::Query, AppError> {
    params
        .into_iter()
        .try_fold(neo4rs::query(cypher), |q, (name, value)| {
            let bolt = json_to_bolt(value)
                .map_err(|msg| AppError::Internal(format!("parameter '{}': {}", name, msg)))?;
            Ok(q.param(&name, bolt))
        })
}

/// Converts a JSON parameter value to its Bolt counterpart.
///
/// Maps are rejected; statements receive structured data as separate scalar
/// or list parameters.
fn json_to_bolt(value: JsonValue) -> Result<BoltType, String> {
    match value {
        JsonValue::Null => Ok(BoltType::Null(BoltNull)),
        JsonValue::Bool(b) => Ok(BoltType::from(b)),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(BoltType::from(i))
            } else if let Some(f) = n.as_f64() {
                Ok(BoltType::from(f))
            } else {
                Err(format!("number out of range: {}", n))
            }
        }
        JsonValue::String(s) => Ok(BoltType::from(s)),
        JsonValue::Array(items) => items
            .into_iter()
            .map(json_to_bolt)
            .collect::<Result<Vec<_>, _>>()
            .map(BoltType::from),
        JsonValue::Object(_) => Err("map parameters are not supported".to_string()),
    }
}

/// Reads the named columns of a driver row into a JSON row.
fn convert_row(row: &neo4rs::Row, columns: &[String]) -> Result<Row, AppError> {
    let mut data = HashMap::with_capacity(columns.len());
    for column in columns {
        let value: JsonValue = row.get(column).map_err(|e| {
            AppError::Internal(format!("failed to read column '{}': {}", column, e))
        })?;
        data.insert(column.clone(), value);
    }
    Ok(Row::new(data))
}
