//! Scripted in-memory graph client for unit tests.
//!
//! Replies are queued up front and handed out in statement order, whether
//! the statement runs on the client or inside a transaction. Every statement,
//! begin, commit and rollback is recorded for assertions.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::error::AppError;
use crate::graph::row::{Params, Row, RowStream};
use crate::graph::traits::{AccessMode, CypherExecutor, GraphClient, Transaction};

pub(crate) enum Reply {
    Rows(Vec<Row>),
    Fail(AppError),
    Hang,
}

#[derive(Default)]
struct Script {
    replies: VecDeque<Reply>,
    statements: Vec<(String, Params)>,
    begins: Vec<AccessMode>,
    commits: usize,
    rollbacks: usize,
    fail_rollback: bool,
}

/// Builds a row from column/value pairs.
pub(crate) fn row<const N: usize>(pairs: [(&str, JsonValue); N]) -> Row {
    pairs.into_iter().collect()
}

#[derive(Clone, Default)]
pub(crate) struct ScriptedClient {
    script: Arc<Mutex<Script>>,
}

impl ScriptedClient {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn push(&self, reply: Reply) {
        self.script.lock().unwrap().replies.push_back(reply);
    }

    /// Queues the rows returned by the next statement.
    pub(crate) fn reply(&self, rows: Vec<Row>) {
        self.push(Reply::Rows(rows));
    }

    /// Queues an error for the next statement.
    pub(crate) fn fail(&self, err: AppError) {
        self.push(Reply::Fail(err));
    }

    /// Makes the next statement never complete.
    pub(crate) fn hang(&self) {
        self.push(Reply::Hang);
    }

    /// Makes every rollback report an error.
    pub(crate) fn fail_rollback(&self) {
        self.script.lock().unwrap().fail_rollback = true;
    }

    pub(crate) fn statements(&self) -> Vec<(String, Params)> {
        self.script.lock().unwrap().statements.clone()
    }

    pub(crate) fn begins(&self) -> Vec<AccessMode> {
        self.script.lock().unwrap().begins.clone()
    }

    pub(crate) fn commits(&self) -> usize {
        self.script.lock().unwrap().commits
    }

    pub(crate) fn rollbacks(&self) -> usize {
        self.script.lock().unwrap().rollbacks
    }
}

async fn answer(script: &Mutex<Script>, cypher: &str, params: Params) -> Result<Vec<Row>, AppError> {
    let reply = {
        let mut script = script.lock().unwrap();
        script.statements.push((cypher.to_string(), params));
        script.replies.pop_front()
    };
    match reply {
        None => Ok(Vec::new()),
        Some(Reply::Rows(rows)) => Ok(rows),
        Some(Reply::Fail(err)) => Err(err),
        Some(Reply::Hang) => std::future::pending().await,
    }
}

fn into_stream(rows: Vec<Row>) -> RowStream<'static> {
    Box::pin(futures::stream::iter(rows.into_iter().map(Ok)))
}

#[async_trait]
impl CypherExecutor for ScriptedClient {
    async fn execute_cypher(
        &self,
        cypher: &str,
        params: Params,
    ) -> Result<RowStream<'_>, AppError> {
        answer(&self.script, cypher, params).await.map(into_stream)
    }

    async fn run_cypher(&self, cypher: &str, params: Params) -> Result<(), AppError> {
        answer(&self.script, cypher, params).await.map(|_| ())
    }
}

#[async_trait]
impl GraphClient for ScriptedClient {
    type Tx = ScriptedTx;

    async fn begin(&self, mode: AccessMode) -> Result<Self::Tx, AppError> {
        self.script.lock().unwrap().begins.push(mode);
        Ok(ScriptedTx {
            script: self.script.clone(),
        })
    }
}

pub(crate) struct ScriptedTx {
    script: Arc<Mutex<Script>>,
}

#[async_trait]
impl CypherExecutor for ScriptedTx {
    async fn execute_cypher(
        &self,
        cypher: &str,
        params: Params,
    ) -> Result<RowStream<'_>, AppError> {
        answer(&self.script, cypher, params).await.map(into_stream)
    }

    async fn run_cypher(&self, cypher: &str, params: Params) -> Result<(), AppError> {
        answer(&self.script, cypher, params).await.map(|_| ())
    }
}

#[async_trait]
impl Transaction for ScriptedTx {
    async fn commit(self) -> Result<(), AppError> {
        self.script.lock().unwrap().commits += 1;
        Ok(())
    }

    async fn rollback(self) -> Result<(), AppError> {
        let mut script = self.script.lock().unwrap();
        script.rollbacks += 1;
        if script.fail_rollback {
            return Err(AppError::Internal("rollback refused".into()));
        }
        Ok(())
    }
}
