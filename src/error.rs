//! Application error types.

use thiserror::Error;

/// Application-level errors for the knowledge manager.
#[derive(Error, Debug)]
pub enum AppError {
    // Neo4j errors
    #[error("Neo4j connection error: {0}")]
    Connection(#[source] neo4rs::Error),

    #[error("Neo4j query error: {message}")]
    Query { message: String, query: String },

    // Domain errors
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Relationship endpoints not found: {}", .0.join(", "))]
    MissingNodes(Vec<String>),

    #[error("Partial result: requested {requested} relationships, database created {created}")]
    PartialResult { requested: usize, created: usize },

    #[error("Validation error: {0}")]
    Validation(String),

    // Call lifecycle
    #[error("Operation cancelled")]
    Cancelled,

    #[error("Deadline exceeded")]
    DeadlineExceeded,

    // Config errors
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Builds a [`AppError::Query`] from a driver error and the statement that caused it.
    pub fn query(err: impl std::fmt::Display, query: &str) -> Self {
        AppError::Query {
            message: err.to_string(),
            query: query.to_string(),
        }
    }
}
