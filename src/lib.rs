//! Knowledge Manager - personal knowledge graph on Neo4j
//!
//! Typed nodes (concepts, notes, references) joined by typed, directed
//! relationships. The repository layer maps each use case to one
//! parameterized Cypher unit of work.

pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod graph;
pub mod models;
pub mod repositories;
pub mod services;
pub mod state;
