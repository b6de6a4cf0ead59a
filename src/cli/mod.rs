//! CLI module for the knowledge manager.
//!
//! Subcommands:
//! - `node`: Create, read, update and delete nodes
//! - `rel`: Create and delete relationships
//! - `search`: Search nodes by tag, title/content or both
//! - `ping`: Check the database connection

mod node;
mod relationship;
mod search;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use serde::Serialize;

use crate::config::Config;
use crate::context::Context;

pub use node::NodeCommand;
pub use relationship::RelCommand;

/// Knowledge Manager - personal knowledge graph on Neo4j
#[derive(Parser)]
#[command(name = "knowledge-manager")]
#[command(about = "Personal knowledge graph - typed nodes and relationships on Neo4j")]
#[command(version)]
pub struct App {
    /// Run in verbose mode
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Per-call deadline in seconds (0 disables it); overrides the config
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Print the client-side graph cache after the command
    #[arg(long, global = true)]
    pub state: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Node management
    Node {
        #[command(subcommand)]
        command: NodeCommand,
    },

    /// Relationship management
    Rel {
        #[command(subcommand)]
        command: RelCommand,
    },

    /// Search nodes
    Search {
        /// Text to look for (case-insensitive)
        #[arg(default_value = "")]
        query: String,

        /// One of "Tag", "Title/Content", "All"; anything else lists every node
        #[arg(long, default_value = "All")]
        criteria: String,
    },

    /// Check that the database is reachable
    Ping,
}

impl App {
    /// Run the CLI application.
    pub async fn run(self) -> Result<()> {
        let mut config = Config::load()?;
        if let Some(timeout) = self.timeout {
            config.repository.timeout_secs = timeout;
        }

        let context = Context::connect(config).await?;
        if let Command::Ping = self.command {
            tracing::info!("Neo4j is reachable");
            return print_json(&serde_json::json!({ "ok": true }));
        }

        let service = context.cached_node_service();
        let call = context.call_context();

        match &self.command {
            Command::Node { command } => self.run_node(&service, &call, command).await?,
            Command::Rel { command } => self.run_rel(&service, &call, command).await?,
            Command::Search { query, criteria } => {
                self.run_search(&service, &call, query, criteria).await?
            }
            Command::Ping => {}
        }

        if self.state {
            print_json(&service.snapshot().await)?;
        }
        Ok(())
    }
}

/// Prints a value as pretty JSON on stdout.
fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NodeType, RelationType};

    #[test]
    fn test_parse_node_create() {
        let app = App::try_parse_from([
            "knowledge-manager",
            "node",
            "create",
            "Graphs",
            "--content",
            "Nodes and edges",
            "--type",
            "concept",
            "--tag",
            "rust",
            "--tag",
            "neo4j",
        ])
        .unwrap();

        match app.command {
            Command::Node {
                command:
                    NodeCommand::Create {
                        title,
                        node_type,
                        tags,
                        ..
                    },
            } => {
                assert_eq!(title, "Graphs");
                assert_eq!(node_type, NodeType::Concept);
                assert_eq!(tags, vec!["rust", "neo4j"]);
            }
            _ => panic!("expected node create"),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_node_type() {
        let result = App::try_parse_from([
            "knowledge-manager",
            "node",
            "create",
            "x",
            "--type",
            "ESSAY",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_rel_create_with_many_targets() {
        let app = App::try_parse_from([
            "knowledge-manager",
            "--timeout",
            "3",
            "rel",
            "create",
            "a",
            "b",
            "c",
            "--type",
            "DEPENDS_ON",
        ])
        .unwrap();

        assert_eq!(app.timeout, Some(3));
        match app.command {
            Command::Rel {
                command:
                    RelCommand::Create {
                        source,
                        targets,
                        rel_type,
                        ..
                    },
            } => {
                assert_eq!(source, "a");
                assert_eq!(targets, vec!["b", "c"]);
                assert_eq!(rel_type, RelationType::DependsOn);
            }
            _ => panic!("expected rel create"),
        }
    }

    #[test]
    fn test_parse_rel_create_requires_target() {
        let result = App::try_parse_from(["knowledge-manager", "rel", "create", "a"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_search_defaults() {
        let app = App::try_parse_from(["knowledge-manager", "search", "neo4j"]).unwrap();
        match app.command {
            Command::Search { query, criteria } => {
                assert_eq!(query, "neo4j");
                assert_eq!(criteria, "All");
            }
            _ => panic!("expected search"),
        }
    }
}
