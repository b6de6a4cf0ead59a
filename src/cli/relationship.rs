//! Relationship command handlers.

use clap::Subcommand;
use color_eyre::Result;

use crate::context::AppNodeCache;
use crate::graph::CallContext;
use crate::models::{RelationType, Relationship};

use super::{print_json, App};

/// Relationship management subcommands.
#[derive(Subcommand)]
pub enum RelCommand {
    /// Connect a source node to one or more targets
    Create {
        source: String,

        #[arg(required = true)]
        targets: Vec<String>,

        /// RELATED_TO, REFERENCES, IS_PART_OF, HAS_PART, DEPENDS_ON or IS_PRECEDED_BY
        #[arg(long = "type", default_value = "RELATED_TO")]
        rel_type: RelationType,

        #[arg(long, default_value = "")]
        description: String,
    },

    /// Delete one relationship by identifier
    Delete { id: String },
}

impl App {
    /// Run a relationship subcommand.
    pub(super) async fn run_rel(
        &self,
        service: &AppNodeCache,
        call: &CallContext,
        command: &RelCommand,
    ) -> Result<()> {
        match command {
            RelCommand::Create {
                source,
                targets,
                rel_type,
                description,
            } => {
                let rel =
                    Relationship::new(source, targets, *rel_type).with_description(description);
                let ids = service.create_relationship(call, &rel).await?;
                tracing::info!("Created {} {} relationship(s)", ids.len(), rel_type);
                print_json(&serde_json::json!({ "ids": ids }))
            }
            RelCommand::Delete { id } => {
                service.delete_relationship(call, id).await?;
                print_json(&serde_json::json!({ "deleted": id }))
            }
        }
    }
}
