//! Node command handlers.

use clap::Subcommand;
use color_eyre::Result;

use crate::context::AppNodeCache;
use crate::graph::CallContext;
use crate::models::{Node, NodeType};

use super::{print_json, App};

/// Node management subcommands.
#[derive(Subcommand)]
pub enum NodeCommand {
    /// Create a node and print its identifier
    Create {
        title: String,

        #[arg(long, default_value = "")]
        content: String,

        /// CONCEPT, NOTE or REFERENCE
        #[arg(long = "type", default_value = "NOTE")]
        node_type: NodeType,

        /// Tag to attach (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// Print a node with its tags
    Get { id: String },

    /// Replace fields of a node; omitted fields keep their current value
    Update {
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        content: Option<String>,

        #[arg(long = "type")]
        node_type: Option<NodeType>,

        /// Replacement tag set (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Remove every tag
        #[arg(long, conflicts_with = "tags")]
        clear_tags: bool,
    },

    /// Delete a node and its relationships
    Delete { id: String },
}

impl App {
    /// Run a node subcommand.
    pub(super) async fn run_node(
        &self,
        service: &AppNodeCache,
        call: &CallContext,
        command: &NodeCommand,
    ) -> Result<()> {
        match command {
            NodeCommand::Create {
                title,
                content,
                node_type,
                tags,
            } => {
                let node = Node::new(title, content, *node_type).with_tags(tags);
                let id = service.create_node(call, &node).await?;
                tracing::info!("Created node {}", id);
                print_json(&serde_json::json!({ "id": id }))
            }
            NodeCommand::Get { id } => {
                let node = service.get_node(call, id).await?;
                print_json(&node)
            }
            NodeCommand::Update {
                id,
                title,
                content,
                node_type,
                tags,
                clear_tags,
            } => {
                let mut node = service.get_node(call, id).await?;
                if let Some(title) = title {
                    node.title = title.clone();
                }
                if let Some(content) = content {
                    node.content = content.clone();
                }
                if let Some(node_type) = node_type {
                    node.node_type = *node_type;
                }
                if *clear_tags {
                    node.tags.clear();
                } else if !tags.is_empty() {
                    node = node.with_tags(tags);
                }

                service.update_node(call, &node).await?;
                let updated = service.get_node(call, id).await?;
                print_json(&updated)
            }
            NodeCommand::Delete { id } => {
                service.delete_node(call, id).await?;
                tracing::info!("Deleted node {}", id);
                print_json(&serde_json::json!({ "deleted": id }))
            }
        }
    }
}
