//! Search command handler.

use color_eyre::Result;

use crate::context::AppNodeCache;
use crate::graph::CallContext;
use crate::models::SearchCriteria;

use super::{print_json, App};

impl App {
    /// Run the search command.
    pub(super) async fn run_search(
        &self,
        service: &AppNodeCache,
        call: &CallContext,
        query: &str,
        criteria: &str,
    ) -> Result<()> {
        let criteria = SearchCriteria::from(criteria);
        let nodes = service.search_nodes(call, query, criteria).await?;
        tracing::debug!("Search for {:?} ({}) matched {} node(s)", query, criteria, nodes.len());
        print_json(&nodes)
    }
}
