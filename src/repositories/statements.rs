//! Cypher statements issued by the node repository.
//!
//! Labels and relationship types are spliced in from the [`NodeType`] and
//! [`RelationType`] enums only. Everything a caller supplies travels as a
//! `$parameter`.

use crate::models::{NodeType, RelationType, SearchCriteria};

/// Columns every node-returning statement projects. Timestamps come back as
/// epoch nanoseconds.
const NODE_COLUMNS: &str = "n.id AS id,
       n.title AS title,
       n.content AS content,
       n.type AS type,
       n.created_at.epochSeconds * 1000000000 + n.created_at.nanosecond AS created_at,
       n.updated_at.epochSeconds * 1000000000 + n.updated_at.nanosecond AS updated_at,
       tags";

/// Collects the tag names of `n` into `tags`.
const COLLECT_TAGS: &str = "OPTIONAL MATCH (n)-[:HAS_TAG]->(t:Tag)
WITH n, collect(DISTINCT t.name) AS tags";

/// Attaches every name in `$tags` to `n`, creating missing Tag nodes.
const ATTACH_TAGS: &str =
    "FOREACH (tag IN $tags | MERGE (t:Tag {name: tag}) MERGE (n)-[:HAS_TAG]->(t))";

pub(crate) const DELETE_NODE: &str = "MATCH (n:Node {id: $id}) DETACH DELETE n";

pub(crate) const DELETE_RELATIONSHIP: &str = "MATCH ()-[r {id: $id}]->() DELETE r";

pub(crate) const EXISTING_NODES: &str = "MATCH (n:Node) WHERE n.id IN $ids RETURN n.id AS id";

pub(crate) fn create_node(node_type: NodeType) -> String {
    format!(
        "CREATE (n:Node:{label} {{
    id: randomUUID(),
    title: $title,
    content: $content,
    type: $type,
    created_at: datetime(),
    updated_at: datetime(),
    tags: $tags
}})
{ATTACH_TAGS}
RETURN n.id AS id",
        label = node_type.label(),
    )
}

pub(crate) fn get_node() -> String {
    format!(
        "MATCH (n:Node {{id: $id}})
{COLLECT_TAGS}
RETURN {NODE_COLUMNS}"
    )
}

/// Replaces the node's fields, type label and tag edges in one statement.
pub(crate) fn update_node(node_type: NodeType) -> String {
    let all_labels: Vec<&str> = NodeType::all().iter().map(NodeType::label).collect();
    format!(
        "MATCH (n:Node {{id: $id}})
REMOVE n:{old_labels}
SET n:{label},
    n.title = $title,
    n.content = $content,
    n.type = $type,
    n.tags = $tags,
    n.updated_at = datetime()
WITH n
OPTIONAL MATCH (n)-[old:HAS_TAG]->(:Tag)
DELETE old
WITH DISTINCT n
{ATTACH_TAGS}
RETURN n.id AS id",
        old_labels = all_labels.join(":"),
        label = node_type.label(),
    )
}

/// Creates one edge from the source to each entry of `$target_ids`.
pub(crate) fn create_relationship(rel_type: RelationType) -> String {
    format!(
        "MATCH (source:Node {{id: $source_id}})
UNWIND $target_ids AS target_id
MATCH (target:Node {{id: target_id}})
CREATE (source)-[r:{label} {{
    id: randomUUID(),
    description: $description,
    created_at: datetime()
}}]->(target)
RETURN target.id AS target_id, r.id AS id",
        label = rel_type.label(),
    )
}

/// Search statement for the given criteria; `$query` must be lower-cased.
pub(crate) fn search_nodes(criteria: SearchCriteria) -> String {
    let (matcher, filter) = match criteria {
        SearchCriteria::Tag => (
            "MATCH (n:Node)-[:HAS_TAG]->(m:Tag)
WHERE toLower(m.name) CONTAINS $query
WITH DISTINCT n",
            "",
        ),
        SearchCriteria::TitleContent => (
            "MATCH (n:Node)
WHERE toLower(n.title) CONTAINS $query OR toLower(n.content) CONTAINS $query",
            "",
        ),
        SearchCriteria::All => (
            "MATCH (n:Node)",
            "WHERE toLower(n.title) CONTAINS $query
   OR toLower(n.content) CONTAINS $query
   OR any(tag IN tags WHERE toLower(tag) CONTAINS $query)",
        ),
        SearchCriteria::Unfiltered => ("MATCH (n:Node)", ""),
    };

    let mut cypher = format!("{matcher}\n{COLLECT_TAGS}\n");
    if !filter.is_empty() {
        cypher.push_str(filter);
        cypher.push('\n');
    }
    cypher.push_str("RETURN ");
    cypher.push_str(NODE_COLUMNS);
    cypher
}

/// Whether the statement for `criteria` references `$query`.
pub(crate) fn uses_query(criteria: SearchCriteria) -> bool {
    !matches!(criteria, SearchCriteria::Unfiltered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::extract_return_columns;

    const NODE_COLUMN_NAMES: [&str; 7] = [
        "id",
        "title",
        "content",
        "type",
        "created_at",
        "updated_at",
        "tags",
    ];

    #[test]
    fn test_create_node_uses_type_label() {
        let cypher = create_node(NodeType::Reference);
        assert!(cypher.starts_with("CREATE (n:Node:REFERENCE {"));
        assert!(cypher.contains("id: randomUUID()"));
        assert!(cypher.contains("MERGE (t:Tag {name: tag})"));
        assert_eq!(extract_return_columns(&cypher).unwrap(), vec!["id"]);
    }

    #[test]
    fn test_update_node_swaps_label_and_tags() {
        let cypher = update_node(NodeType::Concept);
        assert!(cypher.contains("REMOVE n:CONCEPT:NOTE:REFERENCE"));
        assert!(cypher.contains("SET n:CONCEPT,"));
        assert!(cypher.contains("DELETE old"));
        assert!(cypher.contains("n.updated_at = datetime()"));
        assert_eq!(extract_return_columns(&cypher).unwrap(), vec!["id"]);
    }

    #[test]
    fn test_get_node_columns() {
        assert_eq!(
            extract_return_columns(&get_node()).unwrap(),
            NODE_COLUMN_NAMES
        );
    }

    #[test]
    fn test_create_relationship_uses_type() {
        let cypher = create_relationship(RelationType::DependsOn);
        assert!(cypher.contains("-[r:DEPENDS_ON {"));
        assert!(cypher.contains("UNWIND $target_ids AS target_id"));
        assert_eq!(
            extract_return_columns(&cypher).unwrap(),
            vec!["target_id", "id"]
        );
    }

    #[test]
    fn test_search_tag() {
        let cypher = search_nodes(SearchCriteria::Tag);
        assert!(cypher.starts_with("MATCH (n:Node)-[:HAS_TAG]->(m:Tag)"));
        assert!(cypher.contains("toLower(m.name) CONTAINS $query"));
        assert!(cypher.contains("WITH DISTINCT n"));
        assert_eq!(extract_return_columns(&cypher).unwrap(), NODE_COLUMN_NAMES);
    }

    #[test]
    fn test_search_title_content() {
        let cypher = search_nodes(SearchCriteria::TitleContent);
        assert!(cypher.contains("toLower(n.title) CONTAINS $query OR toLower(n.content) CONTAINS $query"));
        assert!(!cypher.contains("any(tag"));
    }

    #[test]
    fn test_search_all_filters_after_collecting_tags() {
        let cypher = search_nodes(SearchCriteria::All);
        let collect = cypher.find("collect(DISTINCT t.name) AS tags").unwrap();
        let filter = cypher.find("any(tag IN tags").unwrap();
        assert!(collect < filter);
        assert_eq!(extract_return_columns(&cypher).unwrap(), NODE_COLUMN_NAMES);
    }

    #[test]
    fn test_search_unfiltered_has_no_predicate() {
        let cypher = search_nodes(SearchCriteria::Unfiltered);
        assert!(!cypher.contains("$query"));
        assert!(!uses_query(SearchCriteria::Unfiltered));
        assert!(uses_query(SearchCriteria::All));
    }

    #[test]
    fn test_delete_statements_have_no_return() {
        assert!(extract_return_columns(DELETE_NODE).is_err());
        assert!(extract_return_columns(DELETE_RELATIONSHIP).is_err());
    }
}
