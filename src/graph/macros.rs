//! Macro for convenient Cypher query construction.

/// Macro for inline Cypher queries with optional parameters.
///
/// # Usage
///
/// ```ignore
/// use knowledge_manager::graph::cypher;
///
/// // Query without parameters
/// let query = cypher!(txn, "MATCH (n:Node) RETURN n.id AS id");
///
/// // Query with parameters, named after the `$` placeholders
/// let query = cypher!(
///     txn,
///     "MATCH (n:Node {id: $id}) SET n.title = $title",
///     id = node_id,
///     title = new_title
/// );
///
/// query.run().await?;
/// ```
#[macro_export]
macro_rules! cypher {
    // Query without parameters
    ($graph:expr, $query:expr) => {
        $graph.query($query)
    };
    // Query with parameters
    ($graph:expr, $query:expr, $($name:ident = $value:expr),+ $(,)?) => {
        $graph.query($query)$(.param(stringify!($name), $value))+
    };
}
