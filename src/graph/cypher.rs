//! Cypher RETURN clause column extraction.
//!
//! Backends that hand back rows positionally or by key need to know which
//! columns a statement produces. The final top-level `RETURN` is located by a
//! lexical scan (strings, comments and bracketed subqueries are skipped), and
//! its projection list is parsed with a `pest` grammar.
//!
//! # Example
//!
//! ```
//! use knowledge_manager::graph::extract_return_columns;
//!
//! let columns = extract_return_columns("MATCH (n) RETURN n.title AS title, n.id").unwrap();
//! assert_eq!(columns, vec!["title", "n.id"]);
//! ```

use pest::Parser;
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "graph/cypher.pest"]
struct ProjectionParser;

/// Extracts column names from a Cypher query's final RETURN clause.
///
/// For aliased expressions (`expr AS alias`) the alias is returned, with
/// backticks removed. Unaliased expressions are returned as written.
pub fn extract_return_columns(query: &str) -> Result<Vec<String>, ParseError> {
    let body = final_return_body(query).ok_or(ParseError::NoReturnClause)?;

    let mut pairs = ProjectionParser::parse(Rule::Projection, body)
        .map_err(|e| ParseError::InvalidSyntax(format!("{}", e)))?;

    let mut columns = Vec::new();
    let projection = pairs
        .next()
        .ok_or_else(|| ParseError::InvalidSyntax("empty projection".to_string()))?;

    for pair in projection.into_inner() {
        if pair.as_rule() != Rule::ProjectionItems {
            continue;
        }
        for item in pair.into_inner() {
            match item.as_rule() {
                Rule::Star => return Err(ParseError::ReturnStarNotSupported),
                Rule::ProjectionItem => columns.push(column_name(item)),
                _ => {}
            }
        }
    }

    if columns.is_empty() {
        return Err(ParseError::NoReturnClause);
    }
    Ok(columns)
}

/// Column name for one projection item: the alias if present, else the expression.
fn column_name(item: pest::iterators::Pair<Rule>) -> String {
    let mut expression = String::new();
    for inner in item.into_inner() {
        match inner.as_rule() {
            Rule::Expression => expression = inner.as_str().trim().to_string(),
            Rule::Variable => return unescape(inner.as_str()),
            _ => {}
        }
    }
    expression
}

fn unescape(name: &str) -> String {
    if name.len() >= 2 && name.starts_with('`') && name.ends_with('`') {
        name[1..name.len() - 1].to_string()
    } else {
        name.to_string()
    }
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Returns the text following the last top-level `RETURN` keyword.
///
/// Keywords inside string literals, backtick identifiers, comments and any
/// bracketed region (subqueries, map literals, list comprehensions) are ignored.
fn final_return_body(query: &str) -> Option<&str> {
    let bytes = query.as_bytes();
    let mut depth: usize = 0;
    let mut last = None;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        match b {
            b'\'' | b'"' | b'`' => {
                i += 1;
                while i < bytes.len() && bytes[i] != b {
                    if bytes[i] == b'\\' && b != b'`' {
                        i += 1;
                    }
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i += 2;
                while i + 1 < bytes.len() && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                    i += 1;
                }
                i += 1;
            }
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth = depth.saturating_sub(1),
            _ if depth == 0
                && (i == 0 || !is_ident_byte(bytes[i - 1]))
                && bytes.len() >= i + 6
                && bytes[i..i + 6].eq_ignore_ascii_case(b"RETURN")
                && bytes.get(i + 6).map_or(true, |&next| !is_ident_byte(next)) =>
            {
                last = Some(i + 6);
                i += 5;
            }
            _ => {}
        }
        i += 1;
    }

    last.map(|start| query[start..].trim())
}

/// Errors that can occur during Cypher parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// No RETURN clause found in the query
    NoReturnClause,
    /// RETURN * requires variable tracking (not supported)
    ReturnStarNotSupported,
    /// Syntax error in the projection list
    InvalidSyntax(String),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::NoReturnClause => write!(f, "No RETURN clause found in query"),
            ParseError::ReturnStarNotSupported => {
                write!(
                    f,
                    "RETURN * is not supported - please specify columns explicitly"
                )
            }
            ParseError::InvalidSyntax(msg) => write!(f, "Invalid syntax: {}", msg),
        }
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_variable() {
        let cols = extract_return_columns("MATCH (n) RETURN n").unwrap();
        assert_eq!(cols, vec!["n"]);
    }

    #[test]
    fn test_aliases_and_plain_items() {
        let cols = extract_return_columns("MATCH (n) RETURN n.id AS id, n.title, count(n) AS c")
            .unwrap();
        assert_eq!(cols, vec!["id", "n.title", "c"]);
    }

    #[test]
    fn test_expression_with_spaces() {
        let cols = extract_return_columns("RETURN n.age + 10").unwrap();
        assert_eq!(cols, vec!["n.age + 10"]);
    }

    #[test]
    fn test_nested_function_and_list() {
        let cols = extract_return_columns(
            "MATCH (n) RETURN collect(DISTINCT t.name) AS tags, [x IN range(1, 3) | x * 2] AS xs",
        )
        .unwrap();
        assert_eq!(cols, vec!["tags", "xs"]);
    }

    #[test]
    fn test_distinct_and_trailer() {
        let cols =
            extract_return_columns("MATCH (n) RETURN DISTINCT n.id AS id ORDER BY id SKIP 1 LIMIT 5")
                .unwrap();
        assert_eq!(cols, vec!["id"]);
    }

    #[test]
    fn test_lowercase_keywords() {
        let cols = extract_return_columns("match (n) return n.id as id limit 3").unwrap();
        assert_eq!(cols, vec!["id"]);
    }

    #[test]
    fn test_with_clause_uses_last_return() {
        let cols = extract_return_columns(
            "MATCH (n) WITH n, collect(n.id) AS ids RETURN ids AS all_ids",
        )
        .unwrap();
        assert_eq!(cols, vec!["all_ids"]);
    }

    #[test]
    fn test_return_inside_string_is_ignored() {
        let cols = extract_return_columns("MATCH (n) WHERE n.title = 'RETURN x' RETURN n.id AS id")
            .unwrap();
        assert_eq!(cols, vec!["id"]);
    }

    #[test]
    fn test_subquery_return_is_ignored() {
        let cols = extract_return_columns(
            "MATCH (n) CALL { WITH n RETURN 1 AS inner } RETURN n.id AS id",
        )
        .unwrap();
        assert_eq!(cols, vec!["id"]);
    }

    #[test]
    fn test_identifier_containing_return() {
        let err = extract_return_columns("MATCH (returned) SET returned.x = 1").unwrap_err();
        assert_eq!(err, ParseError::NoReturnClause);
    }

    #[test]
    fn test_backtick_alias() {
        let cols = extract_return_columns("RETURN 1 AS `my col`").unwrap();
        assert_eq!(cols, vec!["my col"]);
    }

    #[test]
    fn test_string_literal_with_comma() {
        let cols = extract_return_columns("RETURN 'a, b' AS s, \"c\" AS t").unwrap();
        assert_eq!(cols, vec!["s", "t"]);
    }

    #[test]
    fn test_no_return_clause() {
        let err = extract_return_columns("MATCH (n:Node {id: $id}) DETACH DELETE n").unwrap_err();
        assert_eq!(err, ParseError::NoReturnClause);
    }

    #[test]
    fn test_return_star_not_supported() {
        let err = extract_return_columns("MATCH (n) RETURN *").unwrap_err();
        assert_eq!(err, ParseError::ReturnStarNotSupported);
    }

    #[test]
    fn test_trailing_semicolon() {
        let cols = extract_return_columns("RETURN 1 AS ok;").unwrap();
        assert_eq!(cols, vec!["ok"]);
    }

    #[test]
    fn test_multiline_projection() {
        let cols = extract_return_columns(
            "MATCH (n:Node)\nRETURN n.id AS id,\n       n.title AS title\n",
        )
        .unwrap();
        assert_eq!(cols, vec!["id", "title"]);
    }
}
