//! Search criteria selecting which fields a node search matches against.

use serde::{Deserialize, Serialize};

/// Search mode for [`crate::repositories::NodeRepository::search_nodes`].
///
/// Parsing from a string never fails: anything that is not a known mode
/// selects [`SearchCriteria::Unfiltered`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SearchCriteria {
    /// Nodes with at least one tag containing the query.
    Tag,
    /// Nodes whose title or content contains the query.
    TitleContent,
    /// Nodes whose title, content or any tag contains the query.
    All,
    /// Every node, ignoring the query.
    #[default]
    Unfiltered,
}

impl SearchCriteria {
    /// Wire name of the mode; `Unfiltered` has none and renders as empty.
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchCriteria::Tag => "Tag",
            SearchCriteria::TitleContent => "Title/Content",
            SearchCriteria::All => "All",
            SearchCriteria::Unfiltered => "",
        }
    }
}

impl From<&str> for SearchCriteria {
    fn from(s: &str) -> Self {
        match s {
            "Tag" => SearchCriteria::Tag,
            "Title/Content" => SearchCriteria::TitleContent,
            "All" => SearchCriteria::All,
            _ => SearchCriteria::Unfiltered,
        }
    }
}

impl From<String> for SearchCriteria {
    fn from(s: String) -> Self {
        SearchCriteria::from(s.as_str())
    }
}

impl From<SearchCriteria> for String {
    fn from(c: SearchCriteria) -> Self {
        c.as_str().to_string()
    }
}

impl std::fmt::Display for SearchCriteria {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
