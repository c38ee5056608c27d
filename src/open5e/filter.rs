//! Choice of the query parameter used to filter a category endpoint.

use std::collections::HashSet;

/// Categories with full-text relevance ranking on the Open5e side.
pub const DEFAULT_SEARCH_CATEGORIES: &[&str] = &["spells", "monsters", "magicitems", "weapons"];

/// Which filter parameter a category takes: `search` or `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterPolicy {
    search_categories: HashSet<String>,
}

impl Default for FilterPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_CATEGORIES.iter().copied())
    }
}

impl FilterPolicy {
    pub fn new<I, S>(search_categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            search_categories: search_categories.into_iter().map(Into::into).collect(),
        }
    }

    /// Query parameter name for `category`.
    ///
    /// The category is compared exactly as given, so a broad search route
    /// such as `spells/` does not count as `spells`.
    pub fn param_for(&self, category: &str) -> &'static str {
        if self.search_categories.contains(category) {
            "search"
        } else {
            "text"
        }
    }
}
