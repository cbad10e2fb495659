use serde::{Deserialize, Serialize};

/// A request for one page of catalog results.
///
/// A non-blank term makes a search query; anything else browses the
/// unfiltered discover listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CatalogQuery {
    Discover { page: u32 },
    Search { term: String, page: u32 },
}

impl CatalogQuery {
    pub fn new(term: Option<&str>, page: u32) -> Self {
        let page = page.max(1);
        match term.map(str::trim).filter(|t| !t.is_empty()) {
            Some(term) => CatalogQuery::Search { term: term.to_string(), page },
            None => CatalogQuery::Discover { page },
        }
    }

    pub fn page(&self) -> u32 {
        match self {
            CatalogQuery::Discover { page } | CatalogQuery::Search { page, .. } => *page,
        }
    }

    /// Search term, `None` for discover queries.
    pub fn term(&self) -> Option<&str> {
        match self {
            CatalogQuery::Discover { .. } => None,
            CatalogQuery::Search { term, .. } => Some(term),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_term_is_discover() {
        assert_eq!(CatalogQuery::new(None, 3), CatalogQuery::Discover { page: 3 });
        assert_eq!(CatalogQuery::new(Some(""), 1), CatalogQuery::Discover { page: 1 });
        assert_eq!(CatalogQuery::new(Some("   "), 2), CatalogQuery::Discover { page: 2 });
    }

    #[test]
    fn test_term_is_trimmed_search() {
        let query = CatalogQuery::new(Some(" forrest gump "), 2);
        assert_eq!(query.term(), Some("forrest gump"));
        assert_eq!(query.page(), 2);
    }

    #[test]
    fn test_page_zero_clamps_to_first_page() {
        assert_eq!(CatalogQuery::new(None, 0).page(), 1);
    }
}
