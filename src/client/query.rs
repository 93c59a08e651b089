//! Query parameters for collection endpoints

use crate::cache::QueryKey;

/// Page size used when the caller does not ask for one.
pub const DEFAULT_LIMIT: u32 = 20;

/// Largest page size the API accepts.
pub const MAX_LIMIT: u32 = 100;

/// Filters and paging for listing and wanted collections.
///
/// # Example
/// ```ignore
/// let query = BrowseQuery::new().category("larvae").limit(50);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrowseQuery {
    /// Free-text search term
    pub search: Option<String>,
    /// Category slug
    pub category: Option<String>,
    /// Seller or buyer location
    pub location: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl BrowseQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn category(mut self, slug: impl Into<String>) -> Self {
        self.category = Some(slug.into());
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Page size with the default applied and clamped to `1..=MAX_LIMIT`.
    pub fn effective_limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    pub fn effective_offset(&self) -> u32 {
        self.offset.unwrap_or(0)
    }

    /// Whether a non-blank free-text search term is present.
    pub fn has_search(&self) -> bool {
        self.search.as_deref().is_some_and(|s| !s.trim().is_empty())
    }

    /// Normalized key for this query within `namespace`.
    ///
    /// Defaults are filled in first, so `limit: None` and
    /// `limit: Some(DEFAULT_LIMIT)` are the same query. Searches are
    /// marked uncacheable: results depend on the term and go stale fast.
    pub fn query_key(&self, namespace: &'static str) -> QueryKey {
        let key = QueryKey::new(namespace)
            .opt_param("search", self.search.as_deref())
            .opt_param("category", self.category.as_deref())
            .opt_param("location", self.location.as_deref())
            .param("limit", self.effective_limit())
            .param("offset", self.effective_offset());

        if self.has_search() { key.no_cache() } else { key }
    }
}
