//! Filter and paging arguments for listing and wanted collections

use clap::Args;

use crate::client::BrowseQuery;

/// Collection filters shared by `listing list` and `wanted list`
#[derive(Debug, Clone, Args, Default)]
pub struct BrowseArgs {
    /// Free-text search (results are never cached)
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Filter by category slug
    #[arg(long, short = 'c')]
    pub category: Option<String>,

    /// Filter by location
    #[arg(long)]
    pub location: Option<String>,

    /// Maximum results per page (1-100)
    #[arg(long, short = 'n')]
    pub limit: Option<u32>,

    /// Number of results to skip
    #[arg(long)]
    pub offset: Option<u32>,
}

impl BrowseArgs {
    /// Build the API query, using `default_limit` when no limit was given.
    pub fn to_query(&self, default_limit: u32) -> BrowseQuery {
        BrowseQuery {
            search: self.search.clone(),
            category: self.category.clone(),
            location: self.location.clone(),
            limit: Some(self.limit.unwrap_or(default_limit)),
            offset: self.offset,
        }
    }
}
