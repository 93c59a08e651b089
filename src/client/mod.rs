//! BugMart API client

use async_trait::async_trait;

use crate::error::ApiResult;

pub mod marketplace;
#[cfg(test)]
pub mod mock;
pub mod models;
pub mod query;
pub mod rate_limit;
pub mod rates;

pub use marketplace::{DEFAULT_API_URL, MarketplaceClient};
#[cfg(test)]
pub use mock::{MockMarketplaceClient, MockRateProvider};
pub use models::{Category, Listing, Page, UserProfile, WantedPost};
pub use query::BrowseQuery;
pub use rates::{DEFAULT_RATES_URL, ExchangeRateClient, RateProvider};

/// BugMart API client trait
///
/// Every method returns an [`ApiError`](crate::error::ApiError) classified
/// at the HTTP boundary, so the cache layer can share one failure between
/// all callers waiting on the same request.
#[async_trait]
pub trait MarketplaceApi: Send + Sync {
    /// List product listings matching `query`
    async fn list_listings(&self, query: &BrowseQuery) -> ApiResult<Page<Listing>>;

    /// Get a single listing by ID
    async fn get_listing(&self, id: &str) -> ApiResult<Listing>;

    /// List wanted postings matching `query`
    async fn list_wanted(&self, query: &BrowseQuery) -> ApiResult<Page<WantedPost>>;

    /// Get a single wanted posting by ID
    async fn get_wanted(&self, id: &str) -> ApiResult<WantedPost>;

    /// Full category taxonomy with names in `locale`
    async fn list_categories(&self, locale: &str) -> ApiResult<Vec<Category>>;

    /// Profile of the authenticated user
    async fn get_profile(&self) -> ApiResult<UserProfile>;
}
