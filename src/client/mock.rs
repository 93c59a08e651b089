//! Mock BugMart clients for testing
//!
//! Provides mock implementations of [`MarketplaceApi`] and [`RateProvider`]
//! for unit testing without making real API calls.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::models::{Category, Listing, Page, UserProfile, WantedPost};
use super::query::BrowseQuery;
use super::rates::RateProvider;
use super::MarketplaceApi;
use crate::error::{ApiError, ApiResult};

/// Mock API client for testing.
///
/// Configure expected responses via builder methods, then use in tests.
///
/// # Example
/// ```ignore
/// let mock = MockMarketplaceClient::new()
///     .with_listings(vec![listing("l-1", "Mealworms")])
///     .await;
///
/// let page = mock.list_listings(&BrowseQuery::new()).await?;
/// assert_eq!(page.items.len(), 1);
/// ```
#[derive(Default)]
pub struct MockMarketplaceClient {
    listings: Arc<Mutex<Vec<Listing>>>,
    wanted: Arc<Mutex<Vec<WantedPost>>>,
    /// Categories per locale; "en" is used when a locale has none
    categories: Arc<Mutex<HashMap<String, Vec<Category>>>>,
    profile: Arc<Mutex<Option<UserProfile>>>,
    /// Error to return (if any) - consumed on first use
    error: Arc<Mutex<Option<ApiError>>>,
    /// Error returned by every call while set
    outage: Arc<Mutex<Option<ApiError>>>,
    /// Delay before answering, to hold requests in flight
    latency: Arc<Mutex<Option<Duration>>>,
    /// Track number of calls for verification
    call_count: Arc<Mutex<CallCounts>>,
    /// Queries passed to list methods, in call order
    captured_queries: Arc<Mutex<Vec<BrowseQuery>>>,
}

/// Tracks API call counts for test verification
#[derive(Default, Debug, Clone)]
pub struct CallCounts {
    pub list_listings: usize,
    pub get_listing: usize,
    pub list_wanted: usize,
    pub get_wanted: usize,
    pub list_categories: usize,
    pub get_profile: usize,
}

impl CallCounts {
    /// Get total number of API calls made.
    pub fn total(&self) -> usize {
        self.list_listings
            + self.get_listing
            + self.list_wanted
            + self.get_wanted
            + self.list_categories
            + self.get_profile
    }
}

impl MockMarketplaceClient {
    /// Create a new mock client with default (empty) responses.
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn with_listings(self, listings: Vec<Listing>) -> Self {
        *self.listings.lock().await = listings;
        self
    }

    pub async fn with_wanted(self, wanted: Vec<WantedPost>) -> Self {
        *self.wanted.lock().await = wanted;
        self
    }

    pub async fn with_categories(self, locale: &str, categories: Vec<Category>) -> Self {
        self.categories
            .lock()
            .await
            .insert(locale.to_string(), categories);
        self
    }

    pub async fn with_profile(self, profile: UserProfile) -> Self {
        *self.profile.lock().await = Some(profile);
        self
    }

    /// Configure an error to return on the next API call.
    /// The error is consumed after one use.
    pub async fn with_error(self, error: ApiError) -> Self {
        *self.error.lock().await = Some(error);
        self
    }

    pub async fn with_latency(self, latency: Duration) -> Self {
        *self.latency.lock().await = Some(latency);
        self
    }

    /// Fail every call with `error` until [`restore`](Self::restore).
    pub async fn set_outage(&self, error: ApiError) {
        *self.outage.lock().await = Some(error);
    }

    pub async fn restore(&self) {
        *self.outage.lock().await = None;
    }

    /// Replace the listings returned from now on.
    pub async fn set_listings(&self, listings: Vec<Listing>) {
        *self.listings.lock().await = listings;
    }

    /// Get the call counts for verification in tests.
    pub async fn call_counts(&self) -> CallCounts {
        self.call_count.lock().await.clone()
    }

    pub async fn captured_queries(&self) -> Vec<BrowseQuery> {
        self.captured_queries.lock().await.clone()
    }

    /// Count the call, wait out the latency and apply any configured error.
    async fn begin(&self, count: impl FnOnce(&mut CallCounts)) -> ApiResult<()> {
        count(&mut *self.call_count.lock().await);

        let latency = *self.latency.lock().await;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        if let Some(e) = self.error.lock().await.take() {
            return Err(e);
        }
        if let Some(e) = self.outage.lock().await.clone() {
            return Err(e);
        }
        Ok(())
    }
}

fn page_of<T: Clone>(items: &[T], query: &BrowseQuery) -> Page<T> {
    let offset = query.effective_offset() as usize;
    let limit = query.effective_limit() as usize;
    Page {
        items: items.iter().skip(offset).take(limit).cloned().collect(),
        total: items.len() as u64,
    }
}

#[async_trait]
impl MarketplaceApi for MockMarketplaceClient {
    async fn list_listings(&self, query: &BrowseQuery) -> ApiResult<Page<Listing>> {
        self.captured_queries.lock().await.push(query.clone());
        self.begin(|c| c.list_listings += 1).await?;
        Ok(page_of(&self.listings.lock().await, query))
    }

    async fn get_listing(&self, id: &str) -> ApiResult<Listing> {
        self.begin(|c| c.get_listing += 1).await?;
        self.listings
            .lock()
            .await
            .iter()
            .find(|l| l.id == id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("Listing {}", id)))
    }

    async fn list_wanted(&self, query: &BrowseQuery) -> ApiResult<Page<WantedPost>> {
        self.captured_queries.lock().await.push(query.clone());
        self.begin(|c| c.list_wanted += 1).await?;
        Ok(page_of(&self.wanted.lock().await, query))
    }

    async fn get_wanted(&self, id: &str) -> ApiResult<WantedPost> {
        self.begin(|c| c.get_wanted += 1).await?;
        self.wanted
            .lock()
            .await
            .iter()
            .find(|w| w.id == id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("Wanted posting {}", id)))
    }

    async fn list_categories(&self, locale: &str) -> ApiResult<Vec<Category>> {
        self.begin(|c| c.list_categories += 1).await?;
        let categories = self.categories.lock().await;
        Ok(categories
            .get(locale)
            .or_else(|| categories.get("en"))
            .cloned()
            .unwrap_or_default())
    }

    async fn get_profile(&self) -> ApiResult<UserProfile> {
        self.begin(|c| c.get_profile += 1).await?;
        self.profile
            .lock()
            .await
            .clone()
            .ok_or(ApiError::Unauthorized)
    }
}

/// Mock exchange rate provider.
#[derive(Default)]
pub struct MockRateProvider {
    /// Rates from the base currency, by target code
    rates: Arc<Mutex<HashMap<String, f64>>>,
    error: Arc<Mutex<Option<ApiError>>>,
    outage: Arc<Mutex<Option<ApiError>>>,
    latency: Arc<Mutex<Option<Duration>>>,
    calls: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockRateProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn with_rate(self, target: &str, rate: f64) -> Self {
        self.rates.lock().await.insert(target.to_string(), rate);
        self
    }

    /// The error is consumed after one use.
    pub async fn with_error(self, error: ApiError) -> Self {
        *self.error.lock().await = Some(error);
        self
    }

    pub async fn with_latency(self, latency: Duration) -> Self {
        *self.latency.lock().await = Some(latency);
        self
    }

    pub async fn set_outage(&self, error: ApiError) {
        *self.outage.lock().await = Some(error);
    }

    pub async fn set_rate(&self, target: &str, rate: f64) {
        self.rates.lock().await.insert(target.to_string(), rate);
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }

    /// `(base, target)` pairs requested, in call order.
    pub async fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl RateProvider for MockRateProvider {
    async fn fetch_rate(&self, base: &str, target: &str) -> ApiResult<f64> {
        self.calls
            .lock()
            .await
            .push((base.to_string(), target.to_string()));

        let latency = *self.latency.lock().await;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        if let Some(e) = self.error.lock().await.take() {
            return Err(e);
        }
        if let Some(e) = self.outage.lock().await.clone() {
            return Err(e);
        }

        self.rates
            .lock()
            .await
            .get(target)
            .copied()
            .ok_or_else(|| ApiError::InvalidResponse(format!("No rate for {}", target)))
    }
}

/// Listing with only the required fields set.
pub fn listing(id: &str, title: &str) -> Listing {
    Listing {
        id: id.to_string(),
        title: title.to_string(),
        description: None,
        category: None,
        price: None,
        currency: None,
        quantity: None,
        unit: None,
        location: None,
        seller: None,
        contact: None,
        created_at: None,
    }
}

/// Wanted posting with only the required fields set.
pub fn wanted(id: &str, title: &str) -> WantedPost {
    WantedPost {
        id: id.to_string(),
        title: title.to_string(),
        description: None,
        category: None,
        quantity: None,
        unit: None,
        budget: None,
        currency: None,
        location: None,
        author: None,
        contact: None,
        created_at: None,
    }
}

pub fn category(id: &str, slug: &str, name: &str, parent_id: Option<&str>) -> Category {
    Category {
        id: id.to_string(),
        slug: slug.to_string(),
        name: name.to_string(),
        parent_id: parent_id.map(str::to_string),
        listing_count: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_client_default_empty() {
        let mock = MockMarketplaceClient::new();

        let page = mock.list_listings(&BrowseQuery::new()).await.unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 0);

        assert!(mock.list_categories("en").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mock_client_pages_listings() {
        let listings = (0..5)
            .map(|i| listing(&format!("l-{}", i), "Crickets"))
            .collect();
        let mock = MockMarketplaceClient::new().with_listings(listings).await;

        let page = mock
            .list_listings(&BrowseQuery::new().limit(2).offset(2))
            .await
            .unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].id, "l-2");
        assert_eq!(page.total, 5);
        assert!(page.has_more(2));
    }

    #[tokio::test]
    async fn test_mock_client_with_error() {
        let mock = MockMarketplaceClient::new()
            .with_error(ApiError::Unauthorized)
            .await;

        assert_eq!(
            mock.get_profile().await.unwrap_err(),
            ApiError::Unauthorized
        );

        // Error is consumed, next call succeeds
        assert!(mock.list_wanted(&BrowseQuery::new()).await.is_ok());
        assert_eq!(mock.call_counts().await.total(), 2);
    }

    #[tokio::test]
    async fn test_mock_client_outage() {
        let mock = MockMarketplaceClient::new()
            .with_categories("en", vec![category("c-1", "crickets", "Crickets", None)])
            .await;

        mock.set_outage(ApiError::Timeout).await;
        assert_eq!(mock.list_categories("en").await.unwrap_err(), ApiError::Timeout);
        assert_eq!(mock.list_categories("en").await.unwrap_err(), ApiError::Timeout);

        mock.restore().await;
        assert_eq!(mock.list_categories("pt").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_mock_get_listing_not_found() {
        let mock = MockMarketplaceClient::new()
            .with_listings(vec![listing("l-1", "Mealworms")])
            .await;

        assert_eq!(mock.get_listing("l-1").await.unwrap().title, "Mealworms");
        assert!(matches!(
            mock.get_listing("l-2").await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_mock_rate_provider() {
        let mock = MockRateProvider::new().with_rate("EUR", 0.92).await;

        assert_eq!(mock.fetch_rate("USD", "EUR").await.unwrap(), 0.92);
        assert!(mock.fetch_rate("USD", "BRL").await.is_err());
        assert_eq!(mock.call_count().await, 2);
        assert_eq!(mock.calls().await[0], ("USD".to_string(), "EUR".to_string()));
    }
}
