//! Wanted postings

use std::sync::Arc;
use std::time::Duration;

use log::debug;

use crate::cache::{CacheTtl, Clock, QueryCache, QueryKey};
use crate::client::{BrowseQuery, MarketplaceApi, Page, WantedPost};
use crate::error::{ApiError, ApiResult};

/// Cached access to buyers' wanted postings. Same policy as listings.
pub struct WantedService<C: ?Sized> {
    api: Arc<C>,
    pages: QueryCache<Page<WantedPost>, ApiError>,
    details: QueryCache<WantedPost, ApiError>,
    ttl: Duration,
}

impl<C: MarketplaceApi + ?Sized + 'static> WantedService<C> {
    pub fn new(api: Arc<C>, clock: Arc<dyn Clock>) -> Self {
        Self::with_ttl(api, clock, CacheTtl::WANTED)
    }

    pub fn with_ttl(api: Arc<C>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            api,
            pages: QueryCache::new(Arc::clone(&clock)),
            details: QueryCache::new(clock),
            ttl,
        }
    }

    pub async fn list(&self, query: &BrowseQuery) -> ApiResult<Page<WantedPost>> {
        let key = query.query_key("wanted");
        let api = Arc::clone(&self.api);
        let query = query.clone();
        self.pages
            .get_or_fetch(&key, self.ttl, move || async move {
                api.list_wanted(&query).await
            })
            .await
    }

    pub async fn get(&self, id: &str) -> ApiResult<WantedPost> {
        let id = super::detail_id(id)?;
        let key = QueryKey::scalar("wanted-post", id.as_str());
        let api = Arc::clone(&self.api);
        self.details
            .get_or_fetch(&key, self.ttl, move || async move { api.get_wanted(&id).await })
            .await
    }

    /// Drop everything cached under the previous identity. For embedders
    /// that keep one service alive across logins.
    pub fn on_auth_changed(&self) -> usize {
        let removed = self.clear_cache();
        debug!("Auth changed, dropped {} cached wanted entries", removed);
        removed
    }

    pub fn clear_cache(&self) -> usize {
        self.pages.clear() + self.details.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use crate::client::MockMarketplaceClient;
    use crate::client::mock::wanted;

    #[tokio::test]
    async fn test_pages_are_cached_per_query() {
        let mock = Arc::new(
            MockMarketplaceClient::new()
                .with_wanted(
                    (0..30)
                        .map(|i| wanted(&format!("w-{}", i), "Mealworms"))
                        .collect(),
                )
                .await,
        );
        let service = WantedService::new(mock.clone(), Arc::new(ManualClock::new(0)));

        let first = service.list(&BrowseQuery::new()).await.unwrap();
        let second = service.list(&BrowseQuery::new().offset(20)).await.unwrap();
        service.list(&BrowseQuery::new()).await.unwrap();

        assert_eq!(first.items.len(), 20);
        assert_eq!(second.items.len(), 10);
        assert!(!second.has_more(20));
        assert_eq!(mock.call_counts().await.list_wanted, 2);
    }

    #[tokio::test]
    async fn test_search_bypasses_cache() {
        let mock = Arc::new(MockMarketplaceClient::new());
        let service = WantedService::new(mock.clone(), Arc::new(ManualClock::new(0)));
        let query = BrowseQuery::new().search("superworms").category("larvae");

        service.list(&query).await.unwrap();
        service.list(&query).await.unwrap();

        assert_eq!(mock.call_counts().await.list_wanted, 2);
        let captured = mock.captured_queries().await;
        assert_eq!(captured[1].search.as_deref(), Some("superworms"));
    }

    #[tokio::test]
    async fn test_not_found_is_not_cached() {
        let mock = Arc::new(MockMarketplaceClient::new());
        let service = WantedService::new(mock.clone(), Arc::new(ManualClock::new(0)));

        assert!(matches!(service.get("w-9").await, Err(ApiError::NotFound(_))));
        assert!(service.get("w-9").await.is_err());
        assert_eq!(mock.call_counts().await.get_wanted, 2);
    }

    #[tokio::test]
    async fn test_padded_id_is_trimmed_before_request() {
        let mock = Arc::new(
            MockMarketplaceClient::new()
                .with_wanted(vec![wanted("w-1", "Crickets")])
                .await
                .with_latency(Duration::from_millis(20))
                .await,
        );
        let service = WantedService::new(mock.clone(), Arc::new(ManualClock::new(0)));

        let (padded, exact) = futures::join!(service.get("w-1\n"), service.get("w-1"));

        assert_eq!(padded.unwrap().title, "Crickets");
        assert_eq!(exact.unwrap().title, "Crickets");
        assert_eq!(mock.call_counts().await.get_wanted, 1);
        assert!(matches!(service.get("").await, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_auth_change_invalidates() {
        let mock = Arc::new(
            MockMarketplaceClient::new()
                .with_wanted(vec![wanted("w-1", "Crickets")])
                .await,
        );
        let service = WantedService::new(mock.clone(), Arc::new(ManualClock::new(0)));

        service.get("w-1").await.unwrap();
        service.get("w-1").await.unwrap();
        assert_eq!(mock.call_counts().await.get_wanted, 1);

        service.on_auth_changed();
        service.get("w-1").await.unwrap();
        assert_eq!(mock.call_counts().await.get_wanted, 2);
    }
}
