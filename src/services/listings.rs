//! Marketplace listings

use std::sync::Arc;
use std::time::Duration;

use log::debug;

use crate::cache::{CacheTtl, Clock, QueryCache, QueryKey};
use crate::client::{BrowseQuery, Listing, MarketplaceApi, Page};
use crate::error::{ApiError, ApiResult};

/// Cached access to product listings.
///
/// Collection pages and single listings are kept for [`CacheTtl::LISTINGS`]
/// unless configured otherwise. Searches always go to the network.
pub struct ListingService<C: ?Sized> {
    api: Arc<C>,
    pages: QueryCache<Page<Listing>, ApiError>,
    details: QueryCache<Listing, ApiError>,
    ttl: Duration,
}

impl<C: MarketplaceApi + ?Sized + 'static> ListingService<C> {
    pub fn new(api: Arc<C>, clock: Arc<dyn Clock>) -> Self {
        Self::with_ttl(api, clock, CacheTtl::LISTINGS)
    }

    pub fn with_ttl(api: Arc<C>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            api,
            pages: QueryCache::new(Arc::clone(&clock)),
            details: QueryCache::new(clock),
            ttl,
        }
    }

    /// One page of listings matching `query`.
    pub async fn list(&self, query: &BrowseQuery) -> ApiResult<Page<Listing>> {
        let key = query.query_key("listings");
        let api = Arc::clone(&self.api);
        let query = query.clone();
        self.pages
            .get_or_fetch(&key, self.ttl, move || async move {
                api.list_listings(&query).await
            })
            .await
    }

    pub async fn get(&self, id: &str) -> ApiResult<Listing> {
        let id = super::detail_id(id)?;
        let key = QueryKey::scalar("listing", id.as_str());
        let api = Arc::clone(&self.api);
        self.details
            .get_or_fetch(&key, self.ttl, move || async move { api.get_listing(&id).await })
            .await
    }

    /// Contact details are only served to authenticated users, so anything
    /// cached under the previous identity is dropped.
    ///
    /// For embedders that keep one service alive across logins. CLI commands
    /// build a fresh service per invocation and never need it.
    pub fn on_auth_changed(&self) -> usize {
        let removed = self.clear_cache();
        debug!("Auth changed, dropped {} cached listing entries", removed);
        removed
    }

    pub fn clear_cache(&self) -> usize {
        self.pages.clear() + self.details.clear()
    }

    pub fn cached_entries(&self) -> usize {
        self.pages.len() + self.details.len()
    }
}
