//! Category taxonomy

use std::sync::Arc;
use std::time::Duration;

use crate::cache::{CacheTtl, Clock, KeyValueStore, QueryKey};
use crate::client::{Category, MarketplaceApi};
use crate::error::ApiResult;

use super::reference::ReferenceCache;

/// Cached category tree, one per locale.
///
/// The whole taxonomy is fetched at once; lookups by slug or parent are
/// answered from that list.
pub struct CategoryService<C: ?Sized, S: ?Sized = dyn KeyValueStore> {
    api: Arc<C>,
    cache: ReferenceCache<Vec<Category>, S>,
}

fn locale_key(locale: &str) -> QueryKey {
    QueryKey::scalar("categories", locale.trim().to_lowercase())
}

impl<C, S> CategoryService<C, S>
where
    C: MarketplaceApi + ?Sized + 'static,
    S: KeyValueStore + ?Sized + 'static,
{
    pub fn new(api: Arc<C>, store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self::with_ttl(api, store, clock, CacheTtl::CATEGORIES)
    }

    pub fn with_ttl(api: Arc<C>, store: Arc<S>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            api,
            cache: ReferenceCache::new(store, clock, ttl),
        }
    }

    /// All categories with names in `locale`.
    pub async fn list(&self, locale: &str) -> ApiResult<Vec<Category>> {
        let key = locale_key(locale);
        let api = Arc::clone(&self.api);
        let locale = locale.trim().to_lowercase();
        self.cache
            .get_or_fetch(&key, move || async move { api.list_categories(&locale).await })
            .await
    }

    pub async fn get_by_slug(&self, locale: &str, slug: &str) -> ApiResult<Option<Category>> {
        let categories = self.list(locale).await?;
        Ok(categories.into_iter().find(|c| c.slug == slug))
    }

    /// Direct children of `parent_id`, or the top-level categories for `None`.
    pub async fn children_of(
        &self,
        locale: &str,
        parent_id: Option<&str>,
    ) -> ApiResult<Vec<Category>> {
        let categories = self.list(locale).await?;
        Ok(categories
            .into_iter()
            .filter(|c| c.parent_id.as_deref() == parent_id)
            .collect())
    }

    /// Forget the tree for `locale`, in memory and on disk.
    pub fn invalidate(&self, locale: &str) {
        self.cache.invalidate(&locale_key(locale));
    }

    pub fn clear_cache(&self) -> usize {
        self.cache.clear()
    }
}
