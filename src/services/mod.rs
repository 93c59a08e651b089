//! Cached feature services
//!
//! Each service owns its caches and is handed the API client, durable store
//! and clock it needs. Listings and wanted postings are kept in memory only;
//! categories and exchange rates also persist a last-known-good copy that is
//! served when the network fails.

pub mod categories;
pub mod currency;
pub mod listings;
pub mod reference;
pub mod wanted;

pub use categories::CategoryService;
pub use currency::{CurrencyService, CurrencySettings};
pub use listings::ListingService;
pub use reference::ReferenceCache;
pub use wanted::WantedService;

use crate::error::{ApiError, ApiResult};

/// Trimmed resource id, used for both the cache key and the request path.
fn detail_id(id: &str) -> ApiResult<String> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ApiError::BadRequest("id must not be empty".to_string()));
    }
    Ok(id.to_string())
}
