//! Response caching
//!
//! Layers, from the bottom up:
//! - [`key`]: deterministic fingerprints for read queries
//! - [`memory`]: process-local TTL map
//! - [`single_flight`]: one shared fetch per key at a time
//! - [`read_through`]: the two above combined into `get_or_fetch`
//! - [`storage`] and [`fallback`]: durable last-known-good records

pub mod clock;
pub mod fallback;
pub mod key;
pub mod memory;
pub mod read_through;
pub mod single_flight;
pub mod storage;

use std::time::Duration;

/// Default cache TTLs per data type
pub struct CacheTtl;

impl CacheTtl {
    // Listings and wanted postings change as sellers edit them
    pub const LISTINGS: Duration = Duration::from_secs(5 * 60); // 5 min
    pub const WANTED: Duration = Duration::from_secs(5 * 60); // 5 min

    // Reference data
    pub const CATEGORIES: Duration = Duration::from_secs(24 * 60 * 60); // 24 hr
    pub const CURRENCY: Duration = Duration::from_secs(24 * 60 * 60); // 24 hr
}

// Re-export main types
pub use clock::{Clock, ManualClock, SystemClock};
pub use fallback::{FallbackCache, PersistentCacheRecord};
pub use key::{Cacheability, ParamValue, QueryKey};
pub use memory::{CacheEntry, TtlMap};
pub use read_through::QueryCache;
pub use single_flight::SingleFlight;
pub use storage::{KeyValueStore, MemoryStore, SqliteStore, StoreStats};
