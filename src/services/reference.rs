//! Reference data with a persistent fallback
//!
//! Lookup order for a cacheable key:
//! 1. fresh in-memory entry
//! 2. persistent record no older than the TTL (promoted into memory)
//! 3. network, shared between concurrent callers; the result is written
//!    to memory and to the persistent store
//! 4. on network failure, the persistent record of any age
//!
//! Only when all of that comes up empty does the fetch error reach the
//! caller, unchanged.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::cache::{Clock, FallbackCache, KeyValueStore, QueryCache, QueryKey};
use crate::error::{ApiError, ApiResult};

/// Read-through cache for slowly changing data that must survive restarts
/// and outages.
pub struct ReferenceCache<T, S: ?Sized = dyn KeyValueStore> {
    memory: QueryCache<T, ApiError>,
    fallback: FallbackCache<S>,
    ttl: Duration,
}

impl<T, S> ReferenceCache<T, S>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
    S: KeyValueStore + ?Sized + 'static,
{
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            memory: QueryCache::new(Arc::clone(&clock)),
            fallback: FallbackCache::new(store, clock),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Resolve `key`, calling `fetcher` only when neither layer has a fresh
    /// value.
    pub async fn get_or_fetch<F, Fut>(&self, key: &QueryKey, fetcher: F) -> ApiResult<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ApiResult<T>> + Send + 'static,
    {
        if !key.is_cacheable() {
            return fetcher().await;
        }

        if let Some(value) = self.memory.peek(key) {
            return Ok(value);
        }

        let storage_key = key.fingerprint();
        if let Some(record) = self.fallback.load_fresh::<T>(&storage_key, self.ttl) {
            debug!("Persistent hit: {}", storage_key);
            self.memory
                .seed(key, record.data.clone(), self.ttl, record.timestamp);
            return Ok(record.data);
        }

        // Persisting inside the shared fetch writes once per flight
        let fallback = self.fallback.clone();
        let save_key = storage_key.clone();
        let fetch_and_persist = move || async move {
            let value = fetcher().await?;
            fallback.save_fallback(&save_key, &value);
            Ok(value)
        };

        match self
            .memory
            .get_or_fetch(key, self.ttl, fetch_and_persist)
            .await
        {
            Ok(value) => Ok(value),
            Err(err) if !err.is_outage() => Err(err),
            Err(err) => match self.fallback.load_fallback::<T>(&storage_key) {
                Some(record) => {
                    let age = Duration::from_millis(
                        record.age_ms(self.fallback.now_ms()).max(0) as u64,
                    );
                    warn!(
                        "Serving stale {} ({}s old) after fetch failure: {}",
                        key.namespace(),
                        age.as_secs(),
                        err
                    );
                    Ok(record.data)
                }
                None => Err(err),
            },
        }
    }

    /// Fresh in-memory value, without touching storage or network.
    pub fn peek(&self, key: &QueryKey) -> Option<T> {
        self.memory.peek(key)
    }

    /// Drop `key` from memory and from the persistent store.
    pub fn invalidate(&self, key: &QueryKey) {
        self.memory.invalidate(key);
        self.fallback.clear_fallback(&key.fingerprint());
    }

    /// Drop every in-memory entry. Persistent records are kept.
    pub fn clear(&self) -> usize {
        self.memory.clear()
    }

    pub fn len(&self) -> usize {
        self.memory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memory.is_empty()
    }
}
