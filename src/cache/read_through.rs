//! Read-through cache with single-flight fetching

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use log::debug;

use super::clock::Clock;
use super::key::QueryKey;
use super::memory::TtlMap;
use super::single_flight::SingleFlight;

/// In-memory read-through cache for one kind of query result.
///
/// Fresh hits are answered synchronously from the map. Misses go through a
/// [`SingleFlight`] so concurrent callers for the same key share one fetch;
/// the winning fetch writes the entry before its in-flight marker is
/// dropped. Errors are handed back unchanged and never stored.
pub struct QueryCache<T, E> {
    entries: TtlMap<T>,
    flights: SingleFlight<T, E>,
    clock: Arc<dyn Clock>,
}

impl<T, E> QueryCache<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: TtlMap::new(Arc::clone(&clock)),
            flights: SingleFlight::new(),
            clock,
        }
    }

    /// Return the cached value for `key` if fresh, otherwise fetch it.
    ///
    /// Keys marked [`no_cache`](QueryKey::no_cache) always call `fetcher`
    /// and leave the cache untouched.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        key: &QueryKey,
        ttl: Duration,
        fetcher: F,
    ) -> Result<T, E>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        if !key.is_cacheable() {
            debug!("Cache bypass: {}", key.namespace());
            return fetcher().await;
        }

        let fingerprint = key.fingerprint();
        if let Some(value) = self.entries.get_fresh(&fingerprint) {
            debug!("Cache hit: {}", fingerprint);
            return Ok(value);
        }

        debug!("Cache miss: {}", fingerprint);
        let entries = self.entries.clone();
        let write_key = fingerprint.clone();
        self.flights
            .fetch_once_then(&fingerprint, fetcher, move |value| {
                entries.insert(&write_key, value.clone(), ttl);
            })
            .await
    }

    /// Fresh cached value, without fetching.
    pub fn peek(&self, key: &QueryKey) -> Option<T> {
        if !key.is_cacheable() {
            return None;
        }
        self.entries.get_fresh(&key.fingerprint())
    }

    /// Store a value that was obtained elsewhere, as of `stored_at`.
    pub fn seed(&self, key: &QueryKey, value: T, ttl: Duration, stored_at: i64) {
        if key.is_cacheable() {
            self.entries.insert_at(&key.fingerprint(), value, ttl, stored_at);
        }
    }

    /// Drop the entry for `key`. An in-flight fetch for the key is not
    /// cancelled and will still write its result when it settles.
    pub fn invalidate(&self, key: &QueryKey) -> bool {
        self.entries.remove(&key.fingerprint())
    }

    /// Drop every entry whose fingerprint matches `predicate`.
    pub fn invalidate_where<P>(&self, predicate: P) -> usize
    where
        P: FnMut(&str) -> bool,
    {
        self.entries.remove_where(predicate)
    }

    /// Drop every entry in a namespace.
    pub fn invalidate_namespace(&self, namespace: &str) -> usize {
        let prefix = format!("{}:", namespace);
        self.invalidate_where(|key| key.starts_with(&prefix))
    }

    pub fn clear(&self) -> usize {
        self.entries.clear()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn in_flight(&self) -> usize {
        self.flights.in_flight()
    }

    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }
}
