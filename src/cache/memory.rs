//! In-memory TTL map for query results

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use super::clock::Clock;

/// A stored query result.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub key: String,
    pub value: T,
    /// Milliseconds since the Unix epoch
    pub stored_at: i64,
    pub ttl: Duration,
}

impl<T> CacheEntry<T> {
    /// Fresh iff `now - stored_at <= ttl`.
    pub fn is_fresh(&self, now_ms: i64) -> bool {
        now_ms.saturating_sub(self.stored_at) <= self.ttl.as_millis() as i64
    }
}

/// Process-local map of cache entries with per-entry TTL.
///
/// Cloning yields another handle to the same map. Stale entries are kept
/// until they are overwritten or explicitly removed. The lock is never held
/// across an await point.
pub struct TtlMap<T> {
    entries: Arc<Mutex<HashMap<String, CacheEntry<T>>>>,
    clock: Arc<dyn Clock>,
}

impl<T> Clone for TtlMap<T> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<T: Clone> TtlMap<T> {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<T>>> {
        // A panic while holding the lock cannot leave a half-written entry
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Value for `key` if an entry exists and is still fresh.
    pub fn get_fresh(&self, key: &str) -> Option<T> {
        let now = self.clock.now_ms();
        self.lock()
            .get(key)
            .filter(|entry| entry.is_fresh(now))
            .map(|entry| entry.value.clone())
    }

    /// Entry for `key` regardless of age.
    pub fn get_entry(&self, key: &str) -> Option<CacheEntry<T>> {
        self.lock().get(key).cloned()
    }

    /// Store `value` as of now.
    pub fn insert(&self, key: &str, value: T, ttl: Duration) {
        let now = self.clock.now_ms();
        self.insert_at(key, value, ttl, now);
    }

    /// Store `value` with an explicit `stored_at` timestamp.
    pub fn insert_at(&self, key: &str, value: T, ttl: Duration, stored_at: i64) {
        self.lock().insert(
            key.to_string(),
            CacheEntry {
                key: key.to_string(),
                value,
                stored_at,
                ttl,
            },
        );
    }

    pub fn remove(&self, key: &str) -> bool {
        self.lock().remove(key).is_some()
    }

    /// Remove every entry whose key matches; returns how many were removed.
    pub fn remove_where<P>(&self, mut predicate: P) -> usize
    where
        P: FnMut(&str) -> bool,
    {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|key, _| !predicate(key));
        before - entries.len()
    }

    pub fn clear(&self) -> usize {
        let mut entries = self.lock();
        let count = entries.len();
        entries.clear();
        count
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
