//! Persistent last-known-good records
//!
//! Records outlive the process and serve two purposes: a strict-TTL fast
//! path that avoids the network entirely, and an any-age emergency answer
//! when the network fails. Reads never fail (missing or corrupt records are
//! a miss) and writes never fail (errors are logged and dropped).

use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use super::clock::Clock;
use super::storage::KeyValueStore;

const KEY_PREFIX: &str = "fallback:";

/// A persisted payload and when it was stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistentCacheRecord<T> {
    pub data: T,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

impl<T> PersistentCacheRecord<T> {
    pub fn age_ms(&self, now_ms: i64) -> i64 {
        now_ms.saturating_sub(self.timestamp)
    }

    pub fn is_within(&self, ttl: Duration, now_ms: i64) -> bool {
        self.age_ms(now_ms) <= ttl.as_millis() as i64
    }
}

/// Best-effort persistent cache over a [`KeyValueStore`].
pub struct FallbackCache<S: ?Sized> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S: ?Sized> Clone for FallbackCache<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S: KeyValueStore + ?Sized> FallbackCache<S> {
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    fn storage_key(key: &str) -> String {
        format!("{}{}", KEY_PREFIX, key)
    }

    /// Last stored record for `key`, whatever its age.
    pub fn load_fallback<T: DeserializeOwned>(
        &self,
        key: &str,
    ) -> Option<PersistentCacheRecord<T>> {
        let raw = match self.store.get(&Self::storage_key(key)) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("Failed to read fallback record {}: {}", key, e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!("Ignoring corrupt fallback record {}: {}", key, e);
                None
            }
        }
    }

    /// Stored record for `key` only if it is no older than `ttl`.
    pub fn load_fresh<T: DeserializeOwned>(
        &self,
        key: &str,
        ttl: Duration,
    ) -> Option<PersistentCacheRecord<T>> {
        let now = self.clock.now_ms();
        self.load_fallback(key)
            .filter(|record: &PersistentCacheRecord<T>| record.is_within(ttl, now))
    }

    /// Persist `value` as the last-known-good record for `key`.
    pub fn save_fallback<T: Serialize>(&self, key: &str, value: &T) {
        let record = PersistentCacheRecord {
            data: value,
            timestamp: self.clock.now_ms(),
        };

        let raw = match serde_json::to_string(&record) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Failed to serialize fallback record {}: {}", key, e);
                return;
            }
        };

        if let Err(e) = self.store.set(&Self::storage_key(key), &raw) {
            warn!("Failed to save fallback record {}: {}", key, e);
        }
    }

    /// Remove the record for `key`.
    pub fn clear_fallback(&self, key: &str) {
        if let Err(e) = self.store.remove(&Self::storage_key(key)) {
            warn!("Failed to clear fallback record {}: {}", key, e);
        }
    }

    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }
}
