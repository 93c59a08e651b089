//! Single-flight request deduplication
//!
//! Concurrent callers asking for the same key share one underlying fetch.
//! The first caller registers a shared future under the key; everyone who
//! arrives before it settles awaits that same future and observes the same
//! value or the same error. The registration is removed by a guard owned by
//! the shared future itself, so it goes away when the fetch finishes,
//! fails, or is abandoned by every waiter.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use futures::future::{BoxFuture, FutureExt, Shared, WeakShared};
use log::debug;

type SharedFetch<T, E> = Shared<BoxFuture<'static, Result<T, E>>>;

struct Flight<T, E> {
    id: u64,
    future: WeakShared<BoxFuture<'static, Result<T, E>>>,
}

type FlightMap<T, E> = Mutex<HashMap<String, Flight<T, E>>>;

fn lock<T, E>(flights: &FlightMap<T, E>) -> MutexGuard<'_, HashMap<String, Flight<T, E>>> {
    flights
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Removes the flight registration when dropped, if it is still ours.
struct FlightGuard<T, E> {
    flights: Weak<FlightMap<T, E>>,
    key: String,
    id: u64,
}

impl<T, E> Drop for FlightGuard<T, E> {
    fn drop(&mut self) {
        let Some(flights) = self.flights.upgrade() else {
            return;
        };
        let mut map = lock(&flights);
        if map.get(&self.key).is_some_and(|flight| flight.id == self.id) {
            map.remove(&self.key);
            debug!("Flight settled: {}", self.key);
        }
    }
}

/// Deduplicates concurrent fetches by key.
pub struct SingleFlight<T, E> {
    flights: Arc<FlightMap<T, E>>,
    next_id: AtomicU64,
}

impl<T, E> Default for SingleFlight<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> SingleFlight<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            flights: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(0),
        }
    }

    /// Run `fetcher` unless a fetch for `key` is already in flight, in which
    /// case wait for that one instead.
    pub async fn fetch_once<F, Fut>(&self, key: &str, fetcher: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        self.fetch_once_then(key, fetcher, |_| {}).await
    }

    /// Like [`fetch_once`](Self::fetch_once), but runs `on_success` with the
    /// fetched value inside the flight, before the registration is removed.
    /// `on_success` runs at most once per flight no matter how many callers
    /// joined it.
    pub async fn fetch_once_then<F, Fut, C>(
        &self,
        key: &str,
        fetcher: F,
        on_success: C,
    ) -> Result<T, E>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        C: FnOnce(&T) + Send + 'static,
    {
        let flight = self.join_or_start(key, fetcher, on_success);
        flight.await
    }

    /// Number of fetches currently in flight.
    pub fn in_flight(&self) -> usize {
        lock(&self.flights).len()
    }

    /// Whether a fetch for `key` is currently in flight.
    pub fn is_in_flight(&self, key: &str) -> bool {
        lock(&self.flights).contains_key(key)
    }

    fn join_or_start<F, Fut, C>(&self, key: &str, fetcher: F, on_success: C) -> SharedFetch<T, E>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        C: FnOnce(&T) + Send + 'static,
    {
        let mut map = lock(&self.flights);

        if let Some(existing) = map.get(key).and_then(|flight| flight.future.upgrade()) {
            debug!("Joining in-flight request: {}", key);
            return existing;
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let guard = FlightGuard {
            flights: Arc::downgrade(&self.flights),
            key: key.to_string(),
            id,
        };

        // The fetcher is only invoked when the shared future is first polled,
        // never while the map lock is held.
        let shared = async move {
            let _guard = guard;
            let result = fetcher().await;
            if let Ok(value) = &result {
                on_success(value);
            }
            result
        }
        .boxed()
        .shared();

        if let Some(weak) = shared.downgrade() {
            map.insert(key.to_string(), Flight { id, future: weak });
            debug!("Starting request: {}", key);
        }

        shared
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    fn counting_fetcher(
        calls: Arc<AtomicUsize>,
        result: Result<u32, String>,
    ) -> impl FnOnce() -> BoxFuture<'static, Result<u32, String>> + Send + 'static {
        move || {
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                result
            }
            .boxed()
        }
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_fetch() {
        let flight: SingleFlight<u32, String> = SingleFlight::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let callers =
            (0..5).map(|_| flight.fetch_once("rates:EUR", counting_fetcher(calls.clone(), Ok(42))));
        let results = futures::future::join_all(callers).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(results.iter().all(|r| r == &Ok(42)));
        assert_eq!(flight.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_failure_reaches_every_waiter_and_frees_key() {
        let flight: SingleFlight<u32, String> = SingleFlight::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let callers = (0..3).map(|_| {
            flight.fetch_once("k", counting_fetcher(calls.clone(), Err("boom".to_string())))
        });
        let results = futures::future::join_all(callers).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(results.iter().all(|r| r == &Err("boom".to_string())));
        assert!(!flight.is_in_flight("k"));

        // Errors are not cached: the next call fetches again
        let retry = flight.fetch_once("k", counting_fetcher(calls.clone(), Ok(7))).await;
        assert_eq!(retry, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_sequential_calls_are_not_deduplicated() {
        let flight: SingleFlight<u32, String> = SingleFlight::new();
        let calls = Arc::new(AtomicUsize::new(0));

        flight.fetch_once("k", counting_fetcher(calls.clone(), Ok(1))).await.unwrap();
        flight.fetch_once("k", counting_fetcher(calls.clone(), Ok(2))).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_distinct_keys_fetch_independently() {
        let flight: SingleFlight<u32, String> = SingleFlight::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let (a, b) = futures::join!(
            flight.fetch_once("a", counting_fetcher(calls.clone(), Ok(1))),
            flight.fetch_once("b", counting_fetcher(calls.clone(), Ok(2))),
        );

        assert_eq!((a, b), (Ok(1), Ok(2)));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_abandoned_flight_is_cleaned_up() {
        let flight: SingleFlight<u32, String> = SingleFlight::new();

        let stalled = flight.fetch_once("k", || futures::future::pending::<Result<u32, String>>());
        let outcome = tokio::time::timeout(Duration::from_millis(10), stalled).await;
        assert!(outcome.is_err());

        assert_eq!(flight.in_flight(), 0);

        let value = flight.fetch_once("k", || async { Ok::<_, String>(3) }).await;
        assert_eq!(value, Ok(3));
    }

    #[tokio::test]
    async fn test_on_success_runs_once_per_flight() {
        let flight: SingleFlight<u32, String> = SingleFlight::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let writes = Arc::new(AtomicUsize::new(0));

        let callers = (0..4).map(|_| {
            let writes = writes.clone();
            flight.fetch_once_then("k", counting_fetcher(calls.clone(), Ok(9)), move |v| {
                assert_eq!(*v, 9);
                writes.fetch_add(1, Ordering::SeqCst);
            })
        });
        futures::future::join_all(callers).await;

        assert_eq!(writes.load(Ordering::SeqCst), 1);
    }
}
