//! Reactive client-side rate limiting
//!
//! Requests are not throttled until the API answers 429 for a request
//! class. From then on every request in that class waits for the class
//! quota. Retrying the rejected request is left to the caller.

use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicBool, Ordering};

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use log::debug;

/// Request classes that share a quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestClass {
    /// Free-text searches over listings or wanted postings
    Search,
    /// Collection and detail reads
    Browse,
    /// Profile and account endpoints
    Account,
}

impl RequestClass {
    pub const ALL: [RequestClass; 3] = [
        RequestClass::Search,
        RequestClass::Browse,
        RequestClass::Account,
    ];

    /// Classify a request by API path (without base URL) and whether it
    /// carries a search term.
    pub fn classify(path: &str, has_search: bool) -> Self {
        if has_search {
            return RequestClass::Search;
        }
        if path.starts_with("/users") || path.starts_with("/auth") {
            return RequestClass::Account;
        }
        RequestClass::Browse
    }

    /// Quota applied once the class is throttled.
    pub fn quota(&self) -> Quota {
        match self {
            RequestClass::Search => Quota::per_second(nonzero(2)),
            RequestClass::Browse => Quota::per_second(nonzero(10)),
            RequestClass::Account => Quota::per_minute(nonzero(30)),
        }
    }
}

fn nonzero(n: u32) -> NonZeroU32 {
    NonZeroU32::new(n).unwrap_or(NonZeroU32::MIN)
}

/// Limiter for one request class that stays idle until activated.
pub struct ReactiveLimiter {
    limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    active: AtomicBool,
    class: RequestClass,
}

impl ReactiveLimiter {
    pub fn new(class: RequestClass) -> Self {
        Self {
            limiter: RateLimiter::direct(class.quota()),
            active: AtomicBool::new(false),
            class,
        }
    }

    pub fn activate(&self) {
        let was_active = self.active.swap(true, Ordering::SeqCst);
        if !was_active {
            debug!("Rate limiting activated for {:?}", self.class);
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Wait for permission if throttling is active.
    pub async fn wait_if_active(&self) {
        if self.is_active() {
            debug!("Waiting for rate limiter {:?}", self.class);
            self.limiter.until_ready().await;
        }
    }
}

/// One reactive limiter per request class.
pub struct RateLimiterSet {
    limiters: HashMap<RequestClass, ReactiveLimiter>,
}

impl Default for RateLimiterSet {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimiterSet {
    pub fn new() -> Self {
        let limiters = RequestClass::ALL
            .into_iter()
            .map(|class| (class, ReactiveLimiter::new(class)))
            .collect();
        Self { limiters }
    }

    pub async fn wait_for(&self, class: RequestClass) {
        if let Some(limiter) = self.limiters.get(&class) {
            limiter.wait_if_active().await;
        }
    }

    /// Start throttling a class (called on 429).
    pub fn activate(&self, class: RequestClass) {
        if let Some(limiter) = self.limiters.get(&class) {
            limiter.activate();
        }
    }

    pub fn is_active(&self, class: RequestClass) -> bool {
        self.limiters
            .get(&class)
            .is_some_and(ReactiveLimiter::is_active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(RequestClass::classify("/listings", true), RequestClass::Search);
        assert_eq!(RequestClass::classify("/wanted", true), RequestClass::Search);
        assert_eq!(RequestClass::classify("/listings", false), RequestClass::Browse);
        assert_eq!(RequestClass::classify("/listings/l-1", false), RequestClass::Browse);
        assert_eq!(RequestClass::classify("/categories", false), RequestClass::Browse);
        assert_eq!(RequestClass::classify("/users/me", false), RequestClass::Account);
    }

    #[test]
    fn test_limiter_activation_is_idempotent() {
        let limiter = ReactiveLimiter::new(RequestClass::Search);
        assert!(!limiter.is_active());

        limiter.activate();
        limiter.activate();
        assert!(limiter.is_active());
    }

    #[test]
    fn test_set_activates_only_one_class() {
        let set = RateLimiterSet::new();
        set.activate(RequestClass::Search);

        assert!(set.is_active(RequestClass::Search));
        assert!(!set.is_active(RequestClass::Browse));
        assert!(!set.is_active(RequestClass::Account));
    }

    #[tokio::test]
    async fn test_inactive_limiter_does_not_wait() {
        let set = RateLimiterSet::new();
        let started = std::time::Instant::now();
        for _ in 0..50 {
            set.wait_for(RequestClass::Account).await;
        }
        assert!(started.elapsed() < std::time::Duration::from_secs(1));
    }
}
