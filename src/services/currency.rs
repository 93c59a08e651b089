//! Currency conversion
//!
//! Rates are quoted against a single base currency and cached for a day,
//! in memory and on disk. The base currency itself never needs a lookup.
//! With the feature switched off every query answers "unavailable".

use std::sync::Arc;
use std::time::Duration;

use log::debug;

use crate::cache::{CacheTtl, Clock, KeyValueStore, QueryKey};
use crate::client::RateProvider;
use crate::error::{ApiError, ApiResult};

use super::reference::ReferenceCache;

/// Default base currency
pub const BASE_CURRENCY: &str = "USD";

/// Hard deadline for one rate lookup
pub const RATE_TIMEOUT: Duration = Duration::from_secs(5);

/// Currency service settings
#[derive(Debug, Clone)]
pub struct CurrencySettings {
    pub enabled: bool,
    /// ISO 4217 code all rates are quoted against
    pub base: String,
    pub timeout: Duration,
    pub ttl: Duration,
}

impl Default for CurrencySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            base: BASE_CURRENCY.to_string(),
            timeout: RATE_TIMEOUT,
            ttl: CacheTtl::CURRENCY,
        }
    }
}

/// Normalize a currency code: trimmed and upper-case.
pub fn normalize_code(code: &str) -> ApiResult<String> {
    let code = code.trim().to_uppercase();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ApiError::BadRequest(format!(
            "Invalid currency code: {:?}",
            code
        )));
    }
    Ok(code)
}

/// Exchange rates from the base currency.
///
/// A service built with [`CurrencyService::disabled`] has no provider and
/// answers every query with `Ok(None)`.
pub struct CurrencyService<R: ?Sized, S: ?Sized = dyn KeyValueStore> {
    provider: Option<Arc<R>>,
    cache: ReferenceCache<f64, S>,
    settings: CurrencySettings,
}

impl<R, S> CurrencyService<R, S>
where
    R: RateProvider + ?Sized + 'static,
    S: KeyValueStore + ?Sized + 'static,
{
    pub fn new(
        provider: Arc<R>,
        store: Arc<S>,
        clock: Arc<dyn Clock>,
        settings: CurrencySettings,
    ) -> Self {
        Self {
            provider: Some(provider),
            cache: ReferenceCache::new(store, clock, settings.ttl),
            settings,
        }
    }

    /// A service with conversion switched off; no provider is needed.
    pub fn disabled(store: Arc<S>, clock: Arc<dyn Clock>, settings: CurrencySettings) -> Self {
        Self {
            provider: None,
            cache: ReferenceCache::new(store, clock, settings.ttl),
            settings: CurrencySettings {
                enabled: false,
                ..settings
            },
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.settings.enabled && self.provider.is_some()
    }

    pub fn base(&self) -> &str {
        &self.settings.base
    }

    fn key(&self, code: &str) -> QueryKey {
        QueryKey::scalar("currency", code).param("base", self.settings.base.as_str())
    }

    /// Units of `code` per unit of the base currency.
    ///
    /// `Ok(None)` when conversion is disabled.
    pub async fn rate(&self, code: &str) -> ApiResult<Option<f64>> {
        let provider = match &self.provider {
            Some(provider) if self.settings.enabled => Arc::clone(provider),
            _ => return Ok(None),
        };

        let code = normalize_code(code)?;
        if code == self.settings.base {
            return Ok(Some(1.0));
        }

        let base = self.settings.base.clone();
        let timeout = self.settings.timeout;
        let target = code.clone();
        let fetcher = move || async move {
            match tokio::time::timeout(timeout, provider.fetch_rate(&base, &target)).await {
                Ok(result) => result,
                Err(_) => {
                    debug!("Rate lookup for {} timed out after {:?}", target, timeout);
                    Err(ApiError::Timeout)
                }
            }
        };

        self.cache.get_or_fetch(&self.key(&code), fetcher).await.map(Some)
    }

    /// Convert `amount` between two currencies through the base.
    ///
    /// `Ok(None)` when conversion is disabled.
    pub async fn convert(&self, amount: f64, from: &str, to: &str) -> ApiResult<Option<f64>> {
        let Some(from_rate) = self.rate(from).await? else {
            return Ok(None);
        };
        let Some(to_rate) = self.rate(to).await? else {
            return Ok(None);
        };
        Ok(Some(amount / from_rate * to_rate))
    }

    /// Forget the cached rate for `code`, in memory and on disk.
    pub fn clear_cache(&self, code: &str) -> ApiResult<()> {
        let code = normalize_code(code)?;
        self.cache.invalidate(&self.key(&code));
        Ok(())
    }
}
