//! Command execution context
//!
//! Provides a unified context for command execution, eliminating boilerplate
//! for config loading, client initialization and cache wiring.

use std::path::PathBuf;
use std::sync::Arc;

use log::debug;

use crate::auth::AuthContext;
use crate::cache::{Clock, KeyValueStore, MemoryStore, SqliteStore, SystemClock};
use crate::cli::OutputFormat;
use crate::cli::args::GlobalOptions;
use crate::client::{ExchangeRateClient, MarketplaceClient};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::services::{CategoryService, CurrencyService, ListingService, WantedService};

/// Context for command execution containing config, clients and caches.
pub struct CommandContext {
    /// Loaded configuration (defaults when no file exists)
    pub config: Config,
    /// Where `config` was loaded from and is saved to
    pub config_path: PathBuf,
    /// Output format preference
    pub format: OutputFormat,
    pub auth: Arc<AuthContext>,
    /// API client (Arc-wrapped so fetches can outlive the caller)
    pub api: Arc<MarketplaceClient>,
    /// Durable store for fallback records
    pub store: Arc<dyn KeyValueStore>,
    pub clock: Arc<dyn Clock>,
}

impl CommandContext {
    /// Create a new command context.
    ///
    /// This handles:
    /// - Loading config from path (or defaults when the file is missing)
    /// - Applying the API URL override
    /// - Opening the persistent cache, or an in-memory one for `--no-cache`
    ///
    /// # Errors
    /// Returns error if the config is invalid or the cache cannot be opened.
    pub fn new(opts: &GlobalOptions) -> Result<Self> {
        let config_path = opts.config_path()?;
        let mut config = Config::load_or_default(&config_path)?;

        if let Some(url) = opts.api_url_ref() {
            config.api_url = Some(url.to_string());
        }
        config.validate()?;

        let auth = Arc::new(AuthContext::new(config.token.clone()));
        let api = Arc::new(MarketplaceClient::new(config.api_url(), Arc::clone(&auth))?);

        Ok(Self {
            config,
            config_path,
            format: opts.format,
            auth,
            api,
            store: open_store(opts)?,
            clock: Arc::new(SystemClock),
        })
    }

    pub fn listings(&self) -> ListingService<MarketplaceClient> {
        ListingService::with_ttl(
            Arc::clone(&self.api),
            Arc::clone(&self.clock),
            self.config.cache.listings_ttl(),
        )
    }

    pub fn wanted(&self) -> WantedService<MarketplaceClient> {
        WantedService::with_ttl(
            Arc::clone(&self.api),
            Arc::clone(&self.clock),
            self.config.cache.listings_ttl(),
        )
    }

    pub fn categories(&self) -> CategoryService<MarketplaceClient> {
        CategoryService::with_ttl(
            Arc::clone(&self.api),
            Arc::clone(&self.store),
            Arc::clone(&self.clock),
            self.config.cache.reference_ttl(),
        )
    }

    /// Currency service; the rate provider is only built when conversion
    /// is enabled.
    pub fn currency(&self) -> Result<CurrencyService<ExchangeRateClient>> {
        let settings = self.config.currency_settings();
        if !settings.enabled {
            return Ok(CurrencyService::disabled(
                Arc::clone(&self.store),
                Arc::clone(&self.clock),
                settings,
            ));
        }

        let provider = ExchangeRateClient::new(
            &self.config.currency.rates_url,
            self.config.currency.api_key.clone(),
            settings.timeout,
        )?;
        Ok(CurrencyService::new(
            Arc::new(provider),
            Arc::clone(&self.store),
            Arc::clone(&self.clock),
            settings,
        ))
    }

    /// Locale to use when the command didn't name one.
    pub fn locale<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        requested.unwrap_or(&self.config.preferences.locale)
    }

    /// Persist the current config.
    pub fn save_config(&self) -> Result<()> {
        self.config.save_to(&self.config_path)
    }
}

/// Resolve the cache directory: `--cache-dir`, then the platform default.
pub fn cache_dir(opts: &GlobalOptions) -> Result<PathBuf> {
    match &opts.cache_dir {
        Some(dir) => Ok(dir.clone()),
        None => Ok(SqliteStore::cache_dir()?),
    }
}

fn open_store(opts: &GlobalOptions) -> Result<Arc<dyn KeyValueStore>> {
    if opts.no_cache {
        debug!("Persistent cache disabled, using in-memory store");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let dir = cache_dir(opts)?;
    match SqliteStore::open_at(&dir) {
        Ok(store) => {
            debug!("Opened cache at {}", store.path().display());
            Ok(Arc::new(store))
        }
        Err(CacheError::Database(e)) => {
            // A broken cache must not stop the command
            log::warn!("Cache unavailable ({}), continuing without it", e);
            Ok(Arc::new(MemoryStore::new()))
        }
        Err(e) => Err(e.into()),
    }
}
