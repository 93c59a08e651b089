//! Configuration management for BugMart

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::client::{DEFAULT_API_URL, DEFAULT_RATES_URL};
use crate::error::{ConfigError, Result};
use crate::services::CurrencySettings;
use crate::services::currency::{BASE_CURRENCY, normalize_code};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// BugMart API base URL; the public API when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Bearer token for authenticated requests
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    #[serde(default)]
    pub features: Features,

    #[serde(default)]
    pub currency: CurrencyConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub preferences: Preferences,
}

/// Feature switches
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Features {
    /// Show prices converted to the preferred currency
    #[serde(default = "default_true")]
    pub currency_conversion: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            currency_conversion: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Exchange rate provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyConfig {
    #[serde(default = "default_rates_url")]
    pub rates_url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Currency all rates are quoted against
    #[serde(default = "default_base")]
    pub base: String,

    /// Deadline for a single rate lookup
    #[serde(default = "default_rate_timeout")]
    pub timeout_secs: u64,
}

fn default_rates_url() -> String {
    DEFAULT_RATES_URL.to_string()
}

fn default_base() -> String {
    BASE_CURRENCY.to_string()
}

fn default_rate_timeout() -> u64 {
    5
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            rates_url: default_rates_url(),
            api_key: None,
            base: default_base(),
            timeout_secs: default_rate_timeout(),
        }
    }
}

/// Cache lifetimes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Listings and wanted postings
    #[serde(default = "default_listings_ttl")]
    pub listings_ttl_secs: u64,

    /// Categories and exchange rates
    #[serde(default = "default_reference_ttl")]
    pub reference_ttl_secs: u64,
}

fn default_listings_ttl() -> u64 {
    5 * 60
}

fn default_reference_ttl() -> u64 {
    24 * 60 * 60
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            listings_ttl_secs: default_listings_ttl(),
            reference_ttl_secs: default_reference_ttl(),
        }
    }
}

impl CacheConfig {
    pub fn listings_ttl(&self) -> Duration {
        Duration::from_secs(self.listings_ttl_secs)
    }

    pub fn reference_ttl(&self) -> Duration {
        Duration::from_secs(self.reference_ttl_secs)
    }
}

/// User preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preferences {
    /// Locale for category names
    #[serde(default = "default_locale")]
    pub locale: String,

    /// Currency to show converted prices in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    /// Default page size for collection requests
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_locale() -> String {
    "en".to_string()
}

fn default_page_size() -> u32 {
    20
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            locale: default_locale(),
            currency: None,
            page_size: default_page_size(),
        }
    }
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".bugmart").join("config.yaml"))
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound.into());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file is missing
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load_from(path) {
            Err(crate::error::Error::Config(ConfigError::NotFound)) => {
                log::debug!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents =
            serde_yaml::to_string(self).map_err(|e| ConfigError::SaveError(e.to_string()))?;

        std::fs::write(path, contents)?;

        // Set file permissions to 600 on Unix systems
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(path, perms)?;
        }

        Ok(())
    }

    /// Reject values that would make the client misbehave
    pub fn validate(&self) -> Result<()> {
        if let Some(url) = &self.api_url {
            check_http_url("api_url", url)?;
        }
        // The rates service is only contacted when conversion is on
        if self.features.currency_conversion {
            check_http_url("currency.rates_url", &self.currency.rates_url)?;
        }
        normalize_code(&self.currency.base)
            .map_err(|e| ConfigError::Invalid(format!("currency.base: {}", e)))?;
        if let Some(code) = &self.preferences.currency {
            normalize_code(code)
                .map_err(|e| ConfigError::Invalid(format!("preferences.currency: {}", e)))?;
        }
        if self.currency.timeout_secs == 0 {
            return Err(
                ConfigError::Invalid("currency.timeout_secs must be positive".to_string()).into(),
            );
        }
        Ok(())
    }

    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    pub fn currency_settings(&self) -> CurrencySettings {
        CurrencySettings {
            enabled: self.features.currency_conversion,
            base: self.currency.base.trim().to_uppercase(),
            timeout: Duration::from_secs(self.currency.timeout_secs),
            ttl: self.cache.reference_ttl(),
        }
    }
}

fn check_http_url(field: &str, value: &str) -> Result<()> {
    match reqwest::Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        _ => {
            let message = format!("{} must be an http(s) URL: {}", field, value);
            Err(ConfigError::Invalid(message).into())
        }
    }
}
