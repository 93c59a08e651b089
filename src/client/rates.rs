//! Exchange rate provider

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as HttpClient, Url};
use serde::Deserialize;

use super::marketplace::error_from_response;
use crate::error::{ApiError, ApiResult};

/// Default exchange rate service
pub const DEFAULT_RATES_URL: &str = "https://api.exchangerate.host";

/// Source of currency exchange rates
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// How many units of `target` one unit of `base` buys.
    async fn fetch_rate(&self, base: &str, target: &str) -> ApiResult<f64>;
}

#[derive(Debug, Deserialize)]
struct LatestRates {
    #[serde(default)]
    rates: HashMap<String, f64>,
}

/// HTTP client for a `/latest?base=…&symbols=…` rate service
pub struct ExchangeRateClient {
    http: HttpClient,
    base_url: Url,
    api_key: Option<String>,
}

impl ExchangeRateClient {
    /// `timeout` bounds the HTTP exchange itself; callers may impose a
    /// shorter deadline on top.
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> ApiResult<Self> {
        let http = HttpClient::builder()
            .timeout(timeout)
            .user_agent(concat!("bugmart/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| ApiError::Network(format!("Invalid rates URL {}: {}", base_url, e)))?;

        Ok(Self {
            http,
            base_url,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    fn latest_url(&self) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ApiError::Network(format!("Rates URL cannot be a base: {}", self.base_url))
            })?
            .pop_if_empty()
            .push("latest");
        Ok(url)
    }
}

#[async_trait]
impl RateProvider for ExchangeRateClient {
    async fn fetch_rate(&self, base: &str, target: &str) -> ApiResult<f64> {
        let mut query = vec![("base", base), ("symbols", target)];
        if let Some(key) = &self.api_key {
            query.push(("apikey", key.as_str()));
        }

        let url = self.latest_url()?;
        log::debug!("GET {} ({} -> {})", url, base, target);

        let response = self
            .http
            .get(url)
            .query(&query)
            .send()
            .await
            .map_err(ApiError::from)?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let body = response.text().await.unwrap_or_default();
            return Err(error_from_response(status, &headers, &body));
        }

        let latest: LatestRates = response.json().await.map_err(ApiError::from)?;
        rate_from(&latest, target)
    }
}

fn rate_from(latest: &LatestRates, target: &str) -> ApiResult<f64> {
    latest
        .rates
        .get(target)
        .copied()
        .filter(|rate| rate.is_finite() && *rate > 0.0)
        .ok_or_else(|| ApiError::InvalidResponse(format!("No rate for {} in response", target)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_from_response() {
        let latest: LatestRates =
            serde_json::from_str(r#"{"base": "USD", "rates": {"EUR": 0.92}}"#).unwrap();
        assert_eq!(rate_from(&latest, "EUR").unwrap(), 0.92);
    }

    #[test]
    fn test_missing_symbol_is_invalid_response() {
        let latest: LatestRates = serde_json::from_str(r#"{"rates": {}}"#).unwrap();
        assert!(matches!(
            rate_from(&latest, "BRL"),
            Err(ApiError::InvalidResponse(_))
        ));

        let latest: LatestRates = serde_json::from_str(r#"{"success": false}"#).unwrap();
        assert!(rate_from(&latest, "EUR").is_err());
    }

    #[test]
    fn test_non_positive_rate_is_rejected() {
        let latest: LatestRates = serde_json::from_str(r#"{"rates": {"EUR": 0}}"#).unwrap();
        assert!(rate_from(&latest, "EUR").is_err());
    }

    #[test]
    fn test_latest_url() {
        let client =
            ExchangeRateClient::new("https://rates.example.com/v2/", None, Duration::from_secs(5))
                .unwrap();
        assert_eq!(
            client.latest_url().unwrap().as_str(),
            "https://rates.example.com/v2/latest"
        );
    }

    #[test]
    fn test_blank_api_key_is_dropped() {
        let client = ExchangeRateClient::new(
            DEFAULT_RATES_URL,
            Some(" ".to_string()),
            Duration::from_secs(5),
        )
        .unwrap();
        assert!(client.api_key.is_none());
    }

    #[cfg_attr(not(feature = "http-tests"), ignore)]
    #[tokio::test]
    async fn test_error_statuses_are_classified_like_the_marketplace() {
        let mut server = mockito::Server::new_async().await;
        let client = ExchangeRateClient::new(&server.url(), None, Duration::from_secs(5)).unwrap();

        let limited = server
            .mock("GET", "/latest")
            .match_query(mockito::Matcher::UrlEncoded("symbols".into(), "EUR".into()))
            .with_status(429)
            .with_header("Retry-After", "12")
            .create_async()
            .await;
        assert_eq!(
            client.fetch_rate("USD", "EUR").await,
            Err(ApiError::RateLimited(Duration::from_secs(12)))
        );
        limited.remove_async().await;

        server
            .mock("GET", "/latest")
            .match_query(mockito::Matcher::UrlEncoded("symbols".into(), "XYZ".into()))
            .with_status(400)
            .with_body(r#"{"message": "unknown symbol"}"#)
            .create_async()
            .await;
        assert_eq!(
            client.fetch_rate("USD", "XYZ").await,
            Err(ApiError::BadRequest("unknown symbol".to_string()))
        );
    }
}
