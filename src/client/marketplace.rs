//! BugMart API client implementation

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client as HttpClient, StatusCode, Url};
use serde::de::DeserializeOwned;

use super::models::{Category, Listing, Page, UserProfile, WantedPost};
use super::query::BrowseQuery;
use super::rate_limit::{RateLimiterSet, RequestClass};
use super::MarketplaceApi;
use crate::auth::AuthContext;
use crate::error::{ApiError, ApiResult};

/// BugMart API base URL
pub const DEFAULT_API_URL: &str = "https://api.bugmart.app/v1";

/// Per-request timeout applied by the HTTP client
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Used when a 429 arrives without a usable `Retry-After`
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(60);

/// Longest error body echoed back in an error message
const MAX_ERROR_BODY: usize = 200;

/// BugMart API client
pub struct MarketplaceClient {
    http: HttpClient,
    base_url: Url,
    auth: Arc<AuthContext>,
    rate_limiters: RateLimiterSet,
}

impl MarketplaceClient {
    /// Create a client for `base_url`, attaching the bearer token from `auth`.
    pub fn new(base_url: &str, auth: Arc<AuthContext>) -> ApiResult<Self> {
        let http = HttpClient::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("bugmart/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| ApiError::Network(format!("Invalid API URL {}: {}", base_url, e)))?;

        Ok(Self {
            http,
            base_url,
            auth,
            rate_limiters: RateLimiterSet::new(),
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    pub fn auth(&self) -> &Arc<AuthContext> {
        &self.auth
    }

    /// Build an endpoint URL from path segments; each segment is escaped.
    fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Network(format!("API URL cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Make a GET request and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> ApiResult<T> {
        let url = self.endpoint(segments)?;
        let has_search = query.iter().any(|(k, v)| *k == "search" && !v.is_empty());
        let class = RequestClass::classify(url.path(), has_search);

        self.rate_limiters.wait_for(class).await;

        let mut request = self.http.get(url.clone()).query(query);
        if let Some(token) = self.auth.token() {
            request = request.bearer_auth(token);
        }

        log::debug!("GET {}", url);
        let response = request.send().await.map_err(ApiError::from)?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await.map_err(ApiError::from)?;

        if status.is_success() {
            return serde_json::from_str(&body).map_err(|e| {
                ApiError::InvalidResponse(format!("Failed to parse response: {}", e))
            });
        }

        let err = error_from_response(status, &headers, &body);
        if err.is_rate_limited() {
            self.rate_limiters.activate(class);
        }
        Err(err)
    }
}

/// Classify a non-success response from any HTTP service we call.
pub(crate) fn error_from_response(status: StatusCode, headers: &HeaderMap, body: &str) -> ApiError {
    let message = || error_message(body).unwrap_or_else(|| status.to_string());

    match status {
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
        StatusCode::FORBIDDEN => ApiError::Forbidden,
        StatusCode::NOT_FOUND => ApiError::NotFound(message()),
        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after = headers
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_RETRY_AFTER);
            ApiError::RateLimited(retry_after)
        }
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            ApiError::BadRequest(message())
        }
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => ApiError::Timeout,
        status => ApiError::Server {
            status: status.as_u16(),
            message: message(),
        },
    }
}

/// Pull a human message out of an error body.
///
/// Accepts `{"message": …}`, `{"statusMessage": …}` and
/// `{"data": {"message": …}}`; falls back to the raw text.
fn error_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        let candidates = [
            json.pointer("/data/message"),
            json.get("message"),
            json.get("statusMessage"),
        ];
        if let Some(message) = candidates
            .into_iter()
            .flatten()
            .find_map(|v| v.as_str())
        {
            return Some(message.to_string());
        }
    }

    Some(body.chars().take(MAX_ERROR_BODY).collect())
}

#[async_trait]
impl MarketplaceApi for MarketplaceClient {
    async fn list_listings(&self, query: &BrowseQuery) -> ApiResult<Page<Listing>> {
        let pairs = query.query_key("listings").query_pairs();
        self.get_json(&["listings"], &pairs).await
    }

    async fn get_listing(&self, id: &str) -> ApiResult<Listing> {
        self.get_json(&["listings", id], &[]).await
    }

    async fn list_wanted(&self, query: &BrowseQuery) -> ApiResult<Page<WantedPost>> {
        let pairs = query.query_key("wanted").query_pairs();
        self.get_json(&["wanted"], &pairs).await
    }

    async fn get_wanted(&self, id: &str) -> ApiResult<WantedPost> {
        self.get_json(&["wanted", id], &[]).await
    }

    async fn list_categories(&self, locale: &str) -> ApiResult<Vec<Category>> {
        self.get_json(&["categories"], &[("locale", locale.to_string())])
            .await
    }

    async fn get_profile(&self) -> ApiResult<UserProfile> {
        self.get_json(&["users", "me"], &[]).await
    }
}
