//! HTTP client for the provider's `POST /search` endpoint.

use std::time::Duration;

use reqwest::Client;

use redpulse_core::TimeWindow;

use crate::error::ScrapeError;
use crate::retry::retry_with_backoff;
use crate::types::{RawPost, SearchRequest};

/// Hard cap on `max_posts` accepted by the provider.
pub const MAX_POSTS_CAP: u32 = 50;

/// Client for the external scraping provider.
///
/// One provider request covers one keyword. The provider paces itself
/// upstream, so the per-request timeout is long (reference value 180 s).
/// Transient errors are retried with exponential backoff up to
/// `max_attempts` total attempts.
pub struct ProviderClient {
    client: Client,
    base_url: String,
    /// Total attempts per fetch, including the first.
    max_attempts: u32,
    /// Base delay in milliseconds for exponential backoff between attempts.
    backoff_base_ms: u64,
}

impl ProviderClient {
    /// Creates a `ProviderClient` with the configured timeout and retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        base_url: &str,
        timeout_secs: u64,
        max_attempts: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            max_attempts,
            backoff_base_ms,
        })
    }

    /// Fetches up to `max_posts` posts for `keyword` within `window`, with
    /// automatic retry on transient errors.
    ///
    /// `max_posts` is capped at [`MAX_POSTS_CAP`] before hitting the wire.
    ///
    /// # Errors
    ///
    /// - [`ScrapeError::Exhausted`]: transient errors on every attempt.
    /// - [`ScrapeError::UnexpectedStatus`]: 4xx response (not retried).
    /// - [`ScrapeError::Api`]: the provider returned `{"detail": ...}`.
    /// - [`ScrapeError::InvalidResponse`] / [`ScrapeError::Deserialize`]:
    ///   body was not the expected JSON array of posts.
    pub async fn fetch_posts(
        &self,
        keyword: &str,
        max_posts: u32,
        window: TimeWindow,
    ) -> Result<Vec<RawPost>, ScrapeError> {
        let url = format!("{}/search", self.base_url);
        retry_with_backoff(keyword, self.max_attempts, self.backoff_base_ms, || {
            let url = url.clone();
            async move { self.fetch_once(&url, keyword, max_posts, window).await }
        })
        .await
    }

    async fn fetch_once(
        &self,
        url: &str,
        keyword: &str,
        max_posts: u32,
        window: TimeWindow,
    ) -> Result<Vec<RawPost>, ScrapeError> {
        let body = SearchRequest {
            keyword,
            max_posts: max_posts.min(MAX_POSTS_CAP),
            sort_type: "general",
            note_time: window.code(),
        };

        let response = self.client.post(url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        let text = response.text().await?;
        let value: serde_json::Value =
            serde_json::from_str(&text).map_err(|source| ScrapeError::Deserialize {
                context: format!("search response for {keyword}"),
                source,
            })?;

        // The provider signals internal errors as `{"detail": ...}` with 200.
        if let Some(detail) = value.get("detail") {
            let detail = detail
                .as_str()
                .map_or_else(|| detail.to_string(), str::to_owned);
            return Err(ScrapeError::Api(detail));
        }

        if !value.is_array() {
            return Err(ScrapeError::InvalidResponse {
                received: json_type_name(&value),
            });
        }

        let posts: Vec<RawPost> =
            serde_json::from_value(value).map_err(|source| ScrapeError::Deserialize {
                context: format!("post array for {keyword}"),
                source,
            })?;

        tracing::debug!(keyword, count = posts.len(), "provider returned posts");
        Ok(posts)
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
