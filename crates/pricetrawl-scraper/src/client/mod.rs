//! HTTP source of payloads: fetches configured JSON endpoints directly.

mod fetch_all;

use std::time::Duration;

use reqwest::Client;

use crate::error::ScraperError;
use crate::pipeline::Payload;
use crate::rate_limit::retry_with_backoff;

/// Fetches JSON API responses and turns them into [`Payload`]s.
///
/// Handles rate limiting (429), not-found (404), other non-2xx responses
/// and non-JSON bodies as typed errors. Transient errors (429, 5xx,
/// network failures) are retried with exponential backoff up to
/// `max_retries` additional attempts.
pub struct PayloadClient {
    client: Client,
    /// Maximum number of retry attempts after the first failure.
    max_retries: u32,
    /// Base delay in seconds for exponential backoff: `backoff_base_secs * 2^attempt`.
    backoff_base_secs: u64,
}

impl PayloadClient {
    /// Creates a `PayloadClient` with configured timeout, `User-Agent`, and retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            max_retries,
            backoff_base_secs,
        })
    }

    /// Fetches one endpoint, with automatic retry on transient errors.
    ///
    /// The payload's origin URL is the final URL after redirects, so
    /// relative product links resolve against the host that actually served
    /// the response.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidUrl`]: `url` is not an absolute URL (not retried).
    /// - [`ScraperError::RateLimited`]: HTTP 429 after all retries exhausted.
    /// - [`ScraperError::NotFound`]: HTTP 404 (not retried).
    /// - [`ScraperError::UnexpectedStatus`]: any other non-2xx status (5xx retried, 4xx not).
    /// - [`ScraperError::NotJson`]: `Content-Type` does not mention JSON (not retried).
    /// - [`ScraperError::Http`]: network or TLS failure after all retries exhausted.
    pub async fn fetch_payload(&self, url: &str) -> Result<Payload, ScraperError> {
        let parsed = reqwest::Url::parse(url).map_err(|e| ScraperError::InvalidUrl {
            url: url.to_owned(),
            reason: e.to_string(),
        })?;

        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let parsed = parsed.clone();
            async move {
                let response = self
                    .client
                    .get(parsed.clone())
                    .header(
                        reqwest::header::ACCEPT,
                        "application/json,text/plain;q=0.9,*/*;q=0.8",
                    )
                    .header(reqwest::header::CACHE_CONTROL, "no-cache")
                    .send()
                    .await?;
                let status = response.status();
                let url = parsed.to_string();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(60);

                    return Err(ScraperError::RateLimited {
                        domain: parsed.host_str().unwrap_or(url.as_str()).to_owned(),
                        retry_after_secs,
                    });
                }

                if status == reqwest::StatusCode::NOT_FOUND {
                    return Err(ScraperError::NotFound { url });
                }

                if !status.is_success() {
                    return Err(ScraperError::UnexpectedStatus {
                        status: status.as_u16(),
                        url,
                    });
                }

                let content_type = response
                    .headers()
                    .get(reqwest::header::CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_owned();
                if !content_type.to_ascii_lowercase().contains("json") {
                    return Err(ScraperError::NotJson { url, content_type });
                }

                let origin_url = response.url().to_string();
                let body = response.bytes().await?;
                tracing::debug!(%origin_url, bytes = body.len(), "payload fetched");

                Ok(Payload::new(origin_url, body.to_vec()))
            }
        })
        .await
    }
}
