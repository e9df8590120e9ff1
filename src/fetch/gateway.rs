//! HTTP JSON gateway with request spacing, 429 backoff and mirror failover
//!
//! This module provides the only component that talks to the network:
//! - Minimum spacing between dispatched requests
//! - HTTP 429 retry honouring `Retry-After`, otherwise capped exponential backoff
//! - One-shot failover from the mirror to the origin for the same path

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, RETRY_AFTER},
    Client, Response, StatusCode,
};
use serde_json::Value;
use std::time::Duration;

use super::endpoints::join;
use super::limiter::RequestSpacer;
use super::JsonSource;
use crate::config::ApiConfig;
use crate::utils::error::FetchError;
use crate::utils::retry::RetryConfig;

/// Ergast gateway
///
/// Owns the HTTP client and the process-wide spacing watermark. Construct one
/// per process and share it behind an `Arc`.
#[derive(Debug)]
pub struct HttpGateway {
    /// HTTP client with configured timeout and compression
    client: Client,

    /// Spacing watermark shared by every request
    spacer: RequestSpacer,

    /// Mirror base URL
    mirror_url: String,

    /// Origin base URL
    origin_url: String,

    /// Backoff for HTTP 429
    rate_limit_backoff: RetryConfig,
}

impl HttpGateway {
    /// Create a new gateway from the API configuration
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Network` if the HTTP client cannot be created
    pub fn new(config: &ApiConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .default_headers(Self::build_headers())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .gzip(true)
            .build()?;

        Ok(Self {
            client,
            spacer: RequestSpacer::new(Duration::from_millis(config.request_delay_ms)),
            mirror_url: config.mirror_url.clone(),
            origin_url: config.origin_url.clone(),
            rate_limit_backoff: RetryConfig::exponential(
                config.max_rate_limit_retries,
                config.backoff_base_ms,
                config.max_backoff_ms,
            ),
        })
    }

    /// The spacing limiter, exposed for inspection
    pub fn spacer(&self) -> &RequestSpacer {
        &self.spacer
    }

    /// Fetch `path` from the mirror, failing over to the origin once
    ///
    /// # Errors
    ///
    /// Returns the mirror's error when both hosts fail, and
    /// `FetchError::RateLimited` without failover when 429 retries run out.
    pub async fn fetch_json(&self, path: &str) -> Result<Value, FetchError> {
        let primary = join(&self.mirror_url, path);

        let error = match self.fetch_with_backoff(&primary).await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_rate_limit() => return Err(e),
            Err(e) => e,
        };

        if self.origin_url == self.mirror_url {
            return Err(error);
        }

        let fallback = join(&self.origin_url, path);
        tracing::warn!(url = %primary, fallback = %fallback, error = %error, "Mirror failed, trying origin");

        tokio::time::sleep(self.spacer.spacing()).await;
        self.spacer.acquire().await;

        match self.send_once(&fallback).await {
            Ok(response) if response.status().is_success() => {
                match Self::decode(response).await {
                    Ok(value) => {
                        tracing::info!(url = %fallback, "Origin fallback succeeded");
                        Ok(value)
                    }
                    Err(e) => {
                        tracing::warn!(url = %fallback, error = %e, "Origin fallback failed");
                        Err(error)
                    }
                }
            }
            Ok(response) => {
                tracing::warn!(url = %fallback, status = response.status().as_u16(), "Origin fallback failed");
                Err(error)
            }
            Err(e) => {
                tracing::warn!(url = %fallback, error = %e, "Origin fallback failed");
                Err(error)
            }
        }
    }

    /// Spaced request loop with bounded 429 retries
    async fn fetch_with_backoff(&self, url: &str) -> Result<Value, FetchError> {
        let mut attempt = 0;

        loop {
            self.spacer.acquire().await;

            let response = self.send_once(url).await?;
            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                if attempt >= self.rate_limit_backoff.max_retries {
                    tracing::warn!(url = %url, attempts = attempt + 1, "Rate limit retries exhausted");
                    return Err(FetchError::rate_limited());
                }

                let wait = Self::retry_after(&response)
                    .unwrap_or_else(|| self.rate_limit_backoff.calculate_delay(attempt + 1));
                attempt += 1;
                tracing::warn!(
                    url = %url,
                    wait_ms = wait.as_millis() as u64,
                    attempt = attempt,
                    max_retries = self.rate_limit_backoff.max_retries,
                    "Rate limited (429), backing off"
                );
                tokio::time::sleep(wait).await;
                continue;
            }

            if !status.is_success() {
                return Err(FetchError::HttpStatus {
                    status: status.as_u16(),
                    reason: status.canonical_reason().unwrap_or_default().to_string(),
                });
            }

            return Self::decode(response).await;
        }
    }

    async fn send_once(&self, url: &str) -> Result<Response, FetchError> {
        tracing::debug!(url = %url, "Fetching");
        let response = self.client.get(url).send().await?;
        tracing::debug!(url = %url, status = response.status().as_u16(), "Response received");
        Ok(response)
    }

    async fn decode(response: Response) -> Result<Value, FetchError> {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| FetchError::Decode(e.to_string()))
    }

    /// `Retry-After` in whole seconds
    fn retry_after(response: &Response) -> Option<Duration> {
        Self::parse_retry_after(response.headers().get(RETRY_AFTER)?.to_str().ok()?)
    }

    fn parse_retry_after(raw: &str) -> Option<Duration> {
        raw.trim().parse::<u64>().ok().map(Duration::from_secs)
    }

    /// Headers sent with every request
    fn build_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }
}

#[async_trait]
impl JsonSource for HttpGateway {
    async fn fetch_json(&self, path: &str) -> Result<Value, FetchError> {
        HttpGateway::fetch_json(self, path).await
    }
}
