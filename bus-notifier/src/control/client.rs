//! Control document HTTP client.

use std::time::Duration;

use tracing::{debug, warn};

use crate::poller::RetryPolicy;

use super::source::ControlFeed;
use super::types::ControlDocument;

/// Errors from fetching the control document.
#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("control server returned HTTP {status}")]
    Status { status: u16 },

    #[error("failed to parse control document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration for the control client.
#[derive(Debug, Clone)]
pub struct ControlConfig {
    /// URL of the control document
    pub url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Retry budget for a single fetch
    pub retry: RetryPolicy,
}

impl ControlConfig {
    /// 2 s timeout, 50 attempts, constant 250 ms between them.
    pub fn new(url: impl Into<String>) -> Self {
        let delay = Duration::from_millis(250);
        Self {
            url: url.into(),
            timeout_secs: 2,
            retry: RetryPolicy::new(50)
                .with_initial_delay(delay)
                .with_max_delay(delay)
                .with_multiplier(1.0),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// Fetches the control document.
#[derive(Debug, Clone)]
pub struct ControlClient {
    http: reqwest::Client,
    config: ControlConfig,
}

impl ControlClient {
    pub fn new(config: ControlConfig) -> Result<Self, ControlError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { http, config })
    }

    /// One request, no retries.
    pub async fn fetch_once(&self) -> Result<ControlDocument, ControlError> {
        let response = self.http.get(&self.config.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ControlError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Fetch, retrying up to the configured budget. Returns the last error.
    pub async fn fetch(&self) -> Result<ControlDocument, ControlError> {
        let attempts = self.config.retry.attempts();
        let mut attempt = 1;

        loop {
            match self.fetch_once().await {
                Ok(doc) => {
                    debug!(attempt, ?doc, "Fetched control document");
                    return Ok(doc);
                }
                Err(e) if attempt >= attempts => return Err(e),
                Err(e) => {
                    let delay = self.config.retry.delay_after(attempt);
                    warn!(
                        attempt,
                        max_attempts = attempts,
                        error = %e,
                        "Failed to fetch control document, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

impl ControlFeed for ControlClient {
    async fn current(&self) -> Result<ControlDocument, ControlError> {
        self.fetch().await
    }
}
