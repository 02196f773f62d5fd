//! Curlbus HTTP client.
//!
//! One request per call, no retries: retrying is the poller's job.

use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use tracing::{debug, warn};

use crate::domain::StationId;
use crate::poller::StationDataFetcher;

use super::error::FetchError;
use super::types::RawScheduleResponse;

/// Default base URL for the Curlbus API.
pub const DEFAULT_BASE_URL: &str = "https://curlbus.app/";

/// Default request timeout. Curlbus answers quickly or not at all.
const DEFAULT_TIMEOUT_SECS: u64 = 3;

/// Longest body excerpt kept in a [`FetchError::Json`].
const BODY_EXCERPT_CHARS: usize = 500;

/// Configuration for the Curlbus client.
#[derive(Debug, Clone)]
pub struct CurlbusConfig {
    /// Base URL for the API (defaults to the public service)
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl CurlbusConfig {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for CurlbusConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Curlbus API client.
#[derive(Debug, Clone)]
pub struct CurlbusClient {
    http: reqwest::Client,
    base_url: String,
}

impl CurlbusClient {
    /// Create a new Curlbus client with the given configuration.
    pub fn new(config: CurlbusConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        // Without this Curlbus renders an ANSI text table for terminals
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }

    /// URL for a station: the base URL joined with the station id.
    pub fn station_url(&self, station: StationId) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), station)
    }

    /// Fetch the schedule for a station.
    ///
    /// An upstream server error is not a `FetchError`: it is returned as a
    /// response whose `errors` field describes the failure, so that it can
    /// be told apart from transport trouble.
    pub async fn fetch_station(
        &self,
        station: StationId,
    ) -> Result<RawScheduleResponse, FetchError> {
        let url = self.station_url(station);
        debug!(%station, %url, "Fetching station data");

        let response = self.http.get(&url).send().await?;
        let status = response.status();

        if status.is_server_error() {
            warn!(%station, status = status.as_u16(), "Curlbus returned a server error");
            return Ok(RawScheduleResponse::service_error(format!(
                "Curlbus service got an error (HTTP {})",
                status.as_u16()
            )));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| FetchError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(BODY_EXCERPT_CHARS).collect()),
        })
    }
}

impl StationDataFetcher for CurlbusClient {
    async fn fetch(&self, station: StationId) -> Result<RawScheduleResponse, FetchError> {
        self.fetch_station(station).await
    }
}
