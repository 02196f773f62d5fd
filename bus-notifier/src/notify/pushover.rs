//! Pushover push notification sink.

use std::time::Duration;

use tracing::debug;

use crate::domain::ArrivalsSummary;

use super::format::format_summary;
use super::{Notifier, NotifyError};

/// Default Pushover message endpoint.
const DEFAULT_API_URL: &str = "https://api.pushover.net/1/messages.json";

/// Configuration for the Pushover sink.
#[derive(Debug, Clone)]
pub struct PushoverConfig {
    /// Application API token
    pub token: String,
    /// User (or group) key receiving the messages
    pub user: String,
    /// Message endpoint (defaults to the public API)
    pub api_url: String,
    /// Optional message title
    pub title: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl PushoverConfig {
    /// Create a new config with the given application token and user key.
    pub fn new(token: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            user: user.into(),
            api_url: DEFAULT_API_URL.to_string(),
            title: None,
            timeout_secs: 10,
        }
    }

    /// Set a custom endpoint (for testing).
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Sends each summary as a Pushover message.
#[derive(Debug, Clone)]
pub struct PushoverNotifier {
    http: reqwest::Client,
    config: PushoverConfig,
}

impl PushoverNotifier {
    pub fn new(config: PushoverConfig) -> Result<Self, NotifyError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { http, config })
    }

    /// Send arbitrary text as one message.
    pub async fn send_text(&self, message: &str) -> Result<(), NotifyError> {
        if message.trim().is_empty() {
            return Err(NotifyError::Rejected("empty message".to_string()));
        }

        let mut form = vec![
            ("token", self.config.token.as_str()),
            ("user", self.config.user.as_str()),
            ("message", message),
        ];
        if let Some(title) = &self.config.title {
            form.push(("title", title.as_str()));
        }

        let response = self
            .http
            .post(&self.config.api_url)
            .form(&form)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        debug!(chars = message.chars().count(), "Pushover message sent");
        Ok(())
    }
}

impl Notifier for PushoverNotifier {
    async fn notify(&self, summary: &ArrivalsSummary) -> Result<(), NotifyError> {
        self.send_text(&format_summary(summary)).await
    }

    async fn notify_text(&self, text: &str) -> Result<(), NotifyError> {
        self.send_text(text).await
    }
}
