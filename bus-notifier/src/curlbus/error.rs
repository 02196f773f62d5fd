//! Curlbus client error types.

/// Transport-level failures fetching station data.
///
/// These never carry a service-reported error: Curlbus's own `errors` field
/// and upstream 5xx responses come back as a successful
/// [`RawScheduleResponse`](super::RawScheduleResponse).
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON
    #[error("JSON parse error: {message}{}", .body.as_ref().map(|b| format!(" (body: {b})")).unwrap_or_default())]
    Json {
        message: String,
        body: Option<String>,
    },

    /// API returned a non-success status other than a server error
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Client could not be set up, or mock data is unavailable
    #[error("not configured: {0}")]
    NotConfigured(String),
}
