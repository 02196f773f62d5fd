//! Poll cycle error types.

use crate::aggregate::MalformedResponse;
use crate::curlbus::FetchError;
use crate::domain::InvalidQuery;
use crate::notify::NotifyError;

/// Why a single fetch-and-aggregate attempt failed. All of these are
/// retried.
#[derive(Debug, thiserror::Error)]
pub enum AttemptError {
    /// Network, timeout or unparseable body
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Response lacked station identity or the visits container
    #[error(transparent)]
    Malformed(#[from] MalformedResponse),

    /// Service reported an error and sent no arrival data at all
    #[error("service error: {0}")]
    Service(String),
}

/// Why a poll cycle produced no notification.
#[derive(Debug, thiserror::Error)]
pub enum PollError {
    /// The query can never succeed; not retried
    #[error("invalid query: {0}")]
    InvalidQuery(#[from] InvalidQuery),

    /// Every attempt in the retry budget failed
    #[error("giving up after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        #[source]
        last: AttemptError,
    },

    /// The notification sink failed; not retried
    #[error("notification failed: {0}")]
    Notify(#[from] NotifyError),
}

impl PollError {
    /// Whether retrying the same query can never help.
    pub fn is_permanent(&self) -> bool {
        matches!(self, PollError::InvalidQuery(_))
    }
}
