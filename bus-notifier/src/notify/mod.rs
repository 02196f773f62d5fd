//! Notification sinks for arrivals summaries and status messages.
//!
//! The poller's obligation ends when [`Notifier::notify`] returns; delivery,
//! formatting and any retrying are up to the sink.

mod console;
mod format;
mod pushover;

use std::future::Future;
use std::sync::Arc;

use crate::domain::ArrivalsSummary;

pub use console::ConsoleNotifier;
pub use format::{IMMINENT_MINUTES, format_summary};
pub use pushover::{PushoverConfig, PushoverNotifier};

/// Errors from delivering a notification.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Push service returned an error status
    #[error("push API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Writing to a local sink failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Sink refused the message
    #[error("notification rejected: {0}")]
    Rejected(String),
}

/// Trait for delivering a finished arrivals summary.
pub trait Notifier {
    fn notify(
        &self,
        summary: &ArrivalsSummary,
    ) -> impl Future<Output = Result<(), NotifyError>> + Send;

    /// Deliver a plain status line, such as the notifier pausing.
    fn notify_text(&self, text: &str) -> impl Future<Output = Result<(), NotifyError>> + Send;
}

impl<T: Notifier + ?Sized> Notifier for Arc<T> {
    fn notify(
        &self,
        summary: &ArrivalsSummary,
    ) -> impl Future<Output = Result<(), NotifyError>> + Send {
        (**self).notify(summary)
    }

    fn notify_text(&self, text: &str) -> impl Future<Output = Result<(), NotifyError>> + Send {
        (**self).notify_text(text)
    }
}
