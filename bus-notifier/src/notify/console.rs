//! Console sink, used when no push service is configured.

use std::io::Write;
use std::sync::{Arc, Mutex};

use crate::domain::ArrivalsSummary;

use super::format::format_summary;
use super::{Notifier, NotifyError};

/// Writes each formatted summary to a writer, stdout by default.
#[derive(Clone)]
pub struct ConsoleNotifier {
    out: Arc<Mutex<dyn Write + Send>>,
}

impl ConsoleNotifier {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }

    pub fn new(out: impl Write + Send + 'static) -> Self {
        Self {
            out: Arc::new(Mutex::new(out)),
        }
    }

    fn write_message(&self, message: &str) -> Result<(), NotifyError> {
        let mut out = self
            .out
            .lock()
            .map_err(|_| NotifyError::Rejected("console writer poisoned".to_string()))?;
        writeln!(out, "{message}\n")?;
        out.flush()?;
        Ok(())
    }
}

impl Notifier for ConsoleNotifier {
    async fn notify(&self, summary: &ArrivalsSummary) -> Result<(), NotifyError> {
        self.write_message(&format_summary(summary))
    }

    async fn notify_text(&self, text: &str) -> Result<(), NotifyError> {
        self.write_message(text)
    }
}
