//! A single poll cycle: query, fetch, aggregate, notify.

use chrono::Local;
use tracing::{debug, error, info, warn};

use crate::aggregate::aggregate;
use crate::domain::{ArrivalsSummary, Query};
use crate::notify::Notifier;

use super::error::{AttemptError, PollError};
use super::retry::RetryPolicy;
use super::{QuerySource, StationDataFetcher};

/// Drives one poll cycle through the fetcher and aggregator, retrying
/// failed attempts with backoff, then hands the result to the notifier.
pub struct RetryingPoller<F, Q, N> {
    fetcher: F,
    queries: Q,
    notifier: N,
    policy: RetryPolicy,
}

impl<F, Q, N> RetryingPoller<F, Q, N>
where
    F: StationDataFetcher,
    Q: QuerySource,
    N: Notifier,
{
    /// Create a poller with the default retry policy.
    pub fn new(fetcher: F, queries: Q, notifier: N) -> Self {
        Self {
            fetcher,
            queries,
            notifier,
            policy: RetryPolicy::default(),
        }
    }

    /// Replace the retry policy.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn queries(&self) -> &Q {
        &self.queries
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Run one poll cycle.
    ///
    /// Returns `Ok(None)` when the query source has nothing to poll this
    /// cycle; nothing is fetched or sent in that case. On success the
    /// notifier has been called exactly once with the returned summary.
    ///
    /// If the service is still reporting an error with no arrival data when
    /// the retry budget runs out, that error summary is delivered so the end
    /// user hears about the outage.
    pub async fn poll_once(&self) -> Result<Option<ArrivalsSummary>, PollError> {
        let query = match self.queries.query().await {
            Ok(Some(query)) => query,
            Ok(None) => {
                debug!("Query source is idle, skipping cycle");
                return Ok(None);
            }
            Err(e) => {
                error!(error = %e, "Invalid query");
                return Err(e.into());
            }
        };

        let summary = match self.fetch_with_retry(&query).await {
            Ok(summary) => summary,
            Err(PollError::Exhausted {
                last: AttemptError::Service(errors),
                attempts,
            }) => {
                warn!(station = %query.station, attempts, %errors, "Service still failing, notifying with error");
                ArrivalsSummary::service_error(errors)
            }
            Err(e) => return Err(e),
        };

        self.notifier.notify(&summary).await?;
        debug!(
            station = %query.station,
            lines = summary.line_to_minutes.len(),
            "Notification sent"
        );

        Ok(Some(summary))
    }

    /// Fetch and aggregate, retrying up to the policy's attempt budget.
    async fn fetch_with_retry(&self, query: &Query) -> Result<ArrivalsSummary, PollError> {
        let attempts = self.policy.attempts();
        let mut attempt = 1;

        loop {
            let error = match self.attempt(query).await {
                Ok(summary) => {
                    if attempt > 1 {
                        info!(station = %query.station, attempt, "Poll succeeded after retrying");
                    }
                    return Ok(summary);
                }
                Err(e) => e,
            };

            if attempt >= attempts {
                error!(
                    station = %query.station,
                    attempts,
                    error = %error,
                    "Poll failed, retry budget exhausted"
                );
                return Err(PollError::Exhausted {
                    attempts,
                    last: error,
                });
            }

            let delay = self.policy.delay_after(attempt);
            warn!(
                station = %query.station,
                attempt,
                max_attempts = attempts,
                delay_secs = delay.as_secs_f64(),
                error = %error,
                "Poll attempt failed, retrying"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// One fetch and aggregation.
    async fn attempt(&self, query: &Query) -> Result<ArrivalsSummary, AttemptError> {
        let response = self.fetcher.fetch(query.station).await?;

        if let Some(errors) = &response.errors
            && !response.has_visits()
        {
            return Err(AttemptError::Service(errors.clone()));
        }

        let now = Local::now().fixed_offset();
        Ok(aggregate(&response, query, &now)?)
    }
}
