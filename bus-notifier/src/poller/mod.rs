//! Retrying poller and the collaborators it depends on.
//!
//! The poller pulls a [`Query`] from a [`QuerySource`], fetches station data
//! through a [`StationDataFetcher`], aggregates it, and hands the result to
//! a [`Notifier`](crate::notify::Notifier). All three are traits so the
//! poller can be driven by mocks in tests.

mod cycle;
mod error;
mod retry;


use std::future::Future;
use std::sync::Arc;

use crate::curlbus::{FetchError, RawScheduleResponse};
use crate::domain::{InvalidQuery, Query, QueryParams, StationId};

pub use cycle::RetryingPoller;
pub use error::{AttemptError, PollError};
pub use retry::RetryPolicy;

/// Trait for fetching raw station data.
///
/// One call is one request: implementations must not retry.
pub trait StationDataFetcher {
    fn fetch(
        &self,
        station: StationId,
    ) -> impl Future<Output = Result<RawScheduleResponse, FetchError>> + Send;
}

/// Trait for supplying the query at the top of every poll cycle.
///
/// Returning `Ok(None)` means there is nothing to poll right now; the cycle
/// is skipped but the schedule keeps running.
pub trait QuerySource {
    fn query(&self) -> impl Future<Output = Result<Option<Query>, InvalidQuery>> + Send;
}

impl<T: StationDataFetcher + ?Sized> StationDataFetcher for Arc<T> {
    fn fetch(
        &self,
        station: StationId,
    ) -> impl Future<Output = Result<RawScheduleResponse, FetchError>> + Send {
        (**self).fetch(station)
    }
}

impl<T: QuerySource + ?Sized> QuerySource for Arc<T> {
    fn query(&self) -> impl Future<Output = Result<Option<Query>, InvalidQuery>> + Send {
        (**self).query()
    }
}

/// A query source that always asks for the same thing.
#[derive(Debug, Clone)]
pub struct FixedQuery {
    params: QueryParams,
}

impl FixedQuery {
    /// Always poll this validated query.
    pub fn new(query: Query) -> Self {
        Self {
            params: QueryParams {
                station_id: Some(query.station.get().into()),
                line_numbers: query.lines.iter().map(|l| l.get()).collect(),
            },
        }
    }

    /// Always poll these params. Validation happens every cycle, so invalid
    /// params surface as [`InvalidQuery`] from the first poll.
    pub fn from_params(params: QueryParams) -> Self {
        Self { params }
    }
}

impl QuerySource for FixedQuery {
    async fn query(&self) -> Result<Option<Query>, InvalidQuery> {
        self.params.validate().map(Some)
    }
}
