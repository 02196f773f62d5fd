//! Wiring from [`AppConfig`] to a runnable [`ScheduleLoop`].
//!
//! Each collaborator has a live and an alternative implementation chosen at
//! startup, so the concrete types are wrapped in small enums.

use tracing::info;

use crate::config::{AppConfig, ConfigError, SourceConfig};
use crate::control::{ControlClient, ControlError, ControlledQuerySource};
use crate::curlbus::{
    CurlbusClient, FetchError, MockCurlbusClient, RawScheduleResponse,
};
use crate::domain::{ArrivalsSummary, InvalidQuery, Query, StationId};
use crate::notify::{ConsoleNotifier, Notifier, NotifyError, PushoverNotifier};
use crate::poller::{FixedQuery, QuerySource, RetryingPoller, StationDataFetcher};
use crate::schedule::{ScheduleLoop, StopHandle};

/// Errors that prevent the notifier from starting.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid query: {0}")]
    InvalidQuery(#[from] InvalidQuery),

    #[error("failed to set up station data source: {0}")]
    Fetch(#[from] FetchError),

    #[error("failed to set up notifier: {0}")]
    Notify(#[from] NotifyError),

    #[error("failed to set up control client: {0}")]
    Control(#[from] ControlError),
}

/// Station data from Curlbus or from local JSON files.
pub enum Fetcher {
    Curlbus(CurlbusClient),
    Mock(MockCurlbusClient),
}

impl StationDataFetcher for Fetcher {
    async fn fetch(&self, station: StationId) -> Result<RawScheduleResponse, FetchError> {
        match self {
            Fetcher::Curlbus(client) => client.fetch_station(station).await,
            Fetcher::Mock(client) => client.fetch(station).await,
        }
    }
}

/// Pushover when configured, the console otherwise.
#[derive(Clone)]
pub enum Sink {
    Pushover(PushoverNotifier),
    Console(ConsoleNotifier),
}

impl Notifier for Sink {
    async fn notify(&self, summary: &ArrivalsSummary) -> Result<(), NotifyError> {
        match self {
            Sink::Pushover(n) => n.notify(summary).await,
            Sink::Console(n) => n.notify(summary).await,
        }
    }

    async fn notify_text(&self, text: &str) -> Result<(), NotifyError> {
        match self {
            Sink::Pushover(n) => n.notify_text(text).await,
            Sink::Console(n) => n.notify_text(text).await,
        }
    }
}

/// A fixed station or one chosen by the control document.
pub enum Source {
    Fixed(FixedQuery),
    Controlled(ControlledQuerySource<ControlClient, Sink>),
}

impl QuerySource for Source {
    async fn query(&self) -> Result<Option<Query>, InvalidQuery> {
        match self {
            Source::Fixed(q) => q.query().await,
            Source::Controlled(q) => q.query().await,
        }
    }
}

pub type App = ScheduleLoop<Fetcher, Source, Sink>;

/// Read the configuration from the process environment and build the loop.
pub fn from_env(stop: StopHandle) -> Result<App, StartupError> {
    from_lookup(|name| std::env::var(name).ok(), stop)
}

/// Read the configuration through `lookup` and build the loop.
pub fn from_lookup(
    lookup: impl Fn(&str) -> Option<String>,
    stop: StopHandle,
) -> Result<App, StartupError> {
    build(AppConfig::from_lookup(lookup)?, stop)
}

/// Build the schedule loop. `stop` is handed to the control source so a
/// `terminate` command can end the loop.
pub fn build(config: AppConfig, stop: StopHandle) -> Result<App, StartupError> {
    let fetcher = match &config.mock_data_dir {
        Some(dir) => {
            info!(dir = %dir.display(), "Serving station data from mock files");
            Fetcher::Mock(MockCurlbusClient::new(dir)?)
        }
        None => {
            info!(base_url = %config.curlbus.base_url, "Using Curlbus");
            Fetcher::Curlbus(CurlbusClient::new(config.curlbus.clone())?)
        }
    };

    let sink = match config.pushover.clone() {
        Some(pushover) => {
            info!("Sending notifications through Pushover");
            Sink::Pushover(PushoverNotifier::new(pushover)?)
        }
        None => {
            info!("No push service configured, printing notifications");
            Sink::Console(ConsoleNotifier::stdout())
        }
    };

    let source = match config.source {
        SourceConfig::Fixed(params) => {
            let query = params.validate()?;
            info!(station = %query.station, lines = query.lines.len(), "Polling a fixed station");
            Source::Fixed(FixedQuery::new(query))
        }
        SourceConfig::Controlled { control, stations } => {
            info!(url = %control.url, home = %stations.home, work = %stations.work, "Following control document");
            let client = ControlClient::new(control)?;
            Source::Controlled(
                ControlledQuerySource::new(client, stations, stop, sink.clone())
                    .with_lines(config.lines),
            )
        }
    };

    Ok(ScheduleLoop::new(
        RetryingPoller::new(fetcher, source, sink),
        config.schedule,
    ))
}
