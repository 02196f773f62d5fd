//! Query source steered by the remote control document.

use std::collections::BTreeSet;
use std::future::Future;
use std::sync::{Mutex, PoisonError};

use tracing::{info, warn};

use crate::domain::{InvalidQuery, LineNumber, Query, StationId};
use crate::notify::Notifier;
use crate::poller::QuerySource;
use crate::schedule::StopHandle;

use super::client::ControlError;
use super::types::{ControlCommand, ControlDocument, Location};

/// Sent once each time the control document pauses polling.
pub const STOPPED_MESSAGE: &str = "Bus notifier stopped, waiting for commands";

/// Sent when the control document asks the notifier to exit.
pub const TERMINATING_MESSAGE: &str = "Bus notifier terminating";

/// Trait for reading the current control document.
pub trait ControlFeed {
    fn current(&self) -> impl Future<Output = Result<ControlDocument, ControlError>> + Send;
}

/// Stations polled for each location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stations {
    pub home: StationId,
    pub work: StationId,
}

impl Stations {
    pub fn for_location(&self, location: Location) -> StationId {
        match location {
            Location::Home => self.home,
            Location::Work => self.work,
        }
    }
}

/// What the control document currently asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlState {
    /// Poll the station for this location.
    Active(Location),
    /// Stopped, or started with no location.
    Stopped,
    /// Started with a location that has no station.
    UnknownLocation(String),
    /// The control document could not be read.
    Unreachable,
    /// Shutdown requested.
    Terminating,
}

impl ControlState {
    fn from_document(doc: &ControlDocument) -> Self {
        match doc.command {
            ControlCommand::Terminate => return ControlState::Terminating,
            ControlCommand::Stop => return ControlState::Stopped,
            ControlCommand::Start | ControlCommand::Other => {}
        }

        match doc.location() {
            None => ControlState::Stopped,
            Some(Ok(location)) => ControlState::Active(location),
            Some(Err(raw)) => ControlState::UnknownLocation(raw.to_string()),
        }
    }
}

/// Picks the station to poll from the control document every cycle.
///
/// A `terminate` command requests a stop through the [`StopHandle`], so the
/// schedule loop exits after the current cycle. Entering the stopped or
/// terminating state is announced once through the status notifier.
pub struct ControlledQuerySource<C, N> {
    feed: C,
    stations: Stations,
    lines: BTreeSet<LineNumber>,
    stop: StopHandle,
    status: N,
    state: Mutex<Option<ControlState>>,
}

impl<C: ControlFeed, N: Notifier> ControlledQuerySource<C, N> {
    pub fn new(feed: C, stations: Stations, stop: StopHandle, status: N) -> Self {
        Self {
            feed,
            stations,
            lines: BTreeSet::new(),
            stop,
            status,
            state: Mutex::new(None),
        }
    }

    /// Line filter applied whichever station is polled.
    pub fn with_lines(mut self, lines: impl IntoIterator<Item = LineNumber>) -> Self {
        self.lines.extend(lines);
        self
    }

    /// State seen on the last cycle, if any.
    pub fn state(&self) -> Option<ControlState> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Record `next`, logging only when it differs from the previous state.
    /// Returns whether the state changed.
    fn transition(&self, next: &ControlState) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.as_ref() == Some(next) {
            return false;
        }

        match next {
            ControlState::Active(location) => {
                info!(%location, station = %self.stations.for_location(*location), "Polling for location");
            }
            ControlState::Stopped => info!("Nothing to do, waiting for commands"),
            ControlState::UnknownLocation(location) => {
                warn!(%location, "Control document names an unknown location, idling");
            }
            ControlState::Unreachable => warn!("Control document unavailable, idling"),
            ControlState::Terminating => info!("Terminate requested by control document"),
        }
        *state = Some(next.clone());
        true
    }

    /// Tell the user the notifier paused or is exiting. Failures are logged
    /// and otherwise ignored.
    async fn announce(&self, state: &ControlState) {
        let text = match state {
            ControlState::Stopped => STOPPED_MESSAGE,
            ControlState::Terminating => TERMINATING_MESSAGE,
            ControlState::Active(_) | ControlState::UnknownLocation(_) | ControlState::Unreachable => {
                return;
            }
        };

        if let Err(e) = self.status.notify_text(text).await {
            warn!(error = %e, "Failed to send status notification");
        }
    }
}

impl<C: ControlFeed + Sync, N: Notifier + Sync> QuerySource for ControlledQuerySource<C, N> {
    async fn query(&self) -> Result<Option<Query>, InvalidQuery> {
        let next = match self.feed.current().await {
            Ok(doc) => ControlState::from_document(&doc),
            Err(e) => {
                warn!(error = %e, "Failed to read control document");
                ControlState::Unreachable
            }
        };
        if self.transition(&next) {
            self.announce(&next).await;
        }

        match next {
            ControlState::Active(location) => Ok(Some(Query {
                station: self.stations.for_location(location),
                lines: self.lines.clone(),
            })),
            ControlState::Terminating => {
                self.stop.stop();
                Ok(None)
            }
            ControlState::Stopped | ControlState::UnknownLocation(_) | ControlState::Unreachable => {
                Ok(None)
            }
        }
    }
}
