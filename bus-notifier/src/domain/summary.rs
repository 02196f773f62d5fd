//! Normalized arrivals for one poll cycle.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::line::LineNumber;

/// Upcoming arrivals at a station, ready for notification.
///
/// Minutes per line live in a `BTreeSet`, so they are distinct and ascending
/// by construction, and lines iterate in numeric order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArrivalsSummary {
    /// Error text reported by the upstream service, if any. When set, no
    /// arrivals are present.
    pub errors: Option<String>,

    pub station_city: Option<String>,

    pub station_name: Option<String>,

    /// Timestamp reported with the last visit processed this cycle.
    pub timestamp: Option<String>,

    /// Minutes remaining until each arrival, per line.
    pub line_to_minutes: BTreeMap<LineNumber, BTreeSet<u32>>,
}

impl ArrivalsSummary {
    /// A summary carrying only an upstream error.
    pub fn service_error(errors: impl Into<String>) -> Self {
        Self {
            errors: Some(errors.into()),
            ..Self::default()
        }
    }

    /// An empty summary for a station.
    pub fn for_station(city: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            station_city: Some(city.into()),
            station_name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Record an arrival `minutes` from now on `line`.
    pub fn record(&mut self, line: LineNumber, minutes: u32) {
        self.line_to_minutes.entry(line).or_default().insert(minutes);
    }

    /// Minutes remaining for a line, soonest first.
    pub fn minutes(&self, line: LineNumber) -> Option<Vec<u32>> {
        self.line_to_minutes
            .get(&line)
            .map(|m| m.iter().copied().collect())
    }

    pub fn is_error(&self) -> bool {
        self.errors.is_some()
    }

    /// Whether no arrivals were recorded.
    pub fn is_empty(&self) -> bool {
        self.line_to_minutes.is_empty()
    }
}
