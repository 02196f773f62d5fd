//! Mock Curlbus client for running without network access.
//!
//! Loads recorded station responses from JSON files and serves them as if
//! they were live. Recordings carry absolute ETAs, so every visit is shifted
//! on each fetch to put the recording's earliest `timestamp` at the current
//! time; a recording keeps showing the same minutes-until-arrival however
//! long after it was captured the mock runs.

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, FixedOffset, Local};
use serde_json::Value;

use crate::domain::StationId;
use crate::poller::StationDataFetcher;

use super::error::FetchError;
use super::types::RawScheduleResponse;

/// Mock Curlbus client that serves data from JSON files.
#[derive(Debug, Clone)]
pub struct MockCurlbusClient {
    /// Pre-loaded station responses, keyed by station id.
    stations: HashMap<StationId, RawScheduleResponse>,
}

impl MockCurlbusClient {
    /// Create a new mock client by loading JSON files from a directory.
    ///
    /// Expects files named `{station_id}.json` (e.g., `33326.json`).
    pub fn new(data_dir: impl AsRef<Path>) -> Result<Self, FetchError> {
        Ok(Self {
            stations: load_dir(data_dir.as_ref())?,
        })
    }

    /// Get the stored response for a station, replayed relative to `now`.
    pub fn fetch_station_at(
        &self,
        station: StationId,
        now: DateTime<FixedOffset>,
    ) -> Result<RawScheduleResponse, FetchError> {
        let mut response = self
            .stations
            .get(&station)
            .cloned()
            .ok_or_else(|| FetchError::Api {
                status: 404,
                message: format!(
                    "No mock data for station {}. Available: {:?}",
                    station,
                    self.available_stations()
                        .iter()
                        .map(|s| s.get())
                        .collect::<Vec<_>>()
                ),
            })?;

        rebase(&mut response, now);
        Ok(response)
    }

    /// List available stations in the mock data.
    pub fn available_stations(&self) -> Vec<StationId> {
        let mut ids: Vec<_> = self.stations.keys().copied().collect();
        ids.sort();
        ids
    }
}

impl StationDataFetcher for MockCurlbusClient {
    async fn fetch(&self, station: StationId) -> Result<RawScheduleResponse, FetchError> {
        self.fetch_station_at(station, Local::now().fixed_offset())
    }
}

/// Shift every visit's `eta` and `timestamp` so the earliest recorded
/// `timestamp` lands on `now`. Values that don't parse are left alone.
fn rebase(response: &mut RawScheduleResponse, now: DateTime<FixedOffset>) {
    let Some(visits) = response.visits.as_mut() else {
        return;
    };

    let recorded_at = visits
        .values()
        .filter_map(Value::as_array)
        .flatten()
        .filter_map(|visit| visit.get("timestamp")?.as_str())
        .filter_map(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .min();
    let Some(recorded_at) = recorded_at else {
        return;
    };
    let shift = now - recorded_at;

    for visit in visits.values_mut().filter_map(Value::as_array_mut).flatten() {
        for field in ["eta", "timestamp"] {
            if let Some(Value::String(raw)) = visit.get_mut(field)
                && let Ok(at) = DateTime::parse_from_rfc3339(raw)
            {
                *raw = (at + shift).to_rfc3339();
            }
        }
    }
}

fn load_dir(data_dir: &Path) -> Result<HashMap<StationId, RawScheduleResponse>, FetchError> {
    let mut stations = HashMap::new();

    let entries = std::fs::read_dir(data_dir).map_err(|e| {
        FetchError::NotConfigured(format!("failed to read mock data directory: {e}"))
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| {
            FetchError::NotConfigured(format!("failed to read directory entry: {e}"))
        })?;

        let path = entry.path();
        if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }

        // "33326.json" -> 33326
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| FetchError::NotConfigured(format!("invalid filename: {path:?}")))?;

        let station = StationId::parse(stem).map_err(|_| {
            FetchError::NotConfigured(format!("invalid station id in filename: {stem}"))
        })?;

        let json = std::fs::read_to_string(&path)
            .map_err(|e| FetchError::NotConfigured(format!("failed to read {path:?}: {e}")))?;

        let response: RawScheduleResponse = serde_json::from_str(&json).map_err(|e| {
            FetchError::Json {
                message: format!("failed to parse {path:?}: {e}"),
                body: None,
            }
        })?;

        stations.insert(station, response);
    }

    if stations.is_empty() {
        return Err(FetchError::NotConfigured(format!(
            "no mock station files found in {data_dir:?}"
        )));
    }

    Ok(stations)
}
