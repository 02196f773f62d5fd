//! Conversion from Curlbus responses to arrivals summaries.
//!
//! Aggregation is a pure function of the response, the query and the
//! current time. Bad individual visits are logged and skipped; a response
//! missing the station identity or the visits container is rejected as a
//! whole so the poller can retry it.

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use serde_json::Value;
use tracing::{error, warn};

use crate::curlbus::{RawScheduleResponse, Visit};
use crate::domain::{
    ArrivalsSummary, InvalidEta, InvalidLineNumber, LineNumber, Query, StationId, minutes_until,
    parse_eta,
};

/// A response missing structure that every cycle depends on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedResponse {
    #[error("malformed response: missing {0}")]
    Missing(&'static str),

    #[error("malformed response: visits for station {0} are not a list")]
    VisitsNotAList(StationId),
}

/// A single visit that could not be used.
#[derive(Debug, thiserror::Error)]
pub enum MalformedEntry {
    /// Entry isn't an object with string `line_name` and `eta`
    #[error("undecodable visit: {0}")]
    Undecodable(#[from] serde_json::Error),

    #[error(transparent)]
    Line(#[from] InvalidLineNumber),

    #[error(transparent)]
    Eta(#[from] InvalidEta),
}

/// Build the arrivals summary for `query` from a station response.
///
/// A service-reported `errors` value short-circuits: the summary carries the
/// error text and no arrivals, even when visits are also present.
pub fn aggregate(
    response: &RawScheduleResponse,
    query: &Query,
    now: &DateTime<FixedOffset>,
) -> Result<ArrivalsSummary, MalformedResponse> {
    if let Some(errors) = &response.errors {
        error!(station = %query.station, %errors, "Curlbus service returned errors");
        return Ok(ArrivalsSummary::service_error(errors.clone()));
    }

    let stop_info = response
        .stop_info
        .as_ref()
        .ok_or(MalformedResponse::Missing("stop_info"))?;
    let city = stop_info
        .address
        .as_ref()
        .and_then(|a| a.city.as_deref())
        .ok_or(MalformedResponse::Missing("stop_info.address.city"))?;
    let name = stop_info
        .name
        .as_ref()
        .and_then(|n| n.en.as_deref())
        .ok_or(MalformedResponse::Missing("stop_info.name.EN"))?;

    let visits = response
        .visits
        .as_ref()
        .ok_or(MalformedResponse::Missing("visits"))?;

    // No key (or null) for the station just means no buses are reported
    // right now. Other stations' keys are never looked at.
    let entries: &[Value] = match visits.get(&query.station.visits_key()) {
        None | Some(Value::Null) => &[],
        Some(Value::Array(entries)) => entries,
        Some(_) => return Err(MalformedResponse::VisitsNotAList(query.station)),
    };

    let mut decoded: Vec<(LineNumber, Visit)> = entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| match decode_visit(entry) {
            Ok(visit) => Some(visit),
            Err(e) => {
                warn!(station = %query.station, index, error = %e, "Skipping malformed visit");
                None
            }
        })
        .collect();

    // Stable, so visits of one line keep their upstream order
    decoded.sort_by_key(|(line, _)| *line);

    let mut summary = ArrivalsSummary::for_station(city, name);

    for (line, visit) in decoded {
        if visit.timestamp.is_some() {
            summary.timestamp = visit.timestamp.clone();
        }

        if !query.accepts(line) {
            continue;
        }

        let eta = match parse_eta(&visit.eta, now) {
            Ok(eta) => eta,
            Err(e) => {
                let e = MalformedEntry::from(e);
                warn!(station = %query.station, %line, error = %e, "Skipping visit with bad ETA");
                continue;
            }
        };

        summary.record(line, minutes_until(&eta, now));
    }

    Ok(summary)
}

/// Decode one raw visit and parse its line number.
fn decode_visit(entry: &Value) -> Result<(LineNumber, Visit), MalformedEntry> {
    let visit = Visit::deserialize(entry)?;
    let line = LineNumber::parse(&visit.line_name)?;
    Ok((line, visit))
}
