//! Station query parameters.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::line::LineNumber;
use super::station::{InvalidStationId, StationId};

/// Error for a query that can never succeed, however often it is retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidQuery {
    /// No `station_id` was supplied
    #[error("missing \"station_id\"")]
    MissingStationId,

    /// `station_id` was present but not an integer
    #[error("\"station_id\" must be an integer, got {0}")]
    NotAnInteger(String),

    /// `station_id` was an integer outside the valid range
    #[error(transparent)]
    Station(#[from] InvalidStationId),
}

/// Unvalidated query parameters, as supplied by an external query source.
///
/// ```json
/// {"station_id": 12345, "line_numbers": [21, 42]}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryParams {
    /// Bus station id. Kept as a raw JSON value so that a string or a float
    /// is reported as an invalid query rather than a parse failure.
    #[serde(default)]
    pub station_id: Option<serde_json::Value>,

    /// Lines of interest. Empty or absent means all lines.
    #[serde(default)]
    pub line_numbers: Vec<u32>,
}

impl QueryParams {
    /// Params for a station with no line filter.
    pub fn station(station_id: u32) -> Self {
        Self {
            station_id: Some(station_id.into()),
            line_numbers: Vec::new(),
        }
    }

    /// Validate these params into a [`Query`].
    pub fn validate(&self) -> Result<Query, InvalidQuery> {
        let raw = match &self.station_id {
            None | Some(serde_json::Value::Null) => return Err(InvalidQuery::MissingStationId),
            Some(v) => v,
        };

        let id = raw
            .as_u64()
            .ok_or_else(|| InvalidQuery::NotAnInteger(raw.to_string()))?;
        let id = u32::try_from(id).map_err(|_| InvalidQuery::NotAnInteger(raw.to_string()))?;
        let station = StationId::new(id)?;

        Ok(Query::new(station).with_lines(self.line_numbers.iter().copied().map(LineNumber::new)))
    }
}

/// A validated query for one poll cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    /// Station to fetch.
    pub station: StationId,

    /// Lines to keep. Empty means all lines.
    pub lines: BTreeSet<LineNumber>,
}

impl Query {
    /// Query every line at a station.
    pub fn new(station: StationId) -> Self {
        Self {
            station,
            lines: BTreeSet::new(),
        }
    }

    /// Restrict the query to the given lines.
    pub fn with_lines(mut self, lines: impl IntoIterator<Item = LineNumber>) -> Self {
        self.lines.extend(lines);
        self
    }

    /// Whether arrivals for `line` pass the line filter.
    pub fn accepts(&self, line: LineNumber) -> bool {
        self.lines.is_empty() || self.lines.contains(&line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_minimal() {
        let query = QueryParams::station(33326).validate().unwrap();
        assert_eq!(query.station.get(), 33326);
        assert!(query.lines.is_empty());
    }

    #[test]
    fn validate_with_lines() {
        let params: QueryParams =
            serde_json::from_str(r#"{"station_id": 12345, "line_numbers": [42, 21, 42]}"#).unwrap();
        let query = params.validate().unwrap();

        assert_eq!(query.station.get(), 12345);
        assert_eq!(
            query.lines.iter().map(|l| l.get()).collect::<Vec<_>>(),
            vec![21, 42]
        );
    }

    #[test]
    fn missing_station_id() {
        let params: QueryParams = serde_json::from_str(r#"{"line_numbers": [1]}"#).unwrap();
        assert_eq!(params.validate(), Err(InvalidQuery::MissingStationId));

        let params: QueryParams = serde_json::from_str(r#"{"station_id": null}"#).unwrap();
        assert_eq!(params.validate(), Err(InvalidQuery::MissingStationId));
    }

    #[test]
    fn non_integer_station_id() {
        for raw in [r#""33326""#, "1.5", "-3", "true", "[1]"] {
            let params: QueryParams =
                serde_json::from_str(&format!(r#"{{"station_id": {raw}}}"#)).unwrap();
            assert!(
                matches!(params.validate(), Err(InvalidQuery::NotAnInteger(_))),
                "{raw} should be rejected as non-integer"
            );
        }
    }

    #[test]
    fn zero_station_id() {
        let params = QueryParams::station(0);
        assert!(matches!(params.validate(), Err(InvalidQuery::Station(_))));
    }

    #[test]
    fn accepts_respects_filter() {
        let station = StationId::new(1).unwrap();

        let all = Query::new(station);
        assert!(all.accepts(LineNumber::new(99)));

        let some = Query::new(station).with_lines([LineNumber::new(21), LineNumber::new(42)]);
        assert!(some.accepts(LineNumber::new(21)));
        assert!(some.accepts(LineNumber::new(42)));
        assert!(!some.accepts(LineNumber::new(99)));
    }

    #[test]
    fn error_display() {
        assert_eq!(
            InvalidQuery::MissingStationId.to_string(),
            "missing \"station_id\""
        );
        assert_eq!(
            InvalidQuery::NotAnInteger("\"abc\"".into()).to_string(),
            "\"station_id\" must be an integer, got \"abc\""
        );
        assert_eq!(
            InvalidQuery::from(StationId::new(0).unwrap_err()).to_string(),
            "invalid station id: must be a positive integer"
        );
    }
}
