//! Curlbus API response DTOs.
//!
//! These types map directly to the JSON Curlbus returns for
//! `GET /<station_id>` with `Accept: application/json`. Everything is
//! `Option` because the body is untrusted: missing fields are reported by
//! the aggregator rather than failing deserialization.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Response for a single station.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawScheduleResponse {
    /// Error text reported by the service itself. A non-string value is
    /// kept as its JSON text.
    #[serde(default, deserialize_with = "errors_as_text")]
    pub errors: Option<String>,

    /// Station details.
    #[serde(default)]
    pub stop_info: Option<StopInfo>,

    /// Upcoming visits, keyed by station id as a string.
    ///
    /// Values stay raw: the aggregator only looks at the queried station's
    /// entry and decodes its visits one at a time, so junk under other keys
    /// or in a single visit does not reject the whole response.
    #[serde(default)]
    pub visits: Option<Map<String, Value>>,
}

impl RawScheduleResponse {
    /// A response standing in for an upstream failure.
    pub fn service_error(errors: impl Into<String>) -> Self {
        Self {
            errors: Some(errors.into()),
            ..Self::default()
        }
    }

    /// Whether the response carries a `visits` container at all.
    pub fn has_visits(&self) -> bool {
        self.visits.is_some()
    }
}

fn errors_as_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    })
}

/// `stop_info` object.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StopInfo {
    /// Station code as printed on the stop sign.
    #[serde(default)]
    pub code: Option<Value>,

    #[serde(default)]
    pub address: Option<Address>,

    #[serde(default)]
    pub name: Option<LocalizedName>,
}

/// `stop_info.address` object.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub city: Option<String>,

    #[serde(default)]
    pub street: Option<String>,
}

/// Station name in the languages Curlbus provides.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocalizedName {
    #[serde(rename = "EN", default)]
    pub en: Option<String>,

    #[serde(rename = "HE", default)]
    pub he: Option<String>,
}

/// A single upcoming arrival of a line at the station.
#[derive(Debug, Clone, Deserialize)]
pub struct Visit {
    /// Line number, as a string (e.g. `"74"`).
    pub line_name: String,

    /// Estimated time of arrival.
    pub eta: String,

    /// When this estimate was produced.
    #[serde(default)]
    pub timestamp: Option<String>,
}
