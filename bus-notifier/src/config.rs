//! Process configuration, read once from the environment at startup.

use std::path::PathBuf;
use std::time::Duration;

use crate::control::{ControlConfig, Stations};
use crate::curlbus::CurlbusConfig;
use crate::domain::{LineNumber, QueryParams, StationId};
use crate::notify::PushoverConfig;
use crate::schedule::LoopConfig;

/// Errors from reading the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {var}: {value:?} ({reason})")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("PUSHOVER_TOKEN and PUSHOVER_USER must be set together")]
    IncompletePushover,
}

/// Where each cycle's query comes from.
#[derive(Debug, Clone)]
pub enum SourceConfig {
    /// Always poll these params. A missing or bad `BUS_STATION_ID` is
    /// reported as an invalid query when the app is built.
    Fixed(QueryParams),

    /// Follow a remote control document.
    Controlled {
        control: ControlConfig,
        stations: Stations,
    },
}

/// Everything the binary needs to wire up the notifier.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub curlbus: CurlbusConfig,

    /// Serve station data from JSON files instead of the network.
    pub mock_data_dir: Option<PathBuf>,

    /// Line filter. Empty means all lines.
    pub lines: Vec<LineNumber>,

    pub schedule: LoopConfig,

    /// Push sink; the console is used when unset.
    pub pushover: Option<PushoverConfig>,

    pub source: SourceConfig,
}

impl AppConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through `lookup`. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut curlbus = CurlbusConfig::new();
        if let Some(url) = get("CURLBUS_BASE_URL") {
            curlbus = curlbus.with_base_url(url);
        }
        if let Some(raw) = get("CURLBUS_TIMEOUT_SECS") {
            curlbus = curlbus.with_timeout(parse_secs("CURLBUS_TIMEOUT_SECS", &raw)?);
        }

        let lines = match get("BUS_LINE_NUMBERS") {
            Some(raw) => parse_lines(&raw)?,
            None => Vec::new(),
        };

        let schedule = match get("BUS_QUERY_INTERVAL_SECS") {
            Some(raw) => LoopConfig::new(Duration::from_secs(parse_secs(
                "BUS_QUERY_INTERVAL_SECS",
                &raw,
            )?)),
            None => LoopConfig::default(),
        };

        let pushover = match (get("PUSHOVER_TOKEN"), get("PUSHOVER_USER")) {
            (Some(token), Some(user)) => Some(PushoverConfig::new(token, user)),
            (None, None) => None,
            _ => return Err(ConfigError::IncompletePushover),
        };

        let source = match get("BUS_CONTROL_URL") {
            Some(url) => SourceConfig::Controlled {
                control: ControlConfig::new(url),
                stations: Stations {
                    home: required_station(&get, "BUS_HOME_STATION_ID")?,
                    work: required_station(&get, "BUS_WORK_STATION_ID")?,
                },
            },
            None => SourceConfig::Fixed(QueryParams {
                station_id: get("BUS_STATION_ID").map(|raw| station_value(&raw)),
                line_numbers: lines.iter().map(|l| l.get()).collect(),
            }),
        };

        Ok(Self {
            curlbus,
            mock_data_dir: get("BUS_MOCK_DATA_DIR").map(PathBuf::from),
            lines,
            schedule,
            pushover,
            source,
        })
    }
}

fn parse_secs(var: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.parse().map_err(|_| ConfigError::Invalid {
        var,
        value: raw.to_string(),
        reason: "expected a whole number of seconds".to_string(),
    })
}

/// Comma-separated line numbers; empty items are ignored.
fn parse_lines(raw: &str) -> Result<Vec<LineNumber>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            LineNumber::parse(s).map_err(|e| ConfigError::Invalid {
                var: "BUS_LINE_NUMBERS",
                value: raw.to_string(),
                reason: e.to_string(),
            })
        })
        .collect()
}

fn required_station(
    get: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<StationId, ConfigError> {
    let raw = get(var).ok_or(ConfigError::Missing(var))?;
    StationId::parse(&raw).map_err(|e| ConfigError::Invalid {
        var,
        value: raw,
        reason: e.to_string(),
    })
}

/// Numeric ids become JSON numbers; anything else is passed through as a
/// string for query validation to reject.
fn station_value(raw: &str) -> serde_json::Value {
    match raw.parse::<u64>() {
        Ok(n) => n.into(),
        Err(_) => raw.into(),
    }
}
