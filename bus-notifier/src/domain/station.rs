//! Station identifier type.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when a station id is not a positive integer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid station id: {reason}")]
pub struct InvalidStationId {
    reason: &'static str,
}

/// A Curlbus station (bus stop) identifier.
///
/// Station ids are positive integers. This type guarantees that any
/// `StationId` value is non-zero by construction.
///
/// # Examples
///
/// ```
/// use bus_notifier::domain::StationId;
///
/// let stop = StationId::new(33326).unwrap();
/// assert_eq!(stop.get(), 33326);
/// assert_eq!(stop.to_string(), "33326");
///
/// assert!(StationId::new(0).is_err());
/// assert!(StationId::parse("12a").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct StationId(u32);

impl StationId {
    /// Create a station id from an integer.
    pub fn new(id: u32) -> Result<Self, InvalidStationId> {
        if id == 0 {
            return Err(InvalidStationId {
                reason: "must be a positive integer",
            });
        }
        Ok(StationId(id))
    }

    /// Parse a station id from its decimal string form.
    pub fn parse(s: &str) -> Result<Self, InvalidStationId> {
        let id = s.trim().parse::<u32>().map_err(|_| InvalidStationId {
            reason: "must be a decimal integer",
        })?;
        Self::new(id)
    }

    /// Returns the numeric id.
    pub fn get(&self) -> u32 {
        self.0
    }

    /// The key under which Curlbus lists this station's visits.
    pub fn visits_key(&self) -> String {
        self.0.to_string()
    }
}

impl TryFrom<u32> for StationId {
    type Error = InvalidStationId;

    fn try_from(id: u32) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

impl From<StationId> for u32 {
    fn from(id: StationId) -> Self {
        id.0
    }
}

impl fmt::Debug for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StationId({})", self.0)
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
