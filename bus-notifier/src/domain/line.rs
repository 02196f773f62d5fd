//! Bus line numbers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when a `line_name` is not a plain line number.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid line number: {0:?}")]
pub struct InvalidLineNumber(pub String);

/// A bus line (route) number.
///
/// Curlbus transmits these as strings (`"line_name": "74"`), but they are
/// compared and ordered numerically, so `9` sorts before `74`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineNumber(u32);

impl LineNumber {
    pub fn new(n: u32) -> Self {
        LineNumber(n)
    }

    /// Parse the upstream `line_name` string.
    ///
    /// Surrounding whitespace is ignored; anything else that isn't a
    /// non-negative decimal integer (e.g. "5א", "N12") is rejected.
    pub fn parse(s: &str) -> Result<Self, InvalidLineNumber> {
        let trimmed = s.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidLineNumber(s.to_string()));
        }
        trimmed
            .parse::<u32>()
            .map(LineNumber)
            .map_err(|_| InvalidLineNumber(s.to_string()))
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl From<u32> for LineNumber {
    fn from(n: u32) -> Self {
        LineNumber(n)
    }
}

impl fmt::Debug for LineNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line({})", self.0)
    }
}

impl fmt::Display for LineNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any u32 rendered in decimal parses back to itself
        #[test]
        fn decimal_roundtrip(n in any::<u32>()) {
            prop_assert_eq!(LineNumber::parse(&n.to_string()).unwrap().get(), n);
        }

        /// Strings containing a letter are always rejected
        #[test]
        fn letters_rejected(s in "[0-9]{0,3}[a-zA-Z][0-9a-zA-Z]{0,3}") {
            prop_assert!(LineNumber::parse(&s).is_err());
        }
    }
}
