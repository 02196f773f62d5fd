//! Control document DTOs.

use std::fmt;

use serde::Deserialize;

/// The remote control document.
///
/// ```json
/// {"command": "start", "location": "home"}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ControlDocument {
    #[serde(default)]
    pub command: ControlCommand,

    /// Where the user is. Absent, null or blank means nowhere to poll for.
    #[serde(default)]
    pub location: Option<String>,
}

impl ControlDocument {
    /// The location, if one is set.
    pub fn location(&self) -> Option<Result<Location, &str>> {
        let raw = self.location.as_deref().map(str::trim)?;
        if raw.is_empty() {
            return None;
        }
        Some(Location::parse(raw).ok_or(raw))
    }
}

/// What the control document asks the notifier to do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlCommand {
    /// Poll for the current location.
    #[default]
    Start,
    /// Pause polling until the command changes.
    Stop,
    /// Shut the notifier down.
    Terminate,
    /// Anything else is treated like `start`.
    #[serde(other)]
    Other,
}

/// A named place with a configured station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Location {
    Home,
    Work,
}

impl Location {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "home" => Some(Location::Home),
            "work" => Some(Location::Work),
            _ => None,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Home => write!(f, "home"),
            Location::Work => write!(f, "work"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> ControlDocument {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn full_document() {
        let doc = parse(r#"{"command": "start", "location": "home"}"#);

        assert_eq!(doc.command, ControlCommand::Start);
        assert_eq!(doc.location(), Some(Ok(Location::Home)));
    }

    #[test]
    fn commands() {
        assert_eq!(parse(r#"{"command": "stop"}"#).command, ControlCommand::Stop);
        assert_eq!(parse(r#"{"command": "terminate"}"#).command, ControlCommand::Terminate);
        assert_eq!(parse(r#"{"command": "reboot"}"#).command, ControlCommand::Other);
        assert_eq!(parse("{}").command, ControlCommand::Start);
    }

    #[test]
    fn missing_or_blank_location() {
        assert_eq!(parse("{}").location(), None);
        assert_eq!(parse(r#"{"location": null}"#).location(), None);
        assert_eq!(parse(r#"{"location": "  "}"#).location(), None);
    }

    #[test]
    fn location_is_case_insensitive() {
        assert_eq!(parse(r#"{"location": "Work"}"#).location(), Some(Ok(Location::Work)));
    }

    #[test]
    fn unknown_location_is_reported() {
        assert_eq!(parse(r#"{"location": "gym"}"#).location(), Some(Err("gym")));
    }
}
