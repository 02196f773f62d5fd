//! Remote control of the notifier.
//!
//! A small JSON document, fetched at the top of every cycle, decides which
//! station is polled, pauses polling, or shuts the notifier down:
//!
//! ```json
//! {"command": "start" | "stop" | "terminate", "location": "home" | "work"}
//! ```

mod client;
mod source;
mod types;

pub use client::{ControlClient, ControlConfig, ControlError};
pub use source::{
    ControlFeed, ControlState, ControlledQuerySource, STOPPED_MESSAGE, Stations, TERMINATING_MESSAGE,
};
pub use types::{ControlCommand, ControlDocument, Location};
