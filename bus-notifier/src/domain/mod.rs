//! Domain types for the bus arrivals notifier.
//!
//! These types represent validated query and arrival data. Untrusted input
//! (query params from a control source, upstream `line_name` strings, ETA
//! timestamps) is checked when converting into them, so code that receives
//! these types can trust their validity.

mod eta;
mod line;
mod query;
mod station;
mod summary;

pub use eta::{InvalidEta, minutes_until, parse_eta};
pub use line::{InvalidLineNumber, LineNumber};
pub use query::{InvalidQuery, Query, QueryParams};
pub use station::{InvalidStationId, StationId};
pub use summary::ArrivalsSummary;
