//! Curlbus (live Israeli bus arrivals) client.
//!
//! This module provides an HTTP client for `https://curlbus.app/`, which
//! reports real-time arrivals for a bus stop.
//!
//! Key characteristics of Curlbus:
//! - One request per station: `GET /<station_id>` with
//!   `Accept: application/json`
//! - Line numbers are strings (`"line_name": "74"`)
//! - Each upcoming bus is a separate visit, even for the same line
//! - A server error means the service is struggling, not that the network is

mod client;
mod error;
mod mock;
mod types;

pub use client::{CurlbusClient, CurlbusConfig, DEFAULT_BASE_URL};
pub use error::FetchError;
pub use mock::MockCurlbusClient;
pub use types::{Address, LocalizedName, RawScheduleResponse, StopInfo, Visit};
