//! Bus arrivals notifier.
//!
//! Polls the Curlbus real-time arrivals service for a station, turns the
//! response into minutes-until-arrival per line, and pushes a short summary
//! to a notification sink on a fixed schedule.

pub mod aggregate;
pub mod app;
pub mod config;
pub mod control;
pub mod curlbus;
pub mod domain;
pub mod notify;
pub mod poller;
pub mod schedule;

#[cfg(test)]
mod test_support;
