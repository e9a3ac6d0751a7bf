//! Home battery dispatch and economics simulator.
//!
//! A measured or synthetic grid energy series is replayed through a greedy
//! battery policy and priced under a time-of-use tariff, with and without
//! the battery.

#[cfg(feature = "api")]
pub mod api;
/// Battery state, cycle counting and capacity fade.
pub mod battery;
pub mod config;
pub mod error;
/// CSV input and output.
pub mod io;
pub mod logging;
/// Dispatch, runner and run summary.
pub mod sim;
/// Generated input series.
pub mod source;
/// Tariff bands, schedules and per-interval economics.
pub mod tariff;
