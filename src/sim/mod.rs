/// Per-interval dispatch policy.
pub mod dispatch;
/// Sequential driver over a record series.
pub mod runner;
/// Run-level aggregates.
pub mod summary;
pub mod types;
