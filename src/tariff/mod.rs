//! Time-of-use pricing and per-interval economics.

/// A single time-of-use band.
pub mod band;
/// Cost and revenue with and without the battery.
pub mod economics;
/// Band lookup by timestamp.
pub mod schedule;

pub use band::TariffBand;
pub use economics::Economics;
pub use schedule::{Prices, TariffSchedule};
