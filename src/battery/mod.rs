//! Battery physics: state of charge, cycle wear and capacity fade.

/// Equivalent-full-cycle accounting.
pub mod cycles;
/// Cycle-driven capacity fade.
pub mod degradation;
/// Stored energy, bounds and the charge/discharge operation.
pub mod state;

pub use cycles::CycleAccountant;
pub use degradation::DegradationPolicy;
pub use state::{BatteryState, Bounds, Flow, LossSide};
