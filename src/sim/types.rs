//! Core simulation types: input records, dispatch outcomes and output rows.

use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;

/// Grid energy flow of one interval, as measured without a battery.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use grid_battery_sim::sim::types::EnergyRecord;
///
/// let ts = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap().and_hms_opt(12, 0, 0).unwrap();
/// let record = EnergyRecord::new(ts, 200.0, 900.0);
/// assert_eq!(record.net_energy(), 700.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnergyRecord {
    /// Interval-aligned instant.
    pub timestamp: NaiveDateTime,
    /// Energy drawn from the grid (Wh, >= 0).
    pub consumption: f64,
    /// Energy exported to the grid (Wh, >= 0).
    pub reversed: f64,
}

impl EnergyRecord {
    pub fn new(timestamp: NaiveDateTime, consumption: f64, reversed: f64) -> Self {
        Self {
            timestamp,
            consumption,
            reversed,
        }
    }

    /// Exported minus imported energy: positive is a surplus, negative a deficit.
    pub fn net_energy(&self) -> f64 {
        self.reversed - self.consumption
    }
}

/// Battery and grid outcome of one dispatch step (Wh).
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct StepDispatch {
    /// State of charge before the step.
    pub previous_soc: f64,
    /// State of charge after the step.
    pub soc: f64,
    /// Surplus energy absorbed by the battery (before losses).
    pub charge: f64,
    /// Energy removed from storage.
    pub discharge: f64,
    /// Energy the battery delivered to the load.
    pub delivered: f64,
    /// Energy bought from the grid.
    pub bought: f64,
    /// Energy sold to the grid.
    pub sold: f64,
}

/// Complete record of one simulated interval.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputRow {
    pub timestamp: NaiveDateTime,
    /// Echoed input consumption (Wh).
    pub consumption: f64,
    /// Echoed input export (Wh).
    pub reversed: f64,
    /// State of charge before the interval (Wh).
    ///
    /// Equals the previous row's `battery_soc` unless capacity fade clamped
    /// the stored energy in between.
    pub previous_soc: f64,
    /// State of charge after the interval (Wh).
    pub battery_soc: f64,
    /// Surplus absorbed by the battery (Wh).
    pub charge: f64,
    /// Energy removed from storage (Wh).
    pub discharge: f64,
    /// Energy bought with the battery in place (Wh).
    pub bought: f64,
    /// Energy sold with the battery in place (Wh).
    pub sold: f64,
    pub cost_without_battery: f64,
    pub revenue_without_battery: f64,
    pub cost_with_battery: f64,
    pub revenue_with_battery: f64,
    /// Cumulative equivalent full cycles.
    pub cycles: f64,
    /// Bounds in force during the interval (Wh).
    pub max_charge: f64,
    pub min_charge: f64,
    pub capacity: f64,
}

impl fmt::Display for OutputRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | cons={:>8.1} rev={:>8.1} Wh | SoC {:>8.1} -> {:>8.1} Wh \
             | chg={:>7.1} dis={:>7.1} | buy={:>7.1} sell={:>7.1} Wh \
             | cost {:>7.3} -> {:>7.3} | rev {:>7.3} -> {:>7.3} | cycles={:.4}",
            self.timestamp.format("%Y-%m-%d %H:%M"),
            self.consumption,
            self.reversed,
            self.previous_soc,
            self.battery_soc,
            self.charge,
            self.discharge,
            self.bought,
            self.sold,
            self.cost_without_battery,
            self.cost_with_battery,
            self.revenue_without_battery,
            self.revenue_with_battery,
            self.cycles,
        )
    }
}
