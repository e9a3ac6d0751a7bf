//! Post-hoc run summary computed from output rows.

use std::fmt;

use serde::Serialize;

use super::types::OutputRow;

/// Aggregate figures of a complete simulation run.
///
/// Computed from the emitted rows so the report always agrees with the
/// persisted series.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SimulationSummary {
    /// Number of simulated intervals.
    pub intervals: usize,
    /// Total energy drawn from the grid without the battery (Wh).
    pub consumption_wh: f64,
    /// Total energy exported without the battery (Wh).
    pub reversed_wh: f64,
    /// Total energy bought with the battery (Wh).
    pub bought_wh: f64,
    /// Total energy sold with the battery (Wh).
    pub sold_wh: f64,
    /// Total surplus absorbed by the battery (Wh).
    pub charged_wh: f64,
    /// Total energy removed from storage (Wh).
    pub discharged_wh: f64,
    pub cost_without_battery: f64,
    pub revenue_without_battery: f64,
    pub cost_with_battery: f64,
    pub revenue_with_battery: f64,
    /// Equivalent full cycles at the end of the run.
    pub cycles: f64,
    /// Usable capacity in force during the last interval (Wh).
    pub final_capacity_wh: f64,
    /// State of charge after the last interval (Wh).
    pub final_soc_wh: f64,
}

impl SimulationSummary {
    /// Sums all rows of a run.
    pub fn from_rows(rows: &[OutputRow]) -> Self {
        let Some(last) = rows.last() else {
            return Self::default();
        };

        let mut summary = Self {
            intervals: rows.len(),
            cycles: last.cycles,
            final_capacity_wh: last.capacity,
            final_soc_wh: last.battery_soc,
            ..Self::default()
        };

        for r in rows {
            summary.consumption_wh += r.consumption;
            summary.reversed_wh += r.reversed;
            summary.bought_wh += r.bought;
            summary.sold_wh += r.sold;
            summary.charged_wh += r.charge;
            summary.discharged_wh += r.discharge;
            summary.cost_without_battery += r.cost_without_battery;
            summary.revenue_without_battery += r.revenue_without_battery;
            summary.cost_with_battery += r.cost_with_battery;
            summary.revenue_with_battery += r.revenue_with_battery;
        }

        summary
    }

    /// Net spend without the battery.
    pub fn net_cost_without_battery(&self) -> f64 {
        self.cost_without_battery - self.revenue_without_battery
    }

    /// Net spend with the battery.
    pub fn net_cost_with_battery(&self) -> f64 {
        self.cost_with_battery - self.revenue_with_battery
    }

    /// Money saved by the battery over the run.
    pub fn savings(&self) -> f64 {
        self.net_cost_without_battery() - self.net_cost_with_battery()
    }
}

impl fmt::Display for SimulationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Simulation Summary ---")?;
        writeln!(f, "Intervals:             {}", self.intervals)?;
        writeln!(
            f,
            "Grid without battery:  {:.1} Wh in, {:.1} Wh out",
            self.consumption_wh, self.reversed_wh
        )?;
        writeln!(
            f,
            "Grid with battery:     {:.1} Wh in, {:.1} Wh out",
            self.bought_wh, self.sold_wh
        )?;
        writeln!(
            f,
            "Battery throughput:    {:.1} Wh charged, {:.1} Wh discharged ({:.2} equiv. cycles)",
            self.charged_wh, self.discharged_wh, self.cycles
        )?;
        writeln!(
            f,
            "Net cost w/o battery:  {:.2} (cost {:.2}, revenue {:.2})",
            self.net_cost_without_battery(),
            self.cost_without_battery,
            self.revenue_without_battery
        )?;
        writeln!(
            f,
            "Net cost with battery: {:.2} (cost {:.2}, revenue {:.2})",
            self.net_cost_with_battery(),
            self.cost_with_battery,
            self.revenue_with_battery
        )?;
        writeln!(f, "Savings:               {:.2}", self.savings())?;
        write!(
            f,
            "Final battery:         {:.1} Wh stored, {:.1} Wh capacity",
            self.final_soc_wh, self.final_capacity_wh
        )
    }
}
