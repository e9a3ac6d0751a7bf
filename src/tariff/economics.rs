use serde::Serialize;

use super::schedule::Prices;
use crate::sim::types::{EnergyRecord, StepDispatch};

/// Money flows of one interval, with and without the battery.
///
/// The two sides are independent: "without" prices the raw record,
/// "with" prices the dispatch outcome.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct Economics {
    pub cost_without_battery: f64,
    pub revenue_without_battery: f64,
    pub cost_with_battery: f64,
    pub revenue_with_battery: f64,
}

impl Economics {
    /// Prices one interval.
    ///
    /// # Arguments
    ///
    /// * `record` - Raw grid flow of the interval
    /// * `dispatch` - Grid flow after battery action
    /// * `baseline` - Prices applied to the no-battery household
    /// * `current` - Prices applied to the household with the battery
    pub fn compute(
        record: &EnergyRecord,
        dispatch: &StepDispatch,
        baseline: Prices,
        current: Prices,
    ) -> Self {
        Self {
            cost_without_battery: record.consumption * baseline.buy,
            revenue_without_battery: record.reversed * baseline.sell,
            cost_with_battery: dispatch.bought * current.buy,
            revenue_with_battery: dispatch.sold * current.sell,
        }
    }

    /// Net spend without the battery (cost minus revenue).
    pub fn net_without_battery(&self) -> f64 {
        self.cost_without_battery - self.revenue_without_battery
    }

    /// Net spend with the battery (cost minus revenue).
    pub fn net_with_battery(&self) -> f64 {
        self.cost_with_battery - self.revenue_with_battery
    }

    /// How much the battery saved in this interval.
    pub fn savings(&self) -> f64 {
        self.net_without_battery() - self.net_with_battery()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;

    use super::*;

    fn record(consumption: f64, reversed: f64) -> EnergyRecord {
        let timestamp = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(18, 0, 0)
            .unwrap();
        EnergyRecord::new(timestamp, consumption, reversed)
    }

    fn dispatch(bought: f64, sold: f64) -> StepDispatch {
        StepDispatch {
            bought,
            sold,
            ..StepDispatch::default()
        }
    }

    #[test]
    fn depleted_battery_costs_the_same() {
        let prices = Prices {
            buy: 0.20,
            sell: 0.05,
        };
        let econ = Economics::compute(&record(1000.0, 0.0), &dispatch(1000.0, 0.0), prices, prices);
        assert_abs_diff_eq!(econ.cost_without_battery, 200.0, epsilon = 1e-9);
        assert_abs_diff_eq!(econ.cost_with_battery, 200.0, epsilon = 1e-9);
        assert_abs_diff_eq!(econ.savings(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn sides_use_their_own_prices() {
        let baseline = Prices {
            buy: 0.30,
            sell: 0.10,
        };
        let current = Prices {
            buy: 0.40,
            sell: 0.12,
        };
        let econ =
            Economics::compute(&record(100.0, 50.0), &dispatch(20.0, 0.0), baseline, current);
        assert_abs_diff_eq!(econ.cost_without_battery, 30.0, epsilon = 1e-9);
        assert_abs_diff_eq!(econ.revenue_without_battery, 5.0, epsilon = 1e-9);
        assert_abs_diff_eq!(econ.cost_with_battery, 8.0, epsilon = 1e-9);
        assert_eq!(econ.revenue_with_battery, 0.0);
        assert_abs_diff_eq!(econ.savings(), 17.0, epsilon = 1e-9);
    }
}
