//! Greedy, causal battery dispatch for one interval.

use crate::battery::BatteryState;

use super::types::{EnergyRecord, StepDispatch};

/// Per-interval dispatch policy.
///
/// A surplus charges the battery and the remainder is sold; a deficit
/// discharges the battery and the remainder is bought. Only the current
/// record is considered.
#[derive(Debug, Default, Clone, Copy)]
pub struct DispatchEngine;

impl DispatchEngine {
    /// Dispatches one record against the battery, mutating it.
    ///
    /// # Returns
    ///
    /// A `StepDispatch` with `bought >= 0`, `sold >= 0` and at most one of them non-zero.
    pub fn step(&self, record: &EnergyRecord, battery: &mut BatteryState) -> StepDispatch {
        let previous_soc = battery.soc();
        let net = record.net_energy();

        let (flow, bought, sold) = if net > 0.0 {
            let flow = battery.apply_flow(net, 0.0);
            (flow, 0.0, (net - flow.charge).max(0.0))
        } else if net < 0.0 {
            let deficit = -net;
            let flow = battery.apply_flow(0.0, battery.discharge_request_for(deficit));
            (flow, (deficit - flow.delivered).max(0.0), 0.0)
        } else {
            (Default::default(), 0.0, 0.0)
        };

        StepDispatch {
            previous_soc,
            soc: battery.soc(),
            charge: flow.charge,
            discharge: flow.discharge,
            delivered: flow.delivered,
            bought,
            sold,
        }
    }
}
