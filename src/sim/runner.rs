//! Simulation runner that folds a record series into output rows.

use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use crate::battery::{BatteryState, CycleAccountant, DegradationPolicy};
use crate::error::{Result, SimError};
use crate::tariff::{Economics, TariffSchedule};

use super::dispatch::DispatchEngine;
use super::types::{EnergyRecord, OutputRow};

/// Lifecycle of a runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No record processed yet.
    Ready,
    /// At least one record processed.
    Running,
    /// Finished or aborted; no further records are accepted.
    Done,
}

/// Owns one battery and drives it through a record series.
///
/// Each record goes through pricing, dispatch, cycle accounting and row
/// assembly, in that order. Degradation, when configured, is applied after
/// the row is emitted so it only affects later intervals.
#[derive(Debug, Clone)]
pub struct SimulationRunner {
    battery: BatteryState,
    engine: DispatchEngine,
    tariff: TariffSchedule,
    baseline_tariff: Option<TariffSchedule>,
    cycles: CycleAccountant,
    degradation: Option<DegradationPolicy>,
    phase: Phase,
    last_timestamp: Option<NaiveDateTime>,
    rows_emitted: usize,
}

impl SimulationRunner {
    /// Creates a runner in the `Ready` phase.
    ///
    /// # Arguments
    ///
    /// * `battery` - Initial battery state, owned by this run
    /// * `tariff` - Prices for both the battery and no-battery economics
    pub fn new(battery: BatteryState, tariff: TariffSchedule) -> Self {
        let cycles = CycleAccountant::new(battery.rated_capacity());
        Self {
            battery,
            engine: DispatchEngine,
            tariff,
            baseline_tariff: None,
            cycles,
            degradation: None,
            phase: Phase::Ready,
            last_timestamp: None,
            rows_emitted: 0,
        }
    }

    /// Prices the no-battery side with a separate schedule.
    pub fn with_baseline_tariff(mut self, tariff: TariffSchedule) -> Self {
        self.baseline_tariff = Some(tariff);
        self
    }

    /// Enables cycle-driven capacity fade.
    pub fn with_degradation(mut self, policy: DegradationPolicy) -> Self {
        self.degradation = Some(policy);
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn battery(&self) -> &BatteryState {
        &self.battery
    }

    /// Equivalent full cycles so far.
    pub fn cycles(&self) -> f64 {
        self.cycles.cycles()
    }

    pub fn rows_emitted(&self) -> usize {
        self.rows_emitted
    }

    /// Simulates one interval and returns its row.
    ///
    /// # Errors
    ///
    /// Returns `SimError::Pricing` if the timestamp has no tariff band (the
    /// runner then moves to `Done`), or `SimError::Finished` once done.
    pub fn step(&mut self, record: &EnergyRecord) -> Result<OutputRow> {
        match self.phase {
            Phase::Done => return Err(SimError::Finished),
            Phase::Ready => {
                info!(
                    capacity_wh = self.battery.rated_capacity(),
                    soc_wh = self.battery.soc(),
                    efficiency = self.battery.efficiency(),
                    loss_side = ?self.battery.loss_side(),
                    "simulation started"
                );
                self.phase = Phase::Running;
            }
            Phase::Running => {}
        }

        if let Some(last) = self.last_timestamp
            && record.timestamp <= last
        {
            warn!(%last, timestamp = %record.timestamp, "timestamps are not strictly increasing");
        }
        self.last_timestamp = Some(record.timestamp);

        let prices = match self.tariff.price_at(record.timestamp) {
            Ok(prices) => prices,
            Err(err) => {
                self.phase = Phase::Done;
                return Err(err.into());
            }
        };
        let baseline_prices = match &self.baseline_tariff {
            Some(tariff) => match tariff.price_at(record.timestamp) {
                Ok(prices) => prices,
                Err(err) => {
                    self.phase = Phase::Done;
                    return Err(err.into());
                }
            },
            None => prices,
        };

        let bounds = self.battery.bounds();
        let dispatch = self.engine.step(record, &mut self.battery);
        let economics = Economics::compute(record, &dispatch, baseline_prices, prices);

        let cycles = self.cycles.record(dispatch.charge, dispatch.discharge);

        if dispatch.charge > 0.0 {
            debug!(timestamp = %record.timestamp, charge_wh = dispatch.charge, "charging");
        }
        if dispatch.discharge > 0.0 {
            debug!(timestamp = %record.timestamp, discharge_wh = dispatch.discharge, "discharging");
        }
        if dispatch.sold > 0.0 {
            debug!(timestamp = %record.timestamp, sold_wh = dispatch.sold, "selling");
        }
        if dispatch.bought > 0.0 {
            debug!(timestamp = %record.timestamp, bought_wh = dispatch.bought, "buying");
        }
        debug!(timestamp = %record.timestamp, soc_wh = dispatch.soc, "state of charge");

        let row = OutputRow {
            timestamp: record.timestamp,
            consumption: record.consumption,
            reversed: record.reversed,
            previous_soc: dispatch.previous_soc,
            battery_soc: dispatch.soc,
            charge: dispatch.charge,
            discharge: dispatch.discharge,
            bought: dispatch.bought,
            sold: dispatch.sold,
            cost_without_battery: economics.cost_without_battery,
            revenue_without_battery: economics.revenue_without_battery,
            cost_with_battery: economics.cost_with_battery,
            revenue_with_battery: economics.revenue_with_battery,
            cycles,
            max_charge: bounds.max_charge,
            min_charge: bounds.min_charge,
            capacity: bounds.capacity,
        };

        if let Some(policy) = &self.degradation {
            let dropped = self.battery.degrade_to(policy.bounds_at(cycles));
            if dropped > 0.0 {
                debug!(
                    timestamp = %record.timestamp,
                    dropped_wh = dropped,
                    "capacity fade clamped stored energy"
                );
            }
        }
        self.rows_emitted += 1;

        Ok(row)
    }

    /// Moves the runner to `Done`.
    pub fn finish(&mut self) {
        if self.phase != Phase::Done {
            info!(
                rows = self.rows_emitted,
                cycles = self.cycles.cycles(),
                throughput_wh = self.cycles.throughput(),
                soc_wh = self.battery.soc(),
                capacity_wh = self.battery.bounds().capacity,
                "simulation finished"
            );
            self.phase = Phase::Done;
        }
    }

    /// Lazily simulates `records`, yielding one row per record.
    ///
    /// The iterator stops after the first error.
    pub fn rows<I>(self, records: I) -> Rows<I::IntoIter>
    where
        I: IntoIterator<Item = EnergyRecord>,
    {
        Rows {
            runner: self,
            records: records.into_iter(),
        }
    }

    /// Simulates the whole series and collects the rows.
    ///
    /// # Errors
    ///
    /// Returns the first error; rows before it are discarded.
    pub fn run<I>(self, records: I) -> Result<Vec<OutputRow>>
    where
        I: IntoIterator<Item = EnergyRecord>,
    {
        self.rows(records).collect()
    }

    /// Simulates until the series ends or the first error.
    ///
    /// # Returns
    ///
    /// Every row emitted before the stop, plus the error that stopped the run, if any.
    pub fn run_until_error<I>(self, records: I) -> (Vec<OutputRow>, Option<SimError>)
    where
        I: IntoIterator<Item = EnergyRecord>,
    {
        let mut rows = Vec::new();
        for result in self.rows(records) {
            match result {
                Ok(row) => rows.push(row),
                Err(err) => return (rows, Some(err)),
            }
        }
        (rows, None)
    }
}

/// Iterator returned by [`SimulationRunner::rows`].
pub struct Rows<I> {
    runner: SimulationRunner,
    records: I,
}

impl<I> Rows<I> {
    /// The runner driving this iterator.
    pub fn runner(&self) -> &SimulationRunner {
        &self.runner
    }

    /// Stops the iteration and hands back the runner.
    pub fn into_runner(mut self) -> SimulationRunner {
        self.runner.finish();
        self.runner
    }
}

impl<I: Iterator<Item = EnergyRecord>> Iterator for Rows<I> {
    type Item = Result<OutputRow>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.runner.phase == Phase::Done {
            return None;
        }
        match self.records.next() {
            Some(record) => Some(self.runner.step(&record)),
            None => {
                self.runner.finish();
                None
            }
        }
    }
}
