//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};

use grid_battery_sim::battery::{BatteryState, LossSide};
use grid_battery_sim::config::{GeneratorConfig, ScenarioConfig};
use grid_battery_sim::sim::runner::SimulationRunner;
use grid_battery_sim::sim::types::EnergyRecord;
use grid_battery_sim::source::SyntheticSource;
use grid_battery_sim::tariff::TariffSchedule;

/// `2025-01-01 00:00` plus `hour` hours.
pub fn ts(hour: i64) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + Duration::hours(hour)
}

pub fn record(hour: i64, consumption: f64, reversed: f64) -> EnergyRecord {
    EnergyRecord::new(ts(hour), consumption, reversed)
}

/// Lossless 1000 Wh battery, window 50..950 Wh, holding `soc`.
pub fn small_battery(soc: f64) -> BatteryState {
    BatteryState::new(1000.0, 50.0, 950.0, soc, 1.0, LossSide::Charge).unwrap()
}

/// Runner over [`small_battery`] with a flat tariff (per Wh).
pub fn small_runner(soc: f64, buy: f64, sell: f64) -> SimulationRunner {
    SimulationRunner::new(small_battery(soc), TariffSchedule::flat(buy, sell))
}

/// Synthetic series of `days` days from the default generator.
pub fn synthetic_series(days: u32) -> Vec<EnergyRecord> {
    let config = GeneratorConfig {
        days,
        ..GeneratorConfig::default()
    };
    SyntheticSource::new(&config).unwrap().collect()
}

/// Runner for a built-in preset.
pub fn preset_runner(name: &str) -> SimulationRunner {
    ScenarioConfig::from_preset(name).unwrap().build_runner().unwrap()
}
