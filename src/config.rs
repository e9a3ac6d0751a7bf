//! TOML-based scenario configuration and preset definitions.

use std::fs;
use std::path::Path;

use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use thiserror::Error;

use crate::battery::{BatteryState, DegradationPolicy, LossSide};
use crate::sim::runner::SimulationRunner;
use crate::tariff::{TariffBand, TariffSchedule};

/// Top-level scenario configuration parsed from TOML.
///
/// All sections have defaults matching the reference household. Load from
/// TOML with [`ScenarioConfig::from_toml_file`] or pick a preset with
/// [`ScenarioConfig::from_preset`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Battery parameters.
    #[serde(default)]
    pub battery: BatteryConfig,
    /// Capacity fade parameters.
    #[serde(default)]
    pub degradation: DegradationConfig,
    /// Tariff applied with the battery (and without, unless overridden).
    #[serde(default)]
    pub tariff: TariffConfig,
    /// Tariff applied to the no-battery comparison, if different.
    #[serde(default)]
    pub baseline_tariff: Option<TariffConfig>,
    /// Synthetic data source parameters.
    #[serde(default)]
    pub generator: GeneratorConfig,
}

/// Battery parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatteryConfig {
    /// Nominal capacity (Wh).
    pub capacity_wh: f64,
    /// Initial state of charge as a fraction of capacity.
    pub initial_soc: f64,
    /// Lowest allowed state of charge as a fraction of capacity.
    pub min_soc: f64,
    /// Highest allowed state of charge as a fraction of capacity.
    pub max_soc: f64,
    /// Round-trip efficiency (0.0–1.0].
    pub efficiency: f64,
    /// Side that books the efficiency loss: `"charge"` or `"discharge"`.
    pub loss_side: LossSide,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            capacity_wh: 10_000.0,
            initial_soc: 0.3,
            min_soc: 0.3,
            max_soc: 0.7,
            efficiency: 0.95,
            loss_side: LossSide::Charge,
        }
    }
}

/// Capacity fade parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DegradationConfig {
    pub enabled: bool,
    /// Equivalent full cycles until `retention` is reached.
    pub rated_cycles: f64,
    /// Remaining capacity fraction at end of rated life.
    pub retention: f64,
}

impl Default for DegradationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            rated_cycles: 5000.0,
            retention: 0.8,
        }
    }
}

/// A time-of-use tariff as a list of bands.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TariffConfig {
    pub bands: Vec<BandConfig>,
}

impl Default for TariffConfig {
    fn default() -> Self {
        Self::flat(0.30, 0.10)
    }
}

impl TariffConfig {
    /// One all-day band.
    pub fn flat(buy_per_kwh: f64, sell_per_kwh: f64) -> Self {
        Self {
            bands: vec![BandConfig::new("00:00", "00:00", buy_per_kwh, sell_per_kwh)],
        }
    }

    /// Builds the validated schedule, converting prices to per-Wh.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` whose field starts with `section`.
    pub fn schedule(&self, section: &str) -> Result<TariffSchedule, ConfigError> {
        let mut bands = Vec::with_capacity(self.bands.len());
        for (i, band) in self.bands.iter().enumerate() {
            let field = |name: &str| format!("{section}.bands[{i}].{name}");
            let start = parse_clock(&band.start).ok_or_else(|| {
                ConfigError::new(field("start"), format!("invalid time \"{}\"", band.start))
            })?;
            let end = parse_clock(&band.end).ok_or_else(|| {
                ConfigError::new(field("end"), format!("invalid time \"{}\"", band.end))
            })?;
            if !band.buy_per_kwh.is_finite() {
                return Err(ConfigError::new(field("buy_per_kwh"), "must be finite"));
            }
            if !band.sell_per_kwh.is_finite() {
                return Err(ConfigError::new(field("sell_per_kwh"), "must be finite"));
            }
            bands.push(TariffBand::new(
                start,
                end,
                band.buy_per_kwh / 1000.0,
                band.sell_per_kwh / 1000.0,
            ));
        }
        TariffSchedule::new(bands).map_err(|e| ConfigError {
            field: format!("{section}.bands"),
            message: e.message,
        })
    }
}

/// One tariff band; times are `HH:MM` or `HH:MM:SS`, `24:00` meaning midnight.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BandConfig {
    pub start: String,
    pub end: String,
    /// Price paid per kWh bought.
    pub buy_per_kwh: f64,
    /// Price received per kWh sold.
    pub sell_per_kwh: f64,
}

impl BandConfig {
    pub fn new(start: &str, end: &str, buy_per_kwh: f64, sell_per_kwh: f64) -> Self {
        Self {
            start: start.to_string(),
            end: end.to_string(),
            buy_per_kwh,
            sell_per_kwh,
        }
    }
}

/// Synthetic household parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// First simulated day.
    pub start_date: NaiveDate,
    /// Number of days to generate (must be > 0).
    pub days: u32,
    /// Random seed.
    pub seed: u64,
    /// Off-peak hourly consumption range (Wh).
    pub base_range_wh: [f64; 2],
    /// Peak-hour consumption range (Wh).
    pub peak_range_wh: [f64; 2],
    /// Months (1–12) using the cold profile.
    pub cold_months: Vec<u32>,
    /// Months (1–12) using the hot profile.
    pub hot_months: Vec<u32>,
    /// Consumption multiplier in cold months.
    pub cold_factor: f64,
    /// Consumption multiplier in hot months.
    pub hot_factor: f64,
    /// Share of production consumed on site (0.0–1.0).
    pub self_consumption_ratio: f64,
    /// Daylight window `[start_hour, end_hour)` in cold months.
    pub cold_daylight_hours: [u32; 2],
    /// Daylight window `[start_hour, end_hour)` in hot months.
    pub hot_daylight_hours: [u32; 2],
    /// Hourly peak production range in cold months (Wh).
    pub cold_production_wh: [f64; 2],
    /// Hourly peak production range in hot months (Wh).
    pub hot_production_wh: [f64; 2],
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default(),
            days: 365,
            seed: 42,
            base_range_wh: [500.0, 1500.0],
            peak_range_wh: [2000.0, 4500.0],
            cold_months: vec![12, 1, 2],
            hot_months: vec![6, 7, 8],
            cold_factor: 1.3,
            hot_factor: 1.2,
            self_consumption_ratio: 0.7,
            cold_daylight_hours: [8, 16],
            hot_daylight_hours: [6, 20],
            cold_production_wh: [1000.0, 3000.0],
            hot_production_wh: [3000.0, 6000.0],
        }
    }
}

impl GeneratorConfig {
    /// Validates the generator section.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.days == 0 {
            errors.push(ConfigError::new("generator.days", "must be > 0"));
        }
        for (name, [lo, hi]) in [
            ("base_range_wh", self.base_range_wh),
            ("peak_range_wh", self.peak_range_wh),
            ("cold_production_wh", self.cold_production_wh),
            ("hot_production_wh", self.hot_production_wh),
        ] {
            if !(lo.is_finite() && hi.is_finite() && 0.0 <= lo && lo <= hi) {
                errors.push(ConfigError::new(
                    format!("generator.{name}"),
                    "must be [min, max] with 0 <= min <= max",
                ));
            }
        }
        for (name, months) in [
            ("cold_months", &self.cold_months),
            ("hot_months", &self.hot_months),
        ] {
            if months.iter().any(|m| !(1..=12).contains(m)) {
                errors.push(ConfigError::new(
                    format!("generator.{name}"),
                    "months must be in 1..=12",
                ));
            }
        }
        for (name, [start, end]) in [
            ("cold_daylight_hours", self.cold_daylight_hours),
            ("hot_daylight_hours", self.hot_daylight_hours),
        ] {
            if !(start < end && end <= 24) {
                errors.push(ConfigError::new(
                    format!("generator.{name}"),
                    "must be [start, end] with start < end <= 24",
                ));
            }
        }
        for (name, factor) in [
            ("cold_factor", self.cold_factor),
            ("hot_factor", self.hot_factor),
        ] {
            if !(factor.is_finite() && factor >= 0.0) {
                errors.push(ConfigError::new(format!("generator.{name}"), "must be >= 0"));
            }
        }
        if !(0.0..=1.0).contains(&self.self_consumption_ratio) {
            errors.push(ConfigError::new(
                "generator.self_consumption_ratio",
                "must be in [0.0, 1.0]",
            ));
        }
        errors
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"battery.capacity_wh"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl ScenarioConfig {
    /// Returns the three-band time-of-use preset, compared against a flat tariff.
    pub fn time_of_use() -> Self {
        Self {
            tariff: TariffConfig {
                bands: vec![
                    BandConfig::new("22:00", "06:00", 0.15, 0.05),
                    BandConfig::new("06:00", "17:00", 0.30, 0.10),
                    BandConfig::new("17:00", "22:00", 0.45, 0.12),
                ],
            },
            baseline_tariff: Some(TariffConfig::flat(0.30, 0.10)),
            ..Self::default()
        }
    }

    /// Returns the ideal-battery preset: lossless, full range, no fade.
    pub fn ideal() -> Self {
        Self {
            battery: BatteryConfig {
                initial_soc: 0.5,
                min_soc: 0.0,
                max_soc: 1.0,
                efficiency: 1.0,
                ..BatteryConfig::default()
            },
            degradation: DegradationConfig {
                enabled: false,
                ..DegradationConfig::default()
            },
            ..Self::default()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["default", "time_of_use", "ideal"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "default" => Ok(Self::default()),
            "time_of_use" => Ok(Self::time_of_use()),
            "ideal" => Ok(Self::ideal()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let bat = &self.battery;
        if !(bat.capacity_wh.is_finite() && bat.capacity_wh > 0.0) {
            errors.push(ConfigError::new("battery.capacity_wh", "must be > 0"));
        }
        if !(0.0 <= bat.min_soc && bat.min_soc < bat.max_soc && bat.max_soc <= 1.0) {
            errors.push(ConfigError::new(
                "battery.min_soc",
                "must satisfy 0.0 <= battery.min_soc < battery.max_soc <= 1.0",
            ));
        }
        if !(bat.min_soc..=bat.max_soc).contains(&bat.initial_soc) {
            errors.push(ConfigError::new(
                "battery.initial_soc",
                "must be in [battery.min_soc, battery.max_soc]",
            ));
        }
        if !(bat.efficiency > 0.0 && bat.efficiency <= 1.0) {
            errors.push(ConfigError::new("battery.efficiency", "must be in (0.0, 1.0]"));
        }

        let deg = &self.degradation;
        if deg.enabled {
            if !(deg.rated_cycles.is_finite() && deg.rated_cycles > 0.0) {
                errors.push(ConfigError::new("degradation.rated_cycles", "must be > 0"));
            }
            if !(deg.retention > 0.0 && deg.retention <= 1.0) {
                errors.push(ConfigError::new("degradation.retention", "must be in (0.0, 1.0]"));
            }
        }

        if let Err(e) = self.tariff.schedule("tariff") {
            errors.push(e);
        }
        if let Some(baseline) = &self.baseline_tariff
            && let Err(e) = baseline.schedule("baseline_tariff")
        {
            errors.push(e);
        }

        errors.extend(self.generator.validate());

        errors
    }

    /// Builds the initial battery state.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the battery section is invalid.
    pub fn battery_state(&self) -> Result<BatteryState, ConfigError> {
        let b = &self.battery;
        BatteryState::from_fractions(
            b.capacity_wh,
            b.min_soc,
            b.max_soc,
            b.initial_soc,
            b.efficiency,
            b.loss_side,
        )
    }

    /// Builds a runner from the battery, degradation and tariff sections.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` encountered.
    pub fn build_runner(&self) -> Result<SimulationRunner, ConfigError> {
        let battery = self.battery_state()?;
        let degradation = if self.degradation.enabled {
            Some(DegradationPolicy::new(
                self.degradation.rated_cycles,
                self.degradation.retention,
                battery.bounds(),
            )?)
        } else {
            None
        };

        let mut runner = SimulationRunner::new(battery, self.tariff.schedule("tariff")?);
        if let Some(baseline) = &self.baseline_tariff {
            runner = runner.with_baseline_tariff(baseline.schedule("baseline_tariff")?);
        }
        if let Some(policy) = degradation {
            runner = runner.with_degradation(policy);
        }
        Ok(runner)
    }
}

/// Parses `HH:MM` or `HH:MM:SS`; `24:00` is accepted as midnight.
fn parse_clock(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    if s == "24:00" || s == "24:00:00" {
        return Some(NaiveTime::default());
    }
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_preset_valid() {
        let cfg = ScenarioConfig::default();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "default should be valid: {errors:?}");
    }

    #[test]
    fn from_preset_unknown() {
        let err = ScenarioConfig::from_preset("nonexistent");
        assert!(err.is_err());
        let e = err.unwrap_err();
        assert!(e.message.contains("unknown preset"));
    }

    #[test]
    fn all_presets_are_valid_and_build() {
        for name in ScenarioConfig::PRESETS {
            let cfg = ScenarioConfig::from_preset(name);
            assert!(cfg.is_ok(), "preset \"{name}\" should load");
            let cfg = cfg.unwrap();
            let errors = cfg.validate();
            assert!(errors.is_empty(), "preset \"{name}\" should be valid: {errors:?}");
            assert!(cfg.build_runner().is_ok());
        }
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[battery]
capacity_wh = 5000.0
initial_soc = 0.5
min_soc = 0.1
max_soc = 0.9
efficiency = 0.9
loss_side = "discharge"

[degradation]
enabled = false

[[tariff.bands]]
start = "07:00"
end = "23:00"
buy_per_kwh = 0.35
sell_per_kwh = 0.08

[[tariff.bands]]
start = "23:00"
end = "07:00"
buy_per_kwh = 0.18
sell_per_kwh = 0.05

[generator]
start_date = "2024-06-01"
days = 30
seed = 7
"#;
        let cfg = ScenarioConfig::from_toml_str(toml);
        assert!(cfg.is_ok(), "valid TOML should parse: {:?}", cfg.err());
        let cfg = cfg.unwrap();
        assert_eq!(cfg.battery.loss_side, LossSide::Discharge);
        assert_eq!(cfg.tariff.bands.len(), 2);
        assert_eq!(cfg.generator.days, 30);
        assert_eq!(
            cfg.generator.start_date,
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
        );
        assert!(cfg.validate().is_empty());

        let schedule = cfg.tariff.schedule("tariff").unwrap();
        assert!((schedule.bands()[0].buy_price - 0.00035).abs() < 1e-12);
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[battery]
capacity_wh = 1000.0
bogus_field = true
"#;
        assert!(ScenarioConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let toml = r#"
[battery]
capacity_wh = 13500.0
"#;
        let cfg = ScenarioConfig::from_toml_str(toml).unwrap();
        assert_eq!(cfg.battery.capacity_wh, 13_500.0);
        assert_eq!(cfg.battery.efficiency, 0.95);
        assert!(cfg.degradation.enabled);
        assert_eq!(cfg.tariff.bands.len(), 1);
        assert!(cfg.baseline_tariff.is_none());
    }

    #[test]
    fn validation_catches_bad_battery() {
        let mut cfg = ScenarioConfig::default();
        cfg.battery.capacity_wh = 0.0;
        cfg.battery.min_soc = 0.8;
        cfg.battery.efficiency = 1.2;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "battery.capacity_wh"));
        assert!(errors.iter().any(|e| e.field == "battery.min_soc"));
        assert!(errors.iter().any(|e| e.field == "battery.efficiency"));
    }

    #[test]
    fn validation_catches_initial_soc_outside_window() {
        let mut cfg = ScenarioConfig::default();
        cfg.battery.initial_soc = 0.0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "battery.initial_soc"));
    }

    #[test]
    fn validation_catches_tariff_gap() {
        let mut cfg = ScenarioConfig::default();
        cfg.tariff.bands = vec![
            BandConfig::new("00:00", "12:00", 0.3, 0.1),
            BandConfig::new("13:00", "24:00", 0.3, 0.1),
        ];
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "tariff.bands" && e.message.contains("gap")));
    }

    #[test]
    fn validation_catches_bad_band_time() {
        let mut cfg = ScenarioConfig::default();
        cfg.baseline_tariff = Some(TariffConfig {
            bands: vec![BandConfig::new("25:00", "00:00", 0.3, 0.1)],
        });
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "baseline_tariff.bands[0].start"));
    }

    #[test]
    fn validation_catches_bad_generator() {
        let mut cfg = ScenarioConfig::default();
        cfg.generator.days = 0;
        cfg.generator.base_range_wh = [10.0, 1.0];
        cfg.generator.hot_months = vec![13];
        cfg.generator.cold_daylight_hours = [16, 8];
        cfg.generator.self_consumption_ratio = 1.5;
        let fields: Vec<String> = cfg.validate().into_iter().map(|e| e.field).collect();
        for expected in [
            "generator.days",
            "generator.base_range_wh",
            "generator.hot_months",
            "generator.cold_daylight_hours",
            "generator.self_consumption_ratio",
        ] {
            assert!(fields.iter().any(|f| f == expected), "missing {expected}: {fields:?}");
        }
    }

    #[test]
    fn disabled_degradation_skips_its_checks() {
        let mut cfg = ScenarioConfig::ideal();
        cfg.degradation.rated_cycles = -1.0;
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn clock_parsing() {
        assert_eq!(parse_clock("07:30"), NaiveTime::from_hms_opt(7, 30, 0));
        assert_eq!(parse_clock("07:30:15"), NaiveTime::from_hms_opt(7, 30, 15));
        assert_eq!(parse_clock("24:00"), NaiveTime::from_hms_opt(0, 0, 0));
        assert_eq!(parse_clock("7h30"), None);
    }

    #[test]
    fn time_of_use_preset_has_peak_band() {
        let cfg = ScenarioConfig::time_of_use();
        let schedule = cfg.tariff.schedule("tariff").unwrap();
        let peak = schedule
            .bands()
            .iter()
            .map(|b| b.buy_price)
            .fold(f64::MIN, f64::max);
        assert!((peak - 0.00045).abs() < 1e-12);
        assert!(cfg.baseline_tariff.is_some());
    }
}
