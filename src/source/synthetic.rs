use chrono::{Datelike, Duration, NaiveDateTime, Timelike};
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::config::{ConfigError, GeneratorConfig};
use crate::sim::types::EnergyRecord;

/// Hours `[start, end)` with peak household demand.
const PEAK_HOURS: [(u32, u32); 2] = [(6, 9), (17, 22)];

/// Seasonal profile for one month.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Season {
    consumption_factor: f64,
    daylight: (u32, u32),
    production_wh: (f64, f64),
}

/// Hourly synthetic household series with rooftop solar.
///
/// Consumption is drawn from a base or peak range by hour of day and scaled
/// by a seasonal factor. Production follows a half-sine over the month's
/// daylight window with a random peak. A share of production is consumed on
/// site; what remains of either side is the grid exchange.
///
/// The series is generated lazily and is fully determined by the seed.
///
/// # Examples
///
/// ```
/// use grid_battery_sim::config::GeneratorConfig;
/// use grid_battery_sim::source::SyntheticSource;
///
/// let config = GeneratorConfig { days: 2, ..GeneratorConfig::default() };
/// let records: Vec<_> = SyntheticSource::new(&config).unwrap().collect();
/// assert_eq!(records.len(), 48);
/// ```
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    config: GeneratorConfig,
    next: NaiveDateTime,
    remaining: usize,
    rng: StdRng,
}

impl SyntheticSource {
    /// Creates a source starting at midnight of `config.start_date`.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` of the generator section.
    pub fn new(config: &GeneratorConfig) -> Result<Self, ConfigError> {
        if let Some(err) = config.validate().into_iter().next() {
            return Err(err);
        }
        Ok(Self {
            config: config.clone(),
            next: config.start_date.and_time(Default::default()),
            remaining: config.days as usize * 24,
            rng: StdRng::seed_from_u64(config.seed),
        })
    }

    fn season(&self, month: u32) -> Season {
        let c = &self.config;
        if c.cold_months.contains(&month) {
            Season {
                consumption_factor: c.cold_factor,
                daylight: (c.cold_daylight_hours[0], c.cold_daylight_hours[1]),
                production_wh: (c.cold_production_wh[0], c.cold_production_wh[1]),
            }
        } else if c.hot_months.contains(&month) {
            Season {
                consumption_factor: c.hot_factor,
                daylight: (c.hot_daylight_hours[0], c.hot_daylight_hours[1]),
                production_wh: (c.hot_production_wh[0], c.hot_production_wh[1]),
            }
        } else {
            // Shoulder months sit halfway between the two profiles.
            Season {
                consumption_factor: 1.0,
                daylight: (
                    (c.cold_daylight_hours[0] + c.hot_daylight_hours[0]) / 2,
                    (c.cold_daylight_hours[1] + c.hot_daylight_hours[1]) / 2,
                ),
                production_wh: (
                    (c.cold_production_wh[0] + c.hot_production_wh[0]) / 2.0,
                    (c.cold_production_wh[1] + c.hot_production_wh[1]) / 2.0,
                ),
            }
        }
    }

    /// Raw household consumption (Wh) for the hour.
    fn consumed_wh(&mut self, hour: u32, season: Season) -> f64 {
        let peak = PEAK_HOURS.iter().any(|&(s, e)| (s..e).contains(&hour));
        let [lo, hi] = if peak {
            self.config.peak_range_wh
        } else {
            self.config.base_range_wh
        };
        (self.rng.random_range(lo..=hi) * season.consumption_factor).round()
    }

    /// Solar production (Wh) for the hour.
    fn produced_wh(&mut self, hour: u32, season: Season) -> f64 {
        let (start, end) = season.daylight;
        if !(start..end).contains(&hour) {
            return 0.0;
        }
        let shape = (f64::from(hour - start) / f64::from(end - start) * std::f64::consts::PI).sin();
        let (lo, hi) = season.production_wh;
        (shape * self.rng.random_range(lo..=hi)).round()
    }
}

impl Iterator for SyntheticSource {
    type Item = EnergyRecord;

    fn next(&mut self) -> Option<EnergyRecord> {
        if self.remaining == 0 {
            return None;
        }
        let timestamp = self.next;
        let season = self.season(timestamp.month());

        let consumed = self.consumed_wh(timestamp.hour(), season);
        let produced = self.produced_wh(timestamp.hour(), season);
        let used = consumed.min(produced * self.config.self_consumption_ratio);

        self.next += Duration::hours(1);
        self.remaining -= 1;

        Some(EnergyRecord::new(
            timestamp,
            (consumed - used).max(0.0),
            (produced - used).max(0.0),
        ))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for SyntheticSource {}
