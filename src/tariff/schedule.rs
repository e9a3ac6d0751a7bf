use chrono::{NaiveDateTime, NaiveTime};
use serde::Serialize;

use super::band::{SECONDS_PER_DAY, TariffBand};
use crate::config::ConfigError;
use crate::error::PricingError;

/// Buy and sell price (currency per Wh) in force at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prices {
    pub buy: f64,
    pub sell: f64,
}

/// A time-of-use tariff: bands that partition the day.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use grid_battery_sim::tariff::TariffSchedule;
///
/// let tariff = TariffSchedule::flat(0.0003, 0.0001);
/// let at = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap().and_hms_opt(12, 0, 0).unwrap();
/// assert_eq!(tariff.price_at(at).unwrap().buy, 0.0003);
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct TariffSchedule {
    bands: Vec<TariffBand>,
}

impl TariffSchedule {
    /// Builds a schedule, checking that the bands cover every second of the day exactly once.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` describing the first gap or overlap.
    pub fn new(bands: Vec<TariffBand>) -> Result<Self, ConfigError> {
        check_partition(&bands)?;
        Ok(Self { bands })
    }

    /// Builds a schedule without the coverage check.
    ///
    /// Lookups at uncovered times then fail with [`PricingError::NoMatchingBand`].
    pub fn new_unchecked(bands: Vec<TariffBand>) -> Self {
        Self { bands }
    }

    /// A single all-day band.
    pub fn flat(buy_price: f64, sell_price: f64) -> Self {
        Self {
            bands: vec![TariffBand::new(
                NaiveTime::default(),
                NaiveTime::default(),
                buy_price,
                sell_price,
            )],
        }
    }

    pub fn bands(&self) -> &[TariffBand] {
        &self.bands
    }

    /// Resolves the prices in force at `timestamp`.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::NoMatchingBand`] if no band covers the wall-clock time.
    pub fn price_at(&self, timestamp: NaiveDateTime) -> Result<Prices, PricingError> {
        let time = timestamp.time();
        self.bands
            .iter()
            .find(|band| band.contains(time))
            .map(|band| Prices {
                buy: band.buy_price,
                sell: band.sell_price,
            })
            .ok_or(PricingError::NoMatchingBand { timestamp })
    }
}

fn check_partition(bands: &[TariffBand]) -> Result<(), ConfigError> {
    if bands.is_empty() {
        return Err(ConfigError::new("tariff.bands", "at least one band is required"));
    }

    let mut segments: Vec<(u32, u32)> = bands.iter().flat_map(TariffBand::segments).collect();
    segments.sort_unstable();

    let mut cursor = 0;
    for (start, end) in segments {
        if start > cursor {
            return Err(ConfigError::new(
                "tariff.bands",
                format!("gap from {} to {}", clock(cursor), clock(start)),
            ));
        }
        if start < cursor {
            return Err(ConfigError::new(
                "tariff.bands",
                format!("overlap from {} to {}", clock(start), clock(cursor.min(end))),
            ));
        }
        cursor = end;
    }
    if cursor < SECONDS_PER_DAY {
        return Err(ConfigError::new(
            "tariff.bands",
            format!("gap from {} to 24:00:00", clock(cursor)),
        ));
    }
    Ok(())
}

fn clock(seconds: u32) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        seconds / 60 % 60,
        seconds % 60
    )
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn t(h: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, 0, 0).unwrap()
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn three_band() -> Vec<TariffBand> {
        vec![
            TariffBand::new(t(22), t(6), 0.10, 0.05),
            TariffBand::new(t(6), t(17), 0.25, 0.08),
            TariffBand::new(t(17), t(22), 0.40, 0.12),
        ]
    }

    #[test]
    fn three_band_day_is_a_partition() {
        let schedule = TariffSchedule::new(three_band()).unwrap();
        assert_eq!(schedule.price_at(at(3, 0)).unwrap().buy, 0.10);
        assert_eq!(schedule.price_at(at(6, 0)).unwrap().buy, 0.25);
        assert_eq!(schedule.price_at(at(21, 59)).unwrap().sell, 0.12);
        assert_eq!(schedule.price_at(at(22, 0)).unwrap().buy, 0.10);
    }

    #[test]
    fn flat_schedule_prices_every_time() {
        let schedule = TariffSchedule::flat(0.2, 0.05);
        for h in 0..24 {
            let prices = schedule.price_at(at(h, 30)).unwrap();
            assert_eq!(prices, Prices { buy: 0.2, sell: 0.05 });
        }
    }

    #[test]
    fn gap_is_rejected() {
        let bands = vec![
            TariffBand::new(t(0), t(12), 0.2, 0.1),
            TariffBand::new(t(13), t(0), 0.3, 0.1),
        ];
        let err = TariffSchedule::new(bands).unwrap_err();
        assert_eq!(err.field, "tariff.bands");
        assert!(err.message.contains("gap from 12:00:00 to 13:00:00"));
    }

    #[test]
    fn trailing_gap_is_rejected() {
        let bands = vec![TariffBand::new(t(0), t(23), 0.2, 0.1)];
        let err = TariffSchedule::new(bands).unwrap_err();
        assert!(err.message.contains("gap from 23:00:00"));
    }

    #[test]
    fn overlap_is_rejected() {
        let bands = vec![
            TariffBand::new(t(0), t(14), 0.2, 0.1),
            TariffBand::new(t(12), t(0), 0.3, 0.1),
        ];
        let err = TariffSchedule::new(bands).unwrap_err();
        assert!(err.message.contains("overlap"));
    }

    #[test]
    fn empty_schedule_is_rejected() {
        assert!(TariffSchedule::new(Vec::new()).is_err());
    }

    #[test]
    fn unchecked_schedule_reports_missing_band() {
        let schedule = TariffSchedule::new_unchecked(vec![TariffBand::new(t(8), t(20), 0.3, 0.1)]);
        assert!(schedule.price_at(at(12, 0)).is_ok());
        assert_eq!(
            schedule.price_at(at(2, 0)),
            Err(PricingError::NoMatchingBand {
                timestamp: at(2, 0)
            })
        );
    }
}
