use chrono::{NaiveTime, Timelike};
use serde::Serialize;

pub(crate) const SECONDS_PER_DAY: u32 = 86_400;

/// One time-of-use band.
///
/// Covers `[start, end)` in wall-clock time. A band whose `end` is not after
/// its `start` wraps across midnight; `start == end` covers the whole day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TariffBand {
    /// Inclusive.
    pub start: NaiveTime,
    /// Exclusive.
    pub end: NaiveTime,
    /// Price paid per Wh bought from the grid.
    pub buy_price: f64,
    /// Price received per Wh sold to the grid.
    pub sell_price: f64,
}

impl TariffBand {
    pub fn new(start: NaiveTime, end: NaiveTime, buy_price: f64, sell_price: f64) -> Self {
        Self {
            start,
            end,
            buy_price,
            sell_price,
        }
    }

    /// Returns `true` if the band wraps past midnight (or spans the whole day).
    pub fn wraps(&self) -> bool {
        self.end <= self.start
    }

    /// Returns `true` when `time` falls inside the band.
    pub fn contains(&self, time: NaiveTime) -> bool {
        if self.wraps() {
            time >= self.start || time < self.end
        } else {
            time >= self.start && time < self.end
        }
    }

    /// Covered second-of-day ranges, split at midnight.
    pub(crate) fn segments(&self) -> Vec<(u32, u32)> {
        let start = self.start.num_seconds_from_midnight();
        let end = self.end.num_seconds_from_midnight();
        if start < end {
            vec![(start, end)]
        } else if end == 0 {
            vec![(start, SECONDS_PER_DAY)]
        } else {
            vec![(start, SECONDS_PER_DAY), (0, end)]
        }
    }
}
