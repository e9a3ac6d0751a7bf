//! CSV import of measured grid energy series.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::NaiveDateTime;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Result, SimError};
use crate::sim::types::EnergyRecord;

/// Accepted timestamp layouts, tried in order.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

#[derive(Debug, Deserialize)]
struct RawRecord {
    datetime: String,
    consumption: f64,
    reversed: f64,
}

/// Reads a `datetime,consumption,reversed` CSV file.
///
/// # Errors
///
/// Returns `SimError::Io` if the file cannot be opened, `SimError::Csv` on
/// malformed CSV, and `SimError::InvalidRecord` on bad values.
pub fn read_records(path: &Path) -> Result<Vec<EnergyRecord>> {
    let file = File::open(path)?;
    let records = parse_records(BufReader::new(file))?;
    debug!(path = %path.display(), records = records.len(), "loaded input series");
    Ok(records)
}

/// Parses records from any reader.
///
/// The result is sorted by timestamp; a repeated timestamp keeps its first
/// occurrence. Extra columns are ignored.
///
/// # Errors
///
/// See [`read_records`].
pub fn parse_records(reader: impl Read) -> Result<Vec<EnergyRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = rdr.headers()?.clone();

    let mut records = Vec::new();
    let mut raw = csv::StringRecord::new();
    while rdr.read_record(&mut raw)? {
        let line = raw.position().map_or(0, csv::Position::line);
        let rec: RawRecord = raw.deserialize(Some(&headers))?;

        let timestamp = parse_datetime(&rec.datetime).ok_or_else(|| SimError::InvalidRecord {
            line,
            message: format!("unrecognised datetime \"{}\"", rec.datetime),
        })?;
        for (name, value) in [("consumption", rec.consumption), ("reversed", rec.reversed)] {
            if !value.is_finite() || value < 0.0 {
                return Err(SimError::InvalidRecord {
                    line,
                    message: format!("{name} must be a finite value >= 0, got {value}"),
                });
            }
        }
        records.push(EnergyRecord::new(timestamp, rec.consumption, rec.reversed));
    }

    records.sort_by_key(|r| r.timestamp);
    let before = records.len();
    records.dedup_by_key(|r| r.timestamp);
    if records.len() < before {
        warn!(dropped = before - records.len(), "dropped records with duplicate timestamps");
    }

    Ok(records)
}

/// Parses `YYYY-MM-DD HH:MM[:SS]`, with a space or `T` separator.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}
