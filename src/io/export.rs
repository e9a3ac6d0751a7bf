//! CSV export for simulation rows and input series.

use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use chrono::NaiveDateTime;
use tracing::{debug, info};

use crate::error::Result;
use crate::sim::types::{EnergyRecord, OutputRow};

use super::import::parse_datetime;

/// Column header for simulation rows.
const HEADER: &str = "datetime,consumption,reversed,previous_soc,battery_soc,\
                      charge,discharge,bought,sold,\
                      cost_without_battery,revenue_without_battery,\
                      cost_with_battery,revenue_with_battery,\
                      cycles,max_charge,min_charge,capacity";

/// Column header for input series, as read by [`super::import::read_records`].
const RECORD_HEADER: &str = "datetime,consumption,reversed";

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Writes simulation rows to a new CSV file, creating parent directories.
///
/// # Errors
///
/// Returns `SimError::Io` if the directory or file cannot be created, or
/// `SimError::Csv` if writing fails.
pub fn export_csv(rows: &[OutputRow], path: &Path) -> Result<()> {
    create_parent_dir(path)?;
    let file = File::create(path)?;
    write_csv(rows, io::BufWriter::new(file))?;
    info!(path = %path.display(), rows = rows.len(), "exported simulation rows");
    Ok(())
}

/// Writes simulation rows as CSV, header first, to any writer.
///
/// # Errors
///
/// Returns `SimError::Csv` if writing fails.
pub fn write_csv(rows: &[OutputRow], writer: impl Write) -> Result<()> {
    write_rows(rows, writer, true)
}

/// Appends rows to an existing export, skipping timestamps it already holds.
///
/// A missing or empty file is created with a header.
///
/// # Returns
///
/// The number of rows written.
///
/// # Errors
///
/// Returns `SimError::Io` or `SimError::Csv` if reading or writing fails.
pub fn append_csv(rows: &[OutputRow], path: &Path) -> Result<usize> {
    let persisted = persisted_timestamps(path)?;
    let fresh: Vec<OutputRow> = rows
        .iter()
        .filter(|r| !persisted.contains(&r.timestamp))
        .cloned()
        .collect();

    let needs_header = persisted.is_empty() && fs::metadata(path).map_or(true, |m| m.len() == 0);
    create_parent_dir(path)?;
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    write_rows(&fresh, io::BufWriter::new(file), needs_header)?;

    info!(
        path = %path.display(),
        written = fresh.len(),
        skipped = rows.len() - fresh.len(),
        "appended simulation rows"
    );
    Ok(fresh.len())
}

/// Writes an input series to a CSV file, creating parent directories.
///
/// # Errors
///
/// Returns `SimError::Io` or `SimError::Csv` if writing fails.
pub fn export_records(records: &[EnergyRecord], path: &Path) -> Result<()> {
    create_parent_dir(path)?;
    let file = File::create(path)?;
    write_records(records, io::BufWriter::new(file))?;
    debug!(path = %path.display(), records = records.len(), "saved input series");
    Ok(())
}

/// Writes an input series in the import layout.
///
/// # Errors
///
/// Returns `SimError::Csv` if writing fails.
pub fn write_records(records: &[EnergyRecord], writer: impl Write) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(RECORD_HEADER.split(','))?;
    for r in records {
        wtr.write_record(&[
            r.timestamp.format(DATETIME_FORMAT).to_string(),
            r.consumption.to_string(),
            r.reversed.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

fn write_rows(rows: &[OutputRow], writer: impl Write, header: bool) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    if header {
        wtr.write_record(HEADER.split(','))?;
    }

    for r in rows {
        wtr.write_record(&[
            r.timestamp.format(DATETIME_FORMAT).to_string(),
            r.consumption.to_string(),
            r.reversed.to_string(),
            r.previous_soc.to_string(),
            r.battery_soc.to_string(),
            r.charge.to_string(),
            r.discharge.to_string(),
            r.bought.to_string(),
            r.sold.to_string(),
            r.cost_without_battery.to_string(),
            r.revenue_without_battery.to_string(),
            r.cost_with_battery.to_string(),
            r.revenue_with_battery.to_string(),
            r.cycles.to_string(),
            r.max_charge.to_string(),
            r.min_charge.to_string(),
            r.capacity.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Timestamps in the first column of an existing export.
fn persisted_timestamps(path: &Path) -> Result<HashSet<NaiveDateTime>> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(HashSet::new()),
        Err(e) => return Err(e.into()),
    };
    let mut rdr = csv::ReaderBuilder::new().from_reader(io::BufReader::new(file));
    let mut seen = HashSet::new();
    for record in rdr.records() {
        if let Some(ts) = record?.get(0).and_then(parse_datetime) {
            seen.insert(ts);
        }
    }
    Ok(seen)
}

fn create_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}
