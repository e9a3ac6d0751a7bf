//! CSV boundary: saved series re-read, exports appended without duplicates.

mod common;

use std::fs;
use std::path::PathBuf;

use grid_battery_sim::io::export::{append_csv, export_csv, export_records};
use grid_battery_sim::io::import::read_records;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir()
        .join(format!("grid-battery-sim-it-{}-{name}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    dir
}

#[test]
fn saved_series_reproduces_the_run() {
    let dir = scratch_dir("series");
    let path = dir.join("series.csv");
    let series = common::synthetic_series(7);

    export_records(&series, &path).unwrap();
    let reloaded = read_records(&path).unwrap();
    assert_eq!(reloaded, series);

    let direct = common::preset_runner("default").run(series).unwrap();
    let replayed = common::preset_runner("default").run(reloaded).unwrap();
    assert_eq!(direct, replayed);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn split_runs_append_into_one_export() {
    let dir = scratch_dir("append");
    let path = dir.join("nested").join("rows.csv");
    let rows = common::preset_runner("default")
        .run(common::synthetic_series(2))
        .unwrap();

    // First half, then an overlapping second half.
    assert_eq!(append_csv(&rows[..30], &path).unwrap(), 30);
    assert_eq!(append_csv(&rows[20..], &path).unwrap(), rows.len() - 30);

    let mut full = PathBuf::from(&dir);
    full.push("full.csv");
    export_csv(&rows, &full).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), fs::read_to_string(&full).unwrap());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn unsorted_input_with_duplicates_is_normalised() {
    let dir = scratch_dir("unsorted");
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("input.csv");
    fs::write(
        &path,
        "datetime,consumption,reversed\n\
         2025-01-01 02:00:00,10,0\n\
         2025-01-01T00:00:00,20,0\n\
         2025-01-01 01:00,30,5\n\
         2025-01-01 02:00:00,99,0\n",
    )
    .unwrap();

    let records = read_records(&path).unwrap();
    let hours: Vec<i64> = records
        .iter()
        .map(|r| (r.timestamp - common::ts(0)).num_hours())
        .collect();
    assert_eq!(hours, vec![0, 1, 2]);
    assert_eq!(records[2].consumption, 10.0);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn missing_input_is_an_io_error() {
    let err = read_records(&scratch_dir("missing").join("nope.csv")).unwrap_err();
    assert!(matches!(err, grid_battery_sim::error::SimError::Io(_)));
}
