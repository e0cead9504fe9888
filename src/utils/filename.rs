use chrono::{Datelike, Local};
use std::ops::Range;
use std::path::{Path, PathBuf};

/// Generate default trip snapshot filename with format: divvy-trips-{YYMMDD}.parquet
pub fn generate_default_parquet_filename() -> PathBuf {
    dated_output_filename("divvy-trips")
}

/// Generate default station table filename with format: divvy-stations-{YYMMDD}.parquet
pub fn generate_default_stations_filename() -> PathBuf {
    dated_output_filename("divvy-stations")
}

fn dated_output_filename(stem: &str) -> PathBuf {
    let now = Local::now();
    let year = now.year() % 100; // Get last 2 digits of year
    let month = now.month();
    let day = now.day();

    let filename = format!("{}-{:02}{:02}{:02}.parquet", stem, year, month, day);
    PathBuf::from("output").join(filename)
}

/// Partition file named by its half-open row range, e.g. `df_0_1000000.parquet`
pub fn partition_filename(dir: &Path, prefix: &str, range: &Range<usize>) -> PathBuf {
    dir.join(format!("{}_{}_{}.parquet", prefix, range.start, range.end))
}
