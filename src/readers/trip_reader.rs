use crate::error::{ProcessingError, Result};
use crate::models::{RawTrip, RawTripTable};
use crate::utils::constants::required_columns;
use csv::{DeserializeRecordsIntoIter, ReaderBuilder, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Fail if any required trip column is absent from `headers`.
pub fn check_required_columns<S: AsRef<str>>(headers: &[S]) -> Result<()> {
    let missing: Vec<String> = required_columns()
        .filter(|required| !headers.iter().any(|h| h.as_ref() == *required))
        .map(str::to_string)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ProcessingError::SchemaMismatch { missing })
    }
}

pub struct TripReader;

impl TripReader {
    pub fn new() -> Self {
        Self
    }

    /// Open a trip CSV for row-by-row reading.
    ///
    /// The header is checked before any row is yielded.
    pub fn open(&self, path: &Path) -> Result<RawTripRows<File>> {
        debug!(path = %path.display(), "opening trip csv");
        self.rows_from_reader(File::open(path)?)
    }

    pub fn rows_from_reader<R: Read>(&self, input: R) -> Result<RawTripRows<R>> {
        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .from_reader(input);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        check_required_columns(&headers)?;

        Ok(RawTripRows {
            headers,
            inner: reader.into_deserialize(),
        })
    }

    /// Read the whole file into memory as raw rows
    pub fn read_raw(&self, path: &Path) -> Result<RawTripTable> {
        Self::collect(self.open(path)?)
    }

    pub fn read_raw_from_reader<R: Read>(&self, input: R) -> Result<RawTripTable> {
        Self::collect(self.rows_from_reader(input)?)
    }

    fn collect<R: Read>(rows: RawTripRows<R>) -> Result<RawTripTable> {
        let headers = rows.headers().to_vec();
        let rows = rows.collect::<Result<Vec<_>>>()?;
        Ok(RawTripTable::new(headers, rows))
    }
}

impl Default for TripReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over deserialized rows of a trip CSV.
pub struct RawTripRows<R> {
    headers: Vec<String>,
    inner: DeserializeRecordsIntoIter<R, RawTrip>,
}

impl<R> RawTripRows<R> {
    pub fn headers(&self) -> &[String] {
        &self.headers
    }
}

impl<R: Read> Iterator for RawTripRows<R> {
    type Item = Result<RawTrip>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|row| row.map_err(ProcessingError::from))
    }
}
