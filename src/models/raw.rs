use crate::utils::constants::required_columns;
use serde::{Deserialize, Serialize};

/// One row of the raw trip CSV, before any narrowing.
///
/// Numeric fields arrive as floats because the export writes integers
/// like `7.0`; empty cells deserialize to `None`. Columns not named here
/// are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTrip {
    pub gender: Option<String>,
    pub usertype: Option<String>,
    pub events: Option<String>,
    pub from_station_name: Option<String>,
    pub to_station_name: Option<String>,

    pub day: Option<f64>,
    pub month: Option<f64>,
    pub week: Option<f64>,
    pub hour: Option<f64>,
    pub tripduration: Option<f64>,
    pub dpcapacity_start: Option<f64>,
    pub dpcapacity_end: Option<f64>,

    pub year: Option<f64>,
    pub from_station_id: Option<f64>,

    pub latitude_start: Option<f64>,
    pub longitude_start: Option<f64>,
    pub latitude_end: Option<f64>,
    pub longitude_end: Option<f64>,

    pub temperature: Option<f64>,
}

/// Raw trip rows together with the header they were read under.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTripTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawTrip>,
}

impl RawTripTable {
    pub fn new(headers: Vec<String>, rows: Vec<RawTrip>) -> Self {
        Self { headers, rows }
    }

    /// Rows labelled with exactly the required column names
    pub fn with_required_headers(rows: Vec<RawTrip>) -> Self {
        let headers = required_columns().map(str::to_string).collect();
        Self { headers, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
