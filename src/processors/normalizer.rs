use crate::error::{ProcessingError, Result};
use crate::models::{RawTrip, RawTripTable, TripTable};
use crate::readers::trip_reader::check_required_columns;
use crate::readers::TripReader;
use crate::utils::progress::ProgressReporter;
use std::path::Path;
use tracing::{debug, info};

/// Fixed-width integer target of a downcast
pub trait Narrow: Sized {
    const NAME: &'static str;
    const MIN: f64;
    const MAX: f64;

    fn from_truncated(value: f64) -> Self;
}

impl Narrow for u8 {
    const NAME: &'static str = "u8";
    const MIN: f64 = u8::MIN as f64;
    const MAX: f64 = u8::MAX as f64;

    fn from_truncated(value: f64) -> Self {
        value as u8
    }
}

impl Narrow for u16 {
    const NAME: &'static str = "u16";
    const MIN: f64 = u16::MIN as f64;
    const MAX: f64 = u16::MAX as f64;

    fn from_truncated(value: f64) -> Self {
        value as u16
    }
}

impl Narrow for i8 {
    const NAME: &'static str = "i8";
    const MIN: f64 = i8::MIN as f64;
    const MAX: f64 = i8::MAX as f64;

    fn from_truncated(value: f64) -> Self {
        value as i8
    }
}

/// Downcast one value, rejecting anything that would not fit.
///
/// Fractions are truncated toward zero after the range check, so 12.9
/// becomes 12 but 255.5 into `u8` is accepted as 255 and -0.5 is
/// rejected for unsigned targets.
pub fn narrow<T: Narrow>(value: Option<f64>, column: &str, row: usize) -> Result<T> {
    let value = value
        .filter(|v| !v.is_nan())
        .ok_or_else(|| ProcessingError::MissingValue {
            column: column.to_string(),
            row,
        })?;

    let truncated = value.trunc();
    if value < T::MIN || truncated > T::MAX {
        return Err(ProcessingError::RangeViolation {
            column: column.to_string(),
            row,
            value: value.to_string(),
            target: T::NAME,
        });
    }

    Ok(T::from_truncated(truncated))
}

/// Coordinates are kept at full precision but must be present and finite
pub fn coordinate(value: Option<f64>, column: &str, row: usize) -> Result<f64> {
    match value {
        Some(v) if v.is_finite() => Ok(v),
        Some(v) => Err(ProcessingError::RangeViolation {
            column: column.to_string(),
            row,
            value: v.to_string(),
            target: "finite f64",
        }),
        None => Err(ProcessingError::MissingValue {
            column: column.to_string(),
            row,
        }),
    }
}

/// Converts raw trip rows into the narrowed [`TripTable`].
///
/// Any out-of-range or missing value aborts the whole pass; nothing is
/// returned for the rows before it.
pub struct Normalizer {
    silent: bool,
}

impl Normalizer {
    pub fn new() -> Self {
        Self { silent: true }
    }

    pub fn with_progress(show_progress: bool) -> Self {
        Self {
            silent: !show_progress,
        }
    }

    pub fn normalize(&self, raw: &RawTripTable) -> Result<TripTable> {
        check_required_columns(&raw.headers)?;

        let mut table = TripTable::with_capacity(raw.len());
        for (row, trip) in raw.rows.iter().enumerate() {
            push_trip(&mut table, trip, row)?;
        }

        log_footprint(&table);
        Ok(table)
    }

    /// Stream rows into a table without holding the raw rows in memory
    pub fn normalize_rows<I>(&self, rows: I) -> Result<TripTable>
    where
        I: IntoIterator<Item = Result<RawTrip>>,
    {
        let progress = ProgressReporter::new_spinner("Normalizing trips...", self.silent);
        let mut table = TripTable::default();

        for (row, trip) in rows.into_iter().enumerate() {
            push_trip(&mut table, &trip?, row)?;
            if row % 100_000 == 0 && row > 0 {
                progress.set_message(&format!("Normalized {} trips...", row));
            }
        }

        progress.finish_with_message(&format!("Normalized {} trips", table.len()));
        log_footprint(&table);
        Ok(table)
    }

    /// Read and normalize a trip CSV; the header is validated first
    pub fn normalize_csv(&self, path: &Path) -> Result<TripTable> {
        info!(path = %path.display(), "normalizing trip csv");
        let rows = TripReader::new().open(path)?;
        self.normalize_rows(rows)
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

fn push_trip(table: &mut TripTable, trip: &RawTrip, row: usize) -> Result<()> {
    table.gender.push(trip.gender.as_deref(), "gender", row)?;
    table
        .usertype
        .push(trip.usertype.as_deref(), "usertype", row)?;
    table.events.push(trip.events.as_deref(), "events", row)?;
    table
        .from_station_name
        .push(trip.from_station_name.as_deref(), "from_station_name", row)?;
    table
        .to_station_name
        .push(trip.to_station_name.as_deref(), "to_station_name", row)?;

    table.day.push(narrow(trip.day, "day", row)?);
    table.month.push(narrow(trip.month, "month", row)?);
    table.week.push(narrow(trip.week, "week", row)?);
    table.hour.push(narrow(trip.hour, "hour", row)?);
    table
        .tripduration
        .push(narrow(trip.tripduration, "tripduration", row)?);
    table
        .dpcapacity_start
        .push(narrow(trip.dpcapacity_start, "dpcapacity_start", row)?);
    table
        .dpcapacity_end
        .push(narrow(trip.dpcapacity_end, "dpcapacity_end", row)?);

    table.year.push(narrow(trip.year, "year", row)?);
    table
        .from_station_id
        .push(narrow(trip.from_station_id, "from_station_id", row)?);

    table
        .latitude_start
        .push(coordinate(trip.latitude_start, "latitude_start", row)?);
    table
        .longitude_start
        .push(coordinate(trip.longitude_start, "longitude_start", row)?);
    table
        .latitude_end
        .push(coordinate(trip.latitude_end, "latitude_end", row)?);
    table
        .longitude_end
        .push(coordinate(trip.longitude_end, "longitude_end", row)?);

    table
        .temperature
        .push(narrow(trip.temperature, "temperature", row)?);

    Ok(())
}

fn log_footprint(table: &TripTable) {
    info!(rows = table.len(), "normalized trip table");
    debug!(
        bytes = table.estimated_bytes(),
        stations = table.from_station_name.categories().len(),
        "narrowed column footprint"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn raw_trip(from: &str, to: &str) -> RawTrip {
        RawTrip {
            gender: Some("Female".to_string()),
            usertype: Some("Subscriber".to_string()),
            events: Some("cloudy".to_string()),
            from_station_name: Some(from.to_string()),
            to_station_name: Some(to.to_string()),
            day: Some(3.0),
            month: Some(7.0),
            week: Some(27.0),
            hour: Some(17.0),
            tripduration: Some(11.6),
            dpcapacity_start: Some(23.0),
            dpcapacity_end: Some(15.0),
            year: Some(2016.0),
            from_station_id: Some(174.0),
            latitude_start: Some(41.882242),
            longitude_start: Some(-87.641066),
            latitude_end: Some(41.884114),
            longitude_end: Some(-87.625633),
            temperature: Some(81.0),
        }
    }

    #[test]
    fn test_narrow_in_range() {
        assert_eq!(narrow::<u8>(Some(255.0), "day", 0).unwrap(), 255);
        assert_eq!(narrow::<u8>(Some(11.6), "tripduration", 0).unwrap(), 11);
        assert_eq!(narrow::<u16>(Some(2017.0), "year", 0).unwrap(), 2017);
        assert_eq!(narrow::<i8>(Some(-12.0), "temperature", 0).unwrap(), -12);
        assert_eq!(narrow::<i8>(Some(-128.0), "temperature", 0).unwrap(), -128);
    }

    #[test]
    fn test_narrow_300_into_u8_is_violation_not_44() {
        let err = narrow::<u8>(Some(300.0), "dpcapacity_start", 7).unwrap_err();
        match err {
            ProcessingError::RangeViolation {
                column,
                row,
                value,
                target,
            } => {
                assert_eq!(column, "dpcapacity_start");
                assert_eq!(row, 7);
                assert_eq!(value, "300");
                assert_eq!(target, "u8");
            }
            other => panic!("expected range violation, got {other:?}"),
        }
    }

    #[test]
    fn test_narrow_rejects_negative_and_overflow() {
        assert!(narrow::<u8>(Some(-1.0), "hour", 0).is_err());
        assert!(narrow::<u8>(Some(-0.5), "hour", 0).is_err());
        assert!(narrow::<u16>(Some(65_536.0), "from_station_id", 0).is_err());
        assert!(narrow::<i8>(Some(128.0), "temperature", 0).is_err());
        assert!(narrow::<i8>(Some(-129.0), "temperature", 0).is_err());
        assert!(narrow::<u8>(Some(f64::INFINITY), "day", 0).is_err());
    }

    #[test]
    fn test_narrow_missing_value() {
        assert!(matches!(
            narrow::<u8>(None, "week", 3),
            Err(ProcessingError::MissingValue { row: 3, .. })
        ));
        assert!(matches!(
            narrow::<u8>(Some(f64::NAN), "week", 4),
            Err(ProcessingError::MissingValue { row: 4, .. })
        ));
    }

    #[test]
    fn test_coordinate_must_be_finite() {
        assert_eq!(coordinate(Some(41.88), "latitude_start", 0).unwrap(), 41.88);
        assert!(coordinate(Some(f64::NAN), "latitude_start", 0).is_err());
        assert!(coordinate(None, "latitude_start", 0).is_err());
    }

    #[test]
    fn test_normalize_table() -> Result<()> {
        let mut second = raw_trip("Clinton St & Madison St", "Clinton St & Madison St");
        second.gender = None;
        let raw = RawTripTable::with_required_headers(vec![
            raw_trip("Clinton St & Madison St", "Millennium Park"),
            second,
        ]);

        let table = Normalizer::new().normalize(&raw)?;

        assert_eq!(table.len(), 2);
        assert_eq!(table.tripduration, vec![11, 11]);
        assert_eq!(table.year, vec![2016, 2016]);
        assert_eq!(table.temperature, vec![81, 81]);
        assert_eq!(table.gender.get(1), None);
        assert_eq!(table.from_station_name.categories().len(), 1);
        assert_eq!(table.to_station_name.categories().len(), 2);
        assert!(!table.is_annotated());
        Ok(())
    }

    #[test]
    fn test_normalize_aborts_on_first_violation() {
        let mut bad = raw_trip("A", "B");
        bad.temperature = Some(140.0);
        let raw = RawTripTable::with_required_headers(vec![raw_trip("A", "B"), bad]);

        let err = Normalizer::new().normalize(&raw).unwrap_err();
        assert!(matches!(
            err,
            ProcessingError::RangeViolation { row: 1, target: "i8", .. }
        ));
    }

    #[test]
    fn test_normalize_schema_checked_first() {
        let raw = RawTripTable::new(
            vec!["gender".to_string()],
            vec![raw_trip("A", "B")],
        );
        assert!(matches!(
            Normalizer::new().normalize(&raw),
            Err(ProcessingError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn test_normalize_rows_matches_normalize() -> Result<()> {
        let rows = vec![raw_trip("A", "B"), raw_trip("B", "A"), raw_trip("A", "A")];
        let raw = RawTripTable::with_required_headers(rows.clone());

        let batch = Normalizer::new().normalize(&raw)?;
        let streamed = Normalizer::new().normalize_rows(rows.into_iter().map(Ok))?;

        assert_eq!(batch, streamed);
        Ok(())
    }
}
