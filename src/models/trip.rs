use crate::models::CategoricalColumn;
use std::ops::Range;

/// Columnar, memory-narrowed trip dataset.
///
/// All columns hold the same number of rows. Small-range integers are
/// stored at their declared width, text columns are dictionary encoded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripTable {
    pub gender: CategoricalColumn,
    pub usertype: CategoricalColumn,
    pub events: CategoricalColumn,
    pub from_station_name: CategoricalColumn,
    pub to_station_name: CategoricalColumn,

    pub day: Vec<u8>,
    pub month: Vec<u8>,
    pub week: Vec<u8>,
    pub hour: Vec<u8>,
    pub tripduration: Vec<u8>,
    pub dpcapacity_start: Vec<u8>,
    pub dpcapacity_end: Vec<u8>,

    pub year: Vec<u16>,
    pub from_station_id: Vec<u16>,

    pub latitude_start: Vec<f64>,
    pub longitude_start: Vec<f64>,
    pub latitude_end: Vec<f64>,
    pub longitude_end: Vec<f64>,

    pub temperature: Vec<i8>,

    /// Present once the table has been joined against a station table
    pub annotations: Option<TripAnnotations>,
}

/// Per-trip neighborhood columns derived from the station table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripAnnotations {
    pub from_neighborhood: CategoricalColumn,
    pub to_neighborhood: CategoricalColumn,
    pub same_station_trip: Vec<bool>,
    pub same_neighborhood_trip: Vec<bool>,
}

impl TripAnnotations {
    pub fn with_capacity(rows: usize) -> Self {
        Self {
            from_neighborhood: CategoricalColumn::with_capacity(rows),
            to_neighborhood: CategoricalColumn::with_capacity(rows),
            same_station_trip: Vec::with_capacity(rows),
            same_neighborhood_trip: Vec::with_capacity(rows),
        }
    }

    pub fn len(&self) -> usize {
        self.same_station_trip.len()
    }

    pub fn is_empty(&self) -> bool {
        self.same_station_trip.is_empty()
    }

    fn slice(&self, range: Range<usize>) -> Self {
        Self {
            from_neighborhood: self.from_neighborhood.slice(range.clone()),
            to_neighborhood: self.to_neighborhood.slice(range.clone()),
            same_station_trip: self.same_station_trip[range.clone()].to_vec(),
            same_neighborhood_trip: self.same_neighborhood_trip[range].to_vec(),
        }
    }
}

impl TripTable {
    pub fn with_capacity(rows: usize) -> Self {
        Self {
            gender: CategoricalColumn::with_capacity(rows),
            usertype: CategoricalColumn::with_capacity(rows),
            events: CategoricalColumn::with_capacity(rows),
            from_station_name: CategoricalColumn::with_capacity(rows),
            to_station_name: CategoricalColumn::with_capacity(rows),
            day: Vec::with_capacity(rows),
            month: Vec::with_capacity(rows),
            week: Vec::with_capacity(rows),
            hour: Vec::with_capacity(rows),
            tripduration: Vec::with_capacity(rows),
            dpcapacity_start: Vec::with_capacity(rows),
            dpcapacity_end: Vec::with_capacity(rows),
            year: Vec::with_capacity(rows),
            from_station_id: Vec::with_capacity(rows),
            latitude_start: Vec::with_capacity(rows),
            longitude_start: Vec::with_capacity(rows),
            latitude_end: Vec::with_capacity(rows),
            longitude_end: Vec::with_capacity(rows),
            temperature: Vec::with_capacity(rows),
            annotations: None,
        }
    }

    pub fn len(&self) -> usize {
        self.day.len()
    }

    pub fn is_empty(&self) -> bool {
        self.day.is_empty()
    }

    pub fn is_annotated(&self) -> bool {
        self.annotations.is_some()
    }

    /// Owned copy of a contiguous row range.
    ///
    /// The range is clamped to the table, so an out-of-bounds request
    /// yields a shorter (possibly empty) table rather than panicking.
    pub fn slice(&self, range: Range<usize>) -> TripTable {
        let end = range.end.min(self.len());
        let start = range.start.min(end);
        let r = start..end;

        TripTable {
            gender: self.gender.slice(r.clone()),
            usertype: self.usertype.slice(r.clone()),
            events: self.events.slice(r.clone()),
            from_station_name: self.from_station_name.slice(r.clone()),
            to_station_name: self.to_station_name.slice(r.clone()),
            day: self.day[r.clone()].to_vec(),
            month: self.month[r.clone()].to_vec(),
            week: self.week[r.clone()].to_vec(),
            hour: self.hour[r.clone()].to_vec(),
            tripduration: self.tripduration[r.clone()].to_vec(),
            dpcapacity_start: self.dpcapacity_start[r.clone()].to_vec(),
            dpcapacity_end: self.dpcapacity_end[r.clone()].to_vec(),
            year: self.year[r.clone()].to_vec(),
            from_station_id: self.from_station_id[r.clone()].to_vec(),
            latitude_start: self.latitude_start[r.clone()].to_vec(),
            longitude_start: self.longitude_start[r.clone()].to_vec(),
            latitude_end: self.latitude_end[r.clone()].to_vec(),
            longitude_end: self.longitude_end[r.clone()].to_vec(),
            temperature: self.temperature[r.clone()].to_vec(),
            annotations: self.annotations.as_ref().map(|a| a.slice(r)),
        }
    }

    /// Approximate heap bytes held by the column data (dictionaries excluded)
    pub fn estimated_bytes(&self) -> usize {
        let rows = self.len();
        let categorical = 5 * rows * std::mem::size_of::<Option<u16>>();
        let narrow = 7 * rows + 2 * rows * 2 + rows;
        let coords = 4 * rows * 8;
        let annotations = self
            .annotations
            .as_ref()
            .map_or(0, |a| a.len() * (2 * std::mem::size_of::<Option<u16>>() + 2));
        categorical + narrow + coords + annotations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_with_days(days: &[u8]) -> TripTable {
        let mut table = TripTable::with_capacity(days.len());
        for (row, &d) in days.iter().enumerate() {
            table.gender.push(Some("Male"), "gender", row).unwrap();
            table.usertype.push(Some("Subscriber"), "usertype", row).unwrap();
            table.events.push(Some("clear"), "events", row).unwrap();
            table.from_station_name.push(Some("A"), "from_station_name", row).unwrap();
            table.to_station_name.push(Some("B"), "to_station_name", row).unwrap();
            table.day.push(d);
            table.month.push(6);
            table.week.push(25);
            table.hour.push(8);
            table.tripduration.push(12);
            table.dpcapacity_start.push(15);
            table.dpcapacity_end.push(19);
            table.year.push(2017);
            table.from_station_id.push(42);
            table.latitude_start.push(41.88);
            table.longitude_start.push(-87.63);
            table.latitude_end.push(41.89);
            table.longitude_end.push(-87.62);
            table.temperature.push(72);
        }
        table
    }

    #[test]
    fn test_slice_takes_row_range() {
        let table = table_with_days(&[0, 1, 2, 3, 4]);
        let slice = table.slice(1..4);

        assert_eq!(slice.len(), 3);
        assert_eq!(slice.day, vec![1, 2, 3]);
        assert_eq!(slice.gender.len(), 3);
        assert!(!slice.is_annotated());
    }

    #[test]
    fn test_slice_clamps_out_of_bounds() {
        let table = table_with_days(&[0, 1, 2]);
        assert_eq!(table.slice(2..10).len(), 1);
        assert!(table.slice(5..10).is_empty());
    }
}
