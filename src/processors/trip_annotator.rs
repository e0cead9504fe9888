use crate::error::Result;
use crate::models::{CategoricalColumn, StationTable, TripAnnotations, TripTable};
use crate::utils::constants::NO_NEIGHBORHOOD;
use tracing::{info, warn};

/// Attaches from/to neighborhood labels and the same-station and
/// same-neighborhood flags to every trip.
pub struct TripAnnotator;

impl TripAnnotator {
    pub fn new() -> Self {
        Self
    }

    /// Trips whose station is missing or unknown to `stations` are labelled
    /// [`NO_NEIGHBORHOOD`]. Neighborhood equality is plain label equality.
    pub fn annotate(&self, mut trips: TripTable, stations: &StationTable) -> Result<TripTable> {
        let from_labels = labels_by_code(&trips.from_station_name, stations);
        let to_labels = labels_by_code(&trips.to_station_name, stations);

        let rows = trips.len();
        let mut annotations = TripAnnotations::with_capacity(rows);
        let mut unmatched = 0usize;

        for row in 0..rows {
            let from_code = trips.from_station_name.codes()[row];
            let to_code = trips.to_station_name.codes()[row];

            let from_label = label_for(from_code, &from_labels);
            let to_label = label_for(to_code, &to_labels);
            unmatched += usize::from(from_label.is_none()) + usize::from(to_label.is_none());

            let from_neighborhood = from_label.unwrap_or(NO_NEIGHBORHOOD);
            let to_neighborhood = to_label.unwrap_or(NO_NEIGHBORHOOD);

            let from_name = trips.from_station_name.get(row);
            let same_station = from_name.is_some() && from_name == trips.to_station_name.get(row);

            annotations
                .from_neighborhood
                .push(Some(from_neighborhood), "from_neighborhood", row)?;
            annotations
                .to_neighborhood
                .push(Some(to_neighborhood), "to_neighborhood", row)?;
            annotations.same_station_trip.push(same_station);
            annotations
                .same_neighborhood_trip
                .push(from_neighborhood == to_neighborhood);
        }

        if unmatched > 0 {
            warn!(
                trip_ends = unmatched,
                "trip ends without a matching station, labelled '{}'", NO_NEIGHBORHOOD
            );
        }

        info!(
            trips = rows,
            same_station = annotations.same_station_trip.iter().filter(|&&s| s).count(),
            same_neighborhood = annotations.same_neighborhood_trip.iter().filter(|&&s| s).count(),
            "annotated trips"
        );

        trips.annotations = Some(annotations);
        Ok(trips)
    }
}

impl Default for TripAnnotator {
    fn default() -> Self {
        Self::new()
    }
}

/// Neighborhood label for each dictionary entry of a station-name column
fn labels_by_code<'a>(
    column: &CategoricalColumn,
    stations: &'a StationTable,
) -> Vec<Option<&'a str>> {
    column
        .categories()
        .iter()
        .map(|name| stations.neighborhood_of(name))
        .collect()
}

fn label_for<'a>(code: Option<u16>, labels: &[Option<&'a str>]) -> Option<&'a str> {
    code.and_then(|c| labels.get(usize::from(c)).copied().flatten())
}
