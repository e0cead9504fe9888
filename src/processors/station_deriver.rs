use crate::models::{NeighborhoodTable, Station, StationTable, TripTable};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// Builds the station table from the trips that reference each station.
///
/// A station's coordinate is the first one observed for its name, scanning
/// rows in order and, within a row, the start side before the end side.
/// Later trips reporting a different coordinate for the same name are not
/// reconciled.
pub struct StationDeriver;

impl StationDeriver {
    pub fn new() -> Self {
        Self
    }

    pub fn derive(&self, trips: &TripTable, neighborhoods: &NeighborhoodTable) -> StationTable {
        let mut first_seen: Vec<(&str, f64, f64)> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut moved: HashSet<&str> = HashSet::new();

        for row in 0..trips.len() {
            let sides = [
                (
                    trips.from_station_name.get(row),
                    trips.latitude_start[row],
                    trips.longitude_start[row],
                ),
                (
                    trips.to_station_name.get(row),
                    trips.latitude_end[row],
                    trips.longitude_end[row],
                ),
            ];

            for (name, latitude, longitude) in sides {
                let Some(name) = name else {
                    continue;
                };

                match index.get(name) {
                    Some(&i) => {
                        let (_, lat, lon) = first_seen[i];
                        if lat != latitude || lon != longitude {
                            moved.insert(name);
                        }
                    }
                    None => {
                        index.insert(name, first_seen.len());
                        first_seen.push((name, latitude, longitude));
                    }
                }
            }
        }

        if !moved.is_empty() {
            debug!(
                stations = moved.len(),
                "stations observed at more than one coordinate, keeping first"
            );
        }

        let stations: Vec<Station> = first_seen
            .into_iter()
            .map(|(name, latitude, longitude)| {
                let neighborhood = neighborhoods.resolve(longitude, latitude).to_string();
                Station::new(name.to_string(), latitude, longitude, neighborhood)
            })
            .collect();

        let table = StationTable::new(stations);
        info!(
            stations = table.len(),
            resolved = table.resolved_count(),
            "derived station table"
        );
        table
    }
}

impl Default for StationDeriver {
    fn default() -> Self {
        Self::new()
    }
}
