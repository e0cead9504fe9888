use crate::utils::constants::NO_NEIGHBORHOOD;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Station {
    #[validate(length(min = 1))]
    pub name: String,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,

    pub neighborhood: String,
}

impl Station {
    pub fn new(name: String, latitude: f64, longitude: f64, neighborhood: String) -> Self {
        Self {
            name,
            latitude,
            longitude,
            neighborhood,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.neighborhood != NO_NEIGHBORHOOD
    }
}

/// Stations in first-seen order with a by-name index.
#[derive(Debug, Clone, Default)]
pub struct StationTable {
    stations: Vec<Station>,
    index: HashMap<String, usize>,
}

impl StationTable {
    /// Build a table; on duplicate names the first station wins.
    pub fn new(stations: Vec<Station>) -> Self {
        let mut index = HashMap::with_capacity(stations.len());
        let mut unique = Vec::with_capacity(stations.len());

        for station in stations {
            if !index.contains_key(&station.name) {
                index.insert(station.name.clone(), unique.len());
                unique.push(station);
            }
        }

        Self {
            stations: unique,
            index,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Station> {
        self.index.get(name).map(|&i| &self.stations[i])
    }

    pub fn neighborhood_of(&self, name: &str) -> Option<&str> {
        self.get(name).map(|s| s.neighborhood.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Station> {
        self.stations.iter()
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn resolved_count(&self) -> usize {
        self.stations.iter().filter(|s| s.is_resolved()).count()
    }
}

impl From<Vec<Station>> for StationTable {
    fn from(stations: Vec<Station>) -> Self {
        Self::new(stations)
    }
}

impl PartialEq for StationTable {
    fn eq(&self, other: &Self) -> bool {
        self.stations == other.stations
    }
}
