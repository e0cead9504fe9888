use crate::error::{ProcessingError, Result};
use crate::models::TripTable;
use crate::utils::constants::NO_NEIGHBORHOOD;
use crate::writers::ParquetWriter;
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct TripStatistics {
    pub total_trips: usize,
    pub unique_stations: usize,
    pub year_range: (u16, u16),
    pub temperature_range: (i8, i8),
    pub geographic_bounds: GeographicBounds,
    pub neighborhoods: Option<NeighborhoodSummary>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeographicBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

/// Only present for annotated snapshots
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborhoodSummary {
    pub distinct_neighborhoods: usize,
    pub same_station_trips: usize,
    pub same_neighborhood_trips: usize,
    pub unresolved_trip_ends: usize,
}

pub struct TripAnalyzer;

impl TripAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze_parquet(&self, path: &Path) -> Result<TripStatistics> {
        self.analyze_parquet_with_limit(path, 0)
    }

    /// Analyze the first `limit` trips of a snapshot (0 = all trips)
    pub fn analyze_parquet_with_limit(&self, path: &Path, limit: usize) -> Result<TripStatistics> {
        let table = ParquetWriter::new().read_trip_table_with_limit(path, limit)?;
        self.analyze(&table)
    }

    pub fn analyze(&self, table: &TripTable) -> Result<TripStatistics> {
        if table.is_empty() {
            return Err(ProcessingError::Config("No trips to analyze".to_string()));
        }

        let stations: HashSet<&str> = table
            .from_station_name
            .iter()
            .chain(table.to_station_name.iter())
            .flatten()
            .collect();

        let year_range = min_max(&table.year);
        let temperature_range = min_max(&table.temperature);

        let latitudes = table.latitude_start.iter().chain(&table.latitude_end);
        let longitudes = table.longitude_start.iter().chain(&table.longitude_end);
        let geographic_bounds = GeographicBounds {
            min_lat: latitudes.clone().copied().fold(f64::INFINITY, f64::min),
            max_lat: latitudes.copied().fold(f64::NEG_INFINITY, f64::max),
            min_lon: longitudes.clone().copied().fold(f64::INFINITY, f64::min),
            max_lon: longitudes.copied().fold(f64::NEG_INFINITY, f64::max),
        };

        let neighborhoods = table.annotations.as_ref().map(|a| {
            let mut distinct: HashSet<&str> = HashSet::new();
            let mut unresolved = 0;
            for label in a.from_neighborhood.iter().chain(a.to_neighborhood.iter()) {
                match label {
                    Some(NO_NEIGHBORHOOD) | None => unresolved += 1,
                    Some(name) => {
                        distinct.insert(name);
                    }
                }
            }

            NeighborhoodSummary {
                distinct_neighborhoods: distinct.len(),
                same_station_trips: a.same_station_trip.iter().filter(|&&s| s).count(),
                same_neighborhood_trips: a.same_neighborhood_trip.iter().filter(|&&s| s).count(),
                unresolved_trip_ends: unresolved,
            }
        });

        Ok(TripStatistics {
            total_trips: table.len(),
            unique_stations: stations.len(),
            year_range,
            temperature_range,
            geographic_bounds,
            neighborhoods,
        })
    }
}

impl Default for TripAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn min_max<T: Copy + Ord + Default>(values: &[T]) -> (T, T) {
    let min = values.iter().copied().min().unwrap_or_default();
    let max = values.iter().copied().max().unwrap_or_default();
    (min, max)
}

impl TripStatistics {
    fn percentage(&self, count: usize) -> f64 {
        (count as f64 / self.total_trips as f64) * 100.0
    }

    pub fn summary(&self) -> String {
        format!(
            "Trips: {} total\n\
            Stations: {} stations\n\
            Years: {} to {}\n\
            Temperature Range: {}°F to {}°F\n\
            Coverage: {:.3}°N-{:.3}°N, {:.3}°W-{:.3}°W",
            self.total_trips,
            self.unique_stations,
            self.year_range.0,
            self.year_range.1,
            self.temperature_range.0,
            self.temperature_range.1,
            self.geographic_bounds.min_lat,
            self.geographic_bounds.max_lat,
            self.geographic_bounds.max_lon.abs(),
            self.geographic_bounds.min_lon.abs(),
        )
    }

    pub fn detailed_summary(&self) -> String {
        let Some(n) = &self.neighborhoods else {
            return format!("{}\n\nNeighborhoods: not annotated", self.summary());
        };

        format!(
            "{}\n\n\
            Neighborhoods:\n\
            - Distinct neighborhoods: {}\n\
            - Same-station trips: {} ({:.1}%)\n\
            - Same-neighborhood trips: {} ({:.1}%)\n\
            - Trip ends labelled '{}': {}",
            self.summary(),
            n.distinct_neighborhoods,
            n.same_station_trips,
            self.percentage(n.same_station_trips),
            n.same_neighborhood_trips,
            self.percentage(n.same_neighborhood_trips),
            NO_NEIGHBORHOOD,
            n.unresolved_trip_ends,
        )
    }
}
