use crate::error::{ProcessingError, Result};
use crate::models::{NeighborhoodPolygon, NeighborhoodTable};
use crate::utils::constants::NEIGHBORHOOD_PROPERTY;
use geojson::{Feature, GeoJson, Value};
use std::path::Path;
use tracing::{debug, info};

/// Why a feature did not become a neighborhood polygon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingName,
    MissingGeometry,
    UnsupportedGeometry,
    DegenerateRing,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub features: usize,
    pub loaded: usize,
    pub missing_name: usize,
    pub missing_geometry: usize,
    pub unsupported_geometry: usize,
    pub degenerate_ring: usize,
    pub duplicate_name: usize,
}

impl LoadReport {
    pub fn skipped(&self) -> usize {
        self.features - self.loaded
    }

    fn record_skip(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::MissingName => self.missing_name += 1,
            SkipReason::MissingGeometry => self.missing_geometry += 1,
            SkipReason::UnsupportedGeometry => self.unsupported_geometry += 1,
            SkipReason::DegenerateRing => self.degenerate_ring += 1,
        }
    }
}

/// Loads neighborhood polygons from a GeoJSON `FeatureCollection`.
///
/// Only the first ring of the first polygon part is kept; holes and
/// additional parts are dropped.
pub struct NeighborhoodReader {
    name_property: String,
}

impl NeighborhoodReader {
    pub fn new() -> Self {
        Self {
            name_property: NEIGHBORHOOD_PROPERTY.to_string(),
        }
    }

    pub fn with_name_property(name_property: &str) -> Self {
        Self {
            name_property: name_property.to_string(),
        }
    }

    pub fn read_path(&self, path: &Path) -> Result<NeighborhoodTable> {
        let (table, _) = self.read_path_with_report(path)?;
        Ok(table)
    }

    pub fn read_path_with_report(&self, path: &Path) -> Result<(NeighborhoodTable, LoadReport)> {
        let text = std::fs::read_to_string(path)?;
        let (table, report) = self.parse_str_with_report(&text)?;
        info!(
            path = %path.display(),
            loaded = report.loaded,
            skipped = report.skipped(),
            "loaded neighborhood polygons"
        );
        Ok((table, report))
    }

    pub fn parse_str(&self, text: &str) -> Result<NeighborhoodTable> {
        let (table, _) = self.parse_str_with_report(text)?;
        Ok(table)
    }

    pub fn parse_str_with_report(&self, text: &str) -> Result<(NeighborhoodTable, LoadReport)> {
        let collection = match text.parse::<GeoJson>()? {
            GeoJson::FeatureCollection(collection) => collection,
            _ => {
                return Err(ProcessingError::InvalidFormat(
                    "Expected a GeoJSON FeatureCollection".to_string(),
                ))
            }
        };

        let mut report = LoadReport {
            features: collection.features.len(),
            ..LoadReport::default()
        };
        let mut polygons = Vec::with_capacity(collection.features.len());

        for (i, feature) in collection.features.into_iter().enumerate() {
            match self.feature_to_polygon(feature) {
                Ok(polygon) => polygons.push(polygon),
                Err(reason) => {
                    debug!(feature = i, ?reason, "skipping neighborhood feature");
                    report.record_skip(reason);
                }
            }
        }

        let parsed = polygons.len();
        let table = NeighborhoodTable::new(polygons);
        report.duplicate_name = parsed - table.len();
        if report.duplicate_name > 0 {
            debug!(
                features = report.duplicate_name,
                "dropping features whose name was already loaded"
            );
        }

        report.loaded = table.len();
        Ok((table, report))
    }

    fn feature_to_polygon(
        &self,
        feature: Feature,
    ) -> std::result::Result<NeighborhoodPolygon, SkipReason> {
        let name = feature
            .properties
            .as_ref()
            .and_then(|props| props.get(&self.name_property))
            .and_then(serde_json::Value::as_str)
            .ok_or(SkipReason::MissingName)?
            .to_string();

        let geometry = feature.geometry.ok_or(SkipReason::MissingGeometry)?;

        let ring = match geometry.value {
            Value::Polygon(rings) => rings.into_iter().next(),
            Value::MultiPolygon(parts) => parts
                .into_iter()
                .next()
                .and_then(|rings| rings.into_iter().next()),
            _ => return Err(SkipReason::UnsupportedGeometry),
        }
        .ok_or(SkipReason::DegenerateRing)?;

        let vertices: Vec<(f64, f64)> = ring
            .iter()
            .filter_map(|position| match (position.first(), position.get(1)) {
                (Some(&x), Some(&y)) if x.is_finite() && y.is_finite() => Some((x, y)),
                _ => None,
            })
            .collect();

        if vertices.len() < 3 || vertices.len() < ring.len() {
            return Err(SkipReason::DegenerateRing);
        }

        Ok(NeighborhoodPolygon::new(name, vertices))
    }
}

impl Default for NeighborhoodReader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::constants::NO_NEIGHBORHOOD;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const COLLECTION: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"pri_neigh": "Loop", "sec_neigh": "LOOP"},
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [[
                        [[-87.64, 41.87], [-87.62, 41.87], [-87.62, 41.89], [-87.64, 41.89], [-87.64, 41.87]],
                        [[-87.635, 41.875], [-87.625, 41.875], [-87.625, 41.885], [-87.635, 41.875]]
                    ]]
                }
            },
            {
                "type": "Feature",
                "properties": {"zip": "60601"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[-88.0, 41.0], [-87.0, 41.0], [-87.0, 42.0], [-88.0, 41.0]]]
                }
            },
            {
                "type": "Feature",
                "properties": {"pri_neigh": "Near North Side"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[-87.64, 41.89], [-87.62, 41.89], [-87.62, 41.91], [-87.64, 41.91], [-87.64, 41.89]]]
                }
            },
            {
                "type": "Feature",
                "properties": {"pri_neigh": "Point Only"},
                "geometry": {"type": "Point", "coordinates": [-87.6, 41.9]}
            },
            {
                "type": "Feature",
                "properties": {"pri_neigh": "No Geometry"},
                "geometry": null
            }
        ]
    }"#;

    #[test]
    fn test_parse_skips_features_without_name() -> Result<()> {
        let (table, report) = NeighborhoodReader::new().parse_str_with_report(COLLECTION)?;

        assert_eq!(table.len(), 2);
        assert_eq!(table.names().collect::<Vec<_>>(), ["Loop", "Near North Side"]);
        assert_eq!(report.features, 5);
        assert_eq!(report.loaded, 2);
        assert_eq!(report.missing_name, 1);
        assert_eq!(report.unsupported_geometry, 1);
        assert_eq!(report.missing_geometry, 1);
        Ok(())
    }

    #[test]
    fn test_first_ring_only_holes_ignored() -> Result<()> {
        let table = NeighborhoodReader::new().parse_str(COLLECTION)?;

        // Inside the hole of the Loop polygon, still the Loop since holes are dropped
        assert_eq!(table.resolve(-87.627, 41.878), "Loop");
        assert_eq!(table.resolve(-87.63, 41.90), "Near North Side");
        assert_eq!(table.resolve(0.0, 0.0), NO_NEIGHBORHOOD);
        Ok(())
    }

    #[test]
    fn test_duplicate_names_keep_first_feature() -> Result<()> {
        let collection = r#"{
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": {"pri_neigh": "Loop"},
                    "geometry": {"type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]]}
                },
                {
                    "type": "Feature",
                    "properties": {"pri_neigh": "Loop"},
                    "geometry": {"type": "Polygon", "coordinates": [[[5.0, 5.0], [6.0, 5.0], [6.0, 6.0], [5.0, 6.0], [5.0, 5.0]]]}
                },
                {
                    "type": "Feature",
                    "properties": {"pri_neigh": " Loop "},
                    "geometry": {"type": "Polygon", "coordinates": [[[9.0, 9.0], [10.0, 9.0], [10.0, 10.0], [9.0, 10.0], [9.0, 9.0]]]}
                }
            ]
        }"#;

        let (table, report) = NeighborhoodReader::new().parse_str_with_report(collection)?;

        assert_eq!(report.duplicate_name, 1);
        assert_eq!(report.loaded, 2);
        assert_eq!(report.skipped(), 1);
        assert_eq!(table.resolve(5.5, 5.5), NO_NEIGHBORHOOD);
        // Names are used verbatim, so the padded name is a distinct neighborhood
        assert_eq!(table.resolve(9.5, 9.5), " Loop ");
        Ok(())
    }

    #[test]
    fn test_custom_name_property() -> Result<()> {
        let table = NeighborhoodReader::with_name_property("zip").parse_str(COLLECTION)?;
        assert_eq!(table.names().collect::<Vec<_>>(), ["60601"]);
        Ok(())
    }

    #[test]
    fn test_non_collection_rejected() {
        let point = r#"{"type": "Point", "coordinates": [0.0, 0.0]}"#;
        assert!(NeighborhoodReader::new().parse_str(point).is_err());
        assert!(NeighborhoodReader::new().parse_str("not json").is_err());
    }

    #[test]
    fn test_read_path() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        write!(temp_file, "{}", COLLECTION)?;

        let table = NeighborhoodReader::new().read_path(temp_file.path())?;
        assert_eq!(table.len(), 2);
        Ok(())
    }
}
