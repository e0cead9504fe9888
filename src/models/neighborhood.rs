use crate::utils::constants::NO_NEIGHBORHOOD;
use geo::{BoundingRect, Contains, LineString, Point, Polygon, Rect};
use std::collections::HashSet;

/// A named region bounded by a single exterior ring.
#[derive(Debug, Clone)]
pub struct NeighborhoodPolygon {
    name: String,
    polygon: Polygon<f64>,
    bounds: Option<Rect<f64>>,
}

impl NeighborhoodPolygon {
    /// Build from `(longitude, latitude)` vertices; the ring is closed if
    /// the last vertex does not repeat the first.
    pub fn new(name: String, exterior: Vec<(f64, f64)>) -> Self {
        let polygon = Polygon::new(LineString::from(exterior), vec![]);
        let bounds = polygon.bounding_rect();
        Self {
            name,
            polygon,
            bounds,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vertex_count(&self) -> usize {
        self.polygon.exterior().0.len()
    }

    /// Strict containment: points on an edge or vertex are outside.
    pub fn contains(&self, longitude: f64, latitude: f64) -> bool {
        if !longitude.is_finite() || !latitude.is_finite() {
            return false;
        }

        let Some(bounds) = self.bounds else {
            return false;
        };
        if longitude < bounds.min().x
            || longitude > bounds.max().x
            || latitude < bounds.min().y
            || latitude > bounds.max().y
        {
            return false;
        }

        self.polygon.contains(&Point::new(longitude, latitude))
    }
}

/// Ordered collection of uniquely named neighborhood polygons.
///
/// Lookups walk the polygons in table order, so where polygons overlap
/// the earlier one wins.
#[derive(Debug, Clone, Default)]
pub struct NeighborhoodTable {
    polygons: Vec<NeighborhoodPolygon>,
}

impl NeighborhoodTable {
    /// Only the first polygon for each name is kept; later polygons
    /// sharing a name are never tested.
    pub fn new(polygons: Vec<NeighborhoodPolygon>) -> Self {
        let mut seen = HashSet::with_capacity(polygons.len());
        let polygons = polygons
            .into_iter()
            .filter(|p| seen.insert(p.name.clone()))
            .collect();
        Self { polygons }
    }

    pub fn find_containing(&self, longitude: f64, latitude: f64) -> Option<&NeighborhoodPolygon> {
        self.polygons
            .iter()
            .find(|p| p.contains(longitude, latitude))
    }

    /// Name of the first neighborhood containing the point, or
    /// [`NO_NEIGHBORHOOD`].
    pub fn resolve(&self, longitude: f64, latitude: f64) -> &str {
        self.find_containing(longitude, latitude)
            .map_or(NO_NEIGHBORHOOD, NeighborhoodPolygon::name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &NeighborhoodPolygon> {
        self.polygons.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.polygons.iter().map(NeighborhoodPolygon::name)
    }

    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(name: &str, min_x: f64, min_y: f64, size: f64) -> NeighborhoodPolygon {
        NeighborhoodPolygon::new(
            name.to_string(),
            vec![
                (min_x, min_y),
                (min_x + size, min_y),
                (min_x + size, min_y + size),
                (min_x, min_y + size),
                (min_x, min_y),
            ],
        )
    }

    fn chicago() -> NeighborhoodTable {
        NeighborhoodTable::new(vec![
            square("Loop", -87.64, 41.87, 0.02),
            square("Near North Side", -87.64, 41.89, 0.02),
        ])
    }

    #[test]
    fn test_resolve_point_inside() {
        let table = chicago();
        assert_eq!(table.resolve(-87.63, 41.88), "Loop");
        assert_eq!(table.resolve(-87.63, 41.90), "Near North Side");
    }

    #[test]
    fn test_resolve_far_outside_is_sentinel() {
        let table = chicago();
        assert_eq!(table.resolve(0.0, 0.0), NO_NEIGHBORHOOD);
        assert!(table.find_containing(0.0, 0.0).is_none());
    }

    #[test]
    fn test_boundary_point_is_outside() {
        let table = NeighborhoodTable::new(vec![square("Loop", 0.0, 0.0, 1.0)]);
        assert_eq!(table.resolve(0.0, 0.5), NO_NEIGHBORHOOD);
        assert_eq!(table.resolve(1.0, 1.0), NO_NEIGHBORHOOD);
        assert_eq!(table.resolve(0.5, 0.5), "Loop");
    }

    #[test]
    fn test_overlap_first_in_table_order_wins() {
        let table = NeighborhoodTable::new(vec![
            square("First", 0.0, 0.0, 2.0),
            square("Second", 1.0, 1.0, 2.0),
        ]);
        assert_eq!(table.resolve(1.5, 1.5), "First");

        let reversed = NeighborhoodTable::new(vec![
            square("Second", 1.0, 1.0, 2.0),
            square("First", 0.0, 0.0, 2.0),
        ]);
        assert_eq!(reversed.resolve(1.5, 1.5), "Second");
    }

    #[test]
    fn test_duplicate_name_only_first_polygon_tested() {
        let table = NeighborhoodTable::new(vec![
            square("Loop", 0.0, 0.0, 1.0),
            square("Loop", 5.0, 5.0, 1.0),
            square("Pilsen", 10.0, 10.0, 1.0),
        ]);

        assert_eq!(table.len(), 2);
        assert_eq!(table.names().collect::<Vec<_>>(), ["Loop", "Pilsen"]);
        assert_eq!(table.resolve(0.5, 0.5), "Loop");
        assert_eq!(table.resolve(5.5, 5.5), NO_NEIGHBORHOOD);
        assert_eq!(table.resolve(10.5, 10.5), "Pilsen");
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let table = chicago();
        let first = table.resolve(-87.635, 41.885).to_string();
        for _ in 0..10 {
            assert_eq!(table.resolve(-87.635, 41.885), first);
        }
    }

    #[test]
    fn test_non_finite_coordinates_never_match() {
        let table = chicago();
        assert_eq!(table.resolve(f64::NAN, 41.88), NO_NEIGHBORHOOD);
        assert_eq!(table.resolve(-87.63, f64::INFINITY), NO_NEIGHBORHOOD);
        assert_eq!(table.resolve(1_000.0, -1_000.0), NO_NEIGHBORHOOD);
    }

    #[test]
    fn test_unclosed_ring_is_closed() {
        let open = NeighborhoodPolygon::new(
            "Triangle".to_string(),
            vec![(0.0, 0.0), (4.0, 0.0), (0.0, 4.0)],
        );
        assert_eq!(open.vertex_count(), 4);
        assert!(open.contains(1.0, 1.0));
        assert!(!open.contains(3.0, 3.0));
    }
}
