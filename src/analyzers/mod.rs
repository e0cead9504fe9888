pub mod trip_analyzer;

pub use trip_analyzer::{GeographicBounds, NeighborhoodSummary, TripAnalyzer, TripStatistics};
