pub mod categorical;
pub mod config;
pub mod neighborhood;
pub mod raw;
pub mod station;
pub mod trip;

pub use categorical::CategoricalColumn;
pub use config::PipelineConfig;
pub use neighborhood::{NeighborhoodPolygon, NeighborhoodTable};
pub use raw::{RawTrip, RawTripTable};
pub use station::{Station, StationTable};
pub use trip::{TripAnnotations, TripTable};
