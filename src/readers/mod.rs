pub mod neighborhood_reader;
pub mod trip_reader;

pub use neighborhood_reader::{LoadReport, NeighborhoodReader, SkipReason};
pub use trip_reader::{check_required_columns, RawTripRows, TripReader};
