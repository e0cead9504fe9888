pub mod normalizer;
pub mod partitioner;
pub mod station_deriver;
pub mod trip_annotator;

pub use normalizer::{coordinate, narrow, Narrow, Normalizer};
pub use partitioner::{partition, PartitionPlan, PartitionWriter};
pub use station_deriver::StationDeriver;
pub use trip_annotator::TripAnnotator;
