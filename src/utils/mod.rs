pub mod constants;
pub mod filename;
pub mod logging;
pub mod progress;

pub use constants::*;
pub use filename::{
    generate_default_parquet_filename, generate_default_stations_filename, partition_filename,
};
pub use logging::init_logging;
pub use progress::ProgressReporter;
