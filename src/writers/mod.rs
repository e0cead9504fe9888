pub mod parquet_writer;

pub use parquet_writer::{station_schema, trip_schema, ParquetFileInfo, ParquetWriter};
