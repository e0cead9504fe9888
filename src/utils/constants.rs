/// Label assigned to points that fall inside no neighborhood polygon
pub const NO_NEIGHBORHOOD: &str = "No Neighborhood";

/// GeoJSON feature property holding the neighborhood name
pub const NEIGHBORHOOD_PROPERTY: &str = "pri_neigh";

/// Categorical trip columns (dictionary encoded)
pub const CATEGORICAL_COLUMNS: [&str; 5] = [
    "gender",
    "usertype",
    "events",
    "from_station_name",
    "to_station_name",
];

/// Columns narrowed to u8 (0..=255)
pub const U8_COLUMNS: [&str; 7] = [
    "day",
    "month",
    "week",
    "hour",
    "tripduration",
    "dpcapacity_start",
    "dpcapacity_end",
];

/// Columns narrowed to u16 (0..=65535)
pub const U16_COLUMNS: [&str; 2] = ["year", "from_station_id"];

/// Coordinate columns kept as f64
pub const F64_COLUMNS: [&str; 4] = [
    "latitude_start",
    "longitude_start",
    "latitude_end",
    "longitude_end",
];

/// Columns narrowed to i8 (-128..=127)
pub const I8_COLUMNS: [&str; 1] = ["temperature"];

/// Processing defaults
pub const DEFAULT_CHUNK_SIZE: usize = 1_000_000;
pub const DEFAULT_ROW_GROUP_SIZE: usize = 100_000;
pub const DEFAULT_PARTITION_PREFIX: &str = "df";

/// Parquet compression options
pub const COMPRESSION_SNAPPY: &str = "snappy";
pub const COMPRESSION_GZIP: &str = "gzip";
pub const COMPRESSION_LZ4: &str = "lz4";
pub const COMPRESSION_ZSTD: &str = "zstd";
pub const COMPRESSION_NONE: &str = "none";

/// Every column the raw trip CSV must provide
pub fn required_columns() -> impl Iterator<Item = &'static str> {
    CATEGORICAL_COLUMNS
        .into_iter()
        .chain(U8_COLUMNS)
        .chain(U16_COLUMNS)
        .chain(F64_COLUMNS)
        .chain(I8_COLUMNS)
}
