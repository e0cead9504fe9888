use crate::error::Result;
use crate::utils::constants::{
    COMPRESSION_SNAPPY, DEFAULT_CHUNK_SIZE, DEFAULT_PARTITION_PREFIX, DEFAULT_ROW_GROUP_SIZE,
    NEIGHBORHOOD_PROPERTY,
};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

/// Environment variable prefix, e.g. `DIVVY_CHUNK_SIZE=500000`
pub const ENV_PREFIX: &str = "DIVVY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PipelineConfig {
    #[validate(range(min = 1))]
    pub chunk_size: usize,

    #[validate(range(min = 1))]
    pub max_partitions: Option<usize>,

    #[validate(length(min = 1))]
    pub compression: String,

    #[validate(range(min = 1))]
    pub row_group_size: usize,

    #[validate(length(min = 1))]
    pub neighborhood_property: String,

    #[validate(length(min = 1))]
    pub partition_prefix: String,

    #[validate(range(min = 1))]
    pub max_workers: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_partitions: None,
            compression: COMPRESSION_SNAPPY.to_string(),
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
            neighborhood_property: NEIGHBORHOOD_PROPERTY.to_string(),
            partition_prefix: DEFAULT_PARTITION_PREFIX.to_string(),
            max_workers: num_cpus::get(),
        }
    }
}

impl PipelineConfig {
    /// Layer built-in defaults, an optional TOML file and `DIVVY_*`
    /// environment variables, in that order of precedence.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        let config: Self = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }
}
