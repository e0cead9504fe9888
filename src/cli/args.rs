use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "divvy-processor")]
#[command(about = "Normalize Divvy trip data and resolve stations to Chicago neighborhoods")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        help = "TOML configuration file (DIVVY_* environment variables override it)"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Normalize a trip CSV, resolve stations and write an annotated snapshot
    Normalize {
        #[arg(short, long, help = "Input trip CSV file")]
        input: PathBuf,

        #[arg(short, long, help = "Neighborhood GeoJSON feature collection")]
        neighborhoods: PathBuf,

        #[arg(
            short,
            long,
            help = "Output Parquet file path [default: output/divvy-trips-{YYMMDD}.parquet]"
        )]
        output: Option<PathBuf>,

        #[arg(long, help = "Also write the derived station table to this Parquet file")]
        stations_output: Option<PathBuf>,

        #[arg(short, long, help = "Compression: snappy, gzip, lz4, zstd or none")]
        compression: Option<String>,
    },

    /// Derive the station table with resolved neighborhoods
    Stations {
        #[arg(short, long, help = "Input trip CSV file")]
        input: PathBuf,

        #[arg(short, long, help = "Neighborhood GeoJSON feature collection")]
        neighborhoods: PathBuf,

        #[arg(
            short,
            long,
            help = "Output Parquet file path [default: output/divvy-stations-{YYMMDD}.parquet]"
        )]
        output: Option<PathBuf>,
    },

    /// Split a trip snapshot into row-range Parquet partitions
    Partition {
        #[arg(short, long, help = "Input trip snapshot (Parquet)")]
        input: PathBuf,

        #[arg(short, long, help = "Directory for partition files")]
        output_dir: PathBuf,

        #[arg(long, help = "Rows per partition")]
        chunk_size: Option<usize>,

        #[arg(long, help = "Cap on the number of partitions; the last one takes the rest")]
        max_partitions: Option<usize>,

        #[arg(long, help = "Partition file name prefix")]
        prefix: Option<String>,

        #[arg(long, help = "Parallel partition writers")]
        max_workers: Option<usize>,
    },

    /// Look up the neighborhood containing a point
    Resolve {
        #[arg(short, long, help = "Neighborhood GeoJSON feature collection")]
        neighborhoods: PathBuf,

        #[arg(long, allow_hyphen_values = true)]
        longitude: f64,

        #[arg(long, allow_hyphen_values = true)]
        latitude: f64,
    },

    /// Display information about a trip snapshot
    Info {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(short, long, default_value = "10")]
        sample: usize,

        #[arg(
            long,
            default_value = "0",
            help = "Maximum trips to analyze (0 = all trips)"
        )]
        analysis_limit: usize,
    },
}
