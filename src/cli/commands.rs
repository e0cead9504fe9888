use crate::analyzers::TripAnalyzer;
use crate::cli::args::{Cli, Commands};
use crate::error::Result;
use crate::models::{NeighborhoodTable, PipelineConfig, StationTable, TripTable};
use crate::processors::{Normalizer, PartitionPlan, PartitionWriter, StationDeriver, TripAnnotator};
use crate::readers::NeighborhoodReader;
use crate::utils::filename::{generate_default_parquet_filename, generate_default_stations_filename};
use crate::utils::logging::init_logging;
use crate::utils::progress::ProgressReporter;
use crate::writers::ParquetWriter;
use std::path::Path;
use tracing::info;

pub fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;
    let config = PipelineConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Normalize {
            input,
            neighborhoods,
            output,
            stations_output,
            compression,
        } => {
            let output = output.unwrap_or_else(generate_default_parquet_filename);
            let compression = compression.unwrap_or_else(|| config.compression.clone());

            println!("Normalizing trip data...");
            println!("Input file: {}", input.display());
            println!("Output file: {}", output.display());

            // Fail on bad compression before doing any work
            let writer = ParquetWriter::new()
                .with_compression(&compression)?
                .with_row_group_size(config.row_group_size);

            let (trips, stations) = build_station_table(&input, &neighborhoods, &config)?;
            let trips = TripAnnotator::new().annotate(trips, &stations)?;

            create_parent_dir(&output)?;
            writer.write_trip_table(&trips, &output)?;

            if let Some(stations_output) = stations_output {
                create_parent_dir(&stations_output)?;
                writer.write_stations(&stations, &stations_output)?;
                println!(
                    "Wrote {} stations to {}",
                    stations.len(),
                    stations_output.display()
                );
            }

            let file_info = writer.get_file_info(&output)?;
            println!("\n{}", file_info.summary());
            println!("Normalization complete!");
        }

        Commands::Stations {
            input,
            neighborhoods,
            output,
        } => {
            let output = output.unwrap_or_else(generate_default_stations_filename);
            let writer = ParquetWriter::new().with_compression(&config.compression)?;

            let (_, stations) = build_station_table(&input, &neighborhoods, &config)?;

            create_parent_dir(&output)?;
            writer.write_stations(&stations, &output)?;

            println!(
                "Resolved {}/{} stations to a neighborhood",
                stations.resolved_count(),
                stations.len()
            );
            println!("Station table written to {}", output.display());
        }

        Commands::Partition {
            input,
            output_dir,
            chunk_size,
            max_partitions,
            prefix,
            max_workers,
        } => {
            let chunk_size = chunk_size.unwrap_or(config.chunk_size);
            let max_partitions = max_partitions.or(config.max_partitions);
            let prefix = prefix.unwrap_or_else(|| config.partition_prefix.clone());
            let max_workers = max_workers.unwrap_or(config.max_workers);

            println!("Partitioning {}...", input.display());
            println!("Workers: {}, Chunk size: {}", max_workers, chunk_size);

            let writer = ParquetWriter::new()
                .with_compression(&config.compression)?
                .with_row_group_size(config.row_group_size);
            let table = writer.read_trip_table(&input)?;

            let plan = PartitionPlan::new(table.len(), chunk_size)?
                .with_max_partitions(max_partitions)?;

            let progress =
                ProgressReporter::new(plan.len() as u64, "Writing partitions...", false);
            let paths = PartitionWriter::new(writer, &prefix)
                .with_max_workers(max_workers)
                .write_all(&table, &plan, &output_dir, Some(&progress))?;
            progress.finish_with_message(&format!("Wrote {} partitions", paths.len()));

            for path in &paths {
                println!("  {}", path.display());
            }
        }

        Commands::Resolve {
            neighborhoods,
            longitude,
            latitude,
        } => {
            let table = load_neighborhoods(&neighborhoods, &config)?;
            println!("{}", table.resolve(longitude, latitude));
        }

        Commands::Info {
            file,
            sample,
            analysis_limit,
        } => {
            println!("Analyzing Parquet file: {}", file.display());

            let writer = ParquetWriter::new();
            let file_info = writer.get_file_info(&file)?;

            let stats = TripAnalyzer::new().analyze_parquet_with_limit(&file, analysis_limit)?;
            println!("\n{}", stats.detailed_summary());

            println!("\nFile Details:");
            println!("{}", file_info.summary());

            if sample > 0 {
                println!("\nSample Trips (showing up to {} trips):", sample);
                match writer.read_trip_table_with_limit(&file, sample) {
                    Ok(trips) => print_sample(&trips),
                    Err(e) => println!("Error reading sample data: {}", e),
                }
            }
        }
    }

    Ok(())
}

fn load_neighborhoods(path: &Path, config: &PipelineConfig) -> Result<NeighborhoodTable> {
    NeighborhoodReader::with_name_property(&config.neighborhood_property).read_path(path)
}

/// Normalize the trip CSV and derive its station table
fn build_station_table(
    input: &Path,
    neighborhoods: &Path,
    config: &PipelineConfig,
) -> Result<(TripTable, StationTable)> {
    let trips = Normalizer::with_progress(true).normalize_csv(input)?;
    let neighborhoods = load_neighborhoods(neighborhoods, config)?;
    info!(
        trips = trips.len(),
        neighborhoods = neighborhoods.len(),
        "inputs loaded"
    );

    let stations = StationDeriver::new().derive(&trips, &neighborhoods);
    Ok((trips, stations))
}

fn create_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

fn print_sample(trips: &TripTable) {
    for row in 0..trips.len() {
        let from = trips.from_station_name.get(row).unwrap_or("-");
        let to = trips.to_station_name.get(row).unwrap_or("-");
        let neighborhoods = trips
            .annotations
            .as_ref()
            .map(|a| {
                format!(
                    " [{} -> {}]",
                    a.from_neighborhood.get(row).unwrap_or("-"),
                    a.to_neighborhood.get(row).unwrap_or("-")
                )
            })
            .unwrap_or_default();

        println!(
            "{}. {} -> {}{} on {}/{}/{} {:02}h, {} min, {}°F",
            row + 1,
            from,
            to,
            neighborhoods,
            trips.month[row],
            trips.day[row],
            trips.year[row],
            trips.hour[row],
            trips.tripduration[row],
            trips.temperature[row]
        );
    }
}
