use crate::error::{ProcessingError, Result};
use crate::models::TripTable;
use crate::utils::filename::partition_filename;
use crate::utils::progress::ProgressReporter;
use crate::writers::ParquetWriter;
use rayon::prelude::*;
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Index-based split of `total_rows` into contiguous row ranges.
///
/// Ranges hold `chunk_size` rows each and the last one takes whatever is
/// left. With `max_partitions` set, the last permitted range absorbs all
/// remaining rows instead of spilling into further partitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionPlan {
    total_rows: usize,
    chunk_size: usize,
    max_partitions: Option<usize>,
}

impl PartitionPlan {
    pub fn new(total_rows: usize, chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(ProcessingError::Config(
                "Partition chunk size must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            total_rows,
            chunk_size,
            max_partitions: None,
        })
    }

    pub fn with_max_partitions(mut self, max_partitions: Option<usize>) -> Result<Self> {
        if max_partitions == Some(0) {
            return Err(ProcessingError::Config(
                "Maximum partition count must be at least 1".to_string(),
            ));
        }
        self.max_partitions = max_partitions;
        Ok(self)
    }

    pub fn len(&self) -> usize {
        let natural = self.total_rows.div_ceil(self.chunk_size);
        self.max_partitions.map_or(natural, |max| natural.min(max))
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ranges(&self) -> Vec<Range<usize>> {
        let count = self.len();
        (0..count)
            .map(|i| {
                let start = i * self.chunk_size;
                let end = if i + 1 == count {
                    self.total_rows
                } else {
                    start + self.chunk_size
                };
                start..end
            })
            .collect()
    }
}

/// Split a table into owned row-range slices.
///
/// Every slice is materialized at once; use [`PartitionWriter`] to keep
/// only a bounded number of slices resident.
pub fn partition(table: &TripTable, chunk_size: usize) -> Result<Vec<TripTable>> {
    let plan = PartitionPlan::new(table.len(), chunk_size)?;
    Ok(plan.ranges().into_iter().map(|r| table.slice(r)).collect())
}

/// Writes each partition of a table to its own Parquet file.
///
/// Partitions are independent, so they are written on a bounded rayon
/// pool; at most `max_workers` slices exist at any moment.
pub struct PartitionWriter {
    writer: ParquetWriter,
    prefix: String,
    max_workers: usize,
}

impl PartitionWriter {
    pub fn new(writer: ParquetWriter, prefix: &str) -> Self {
        Self {
            writer,
            prefix: prefix.to_string(),
            max_workers: 1,
        }
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    /// Returns the written paths in row order
    pub fn write_all(
        &self,
        table: &TripTable,
        plan: &PartitionPlan,
        output_dir: &Path,
        progress: Option<&ProgressReporter>,
    ) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(output_dir)?;
        let ranges = plan.ranges();

        info!(
            partitions = ranges.len(),
            rows = table.len(),
            workers = self.max_workers,
            dir = %output_dir.display(),
            "writing partitions"
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .build()
            .map_err(|e| ProcessingError::Config(e.to_string()))?;

        pool.install(|| {
            ranges
                .par_iter()
                .map(|range| {
                    let path = partition_filename(output_dir, &self.prefix, range);
                    let slice = table.slice(range.clone());
                    self.writer.write_trip_table(&slice, &path)?;
                    debug!(path = %path.display(), rows = slice.len(), "wrote partition");

                    if let Some(p) = progress {
                        p.increment(1);
                    }
                    Ok(path)
                })
                .collect()
        })
    }
}
