use crate::error::{ProcessingError, Result};
use crate::models::{CategoricalColumn, Station, StationTable, TripAnnotations, TripTable};
use crate::utils::constants::{
    COMPRESSION_GZIP, COMPRESSION_LZ4, COMPRESSION_NONE, COMPRESSION_SNAPPY, COMPRESSION_ZSTD,
    DEFAULT_ROW_GROUP_SIZE,
};
use arrow::array::*;
use arrow::compute::cast;
use arrow::datatypes::{DataType, Field, Schema, UInt16Type};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tracing::debug;

const ANNOTATION_MARKER: &str = "same_station_trip";

pub struct ParquetWriter {
    compression: Compression,
    row_group_size: usize,
}

impl ParquetWriter {
    pub fn new() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
        }
    }

    pub fn with_compression(mut self, compression: &str) -> Result<Self> {
        self.compression = match compression.to_lowercase().as_str() {
            COMPRESSION_SNAPPY => Compression::SNAPPY,
            COMPRESSION_GZIP => Compression::GZIP(GzipLevel::default()),
            COMPRESSION_LZ4 => Compression::LZ4,
            COMPRESSION_ZSTD => Compression::ZSTD(ZstdLevel::default()),
            COMPRESSION_NONE => Compression::UNCOMPRESSED,
            _ => {
                return Err(ProcessingError::Config(format!(
                    "Unsupported compression: {}",
                    compression
                )))
            }
        };
        Ok(self)
    }

    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size.max(1);
        self
    }

    /// Write a trip table snapshot, one row group per `row_group_size` rows.
    ///
    /// The file only appears at `path` once it is complete.
    pub fn write_trip_table(&self, table: &TripTable, path: &Path) -> Result<()> {
        let schema = trip_schema(table.is_annotated());
        let batch = trip_table_to_batch(table, schema.clone())?;

        self.write_atomically(path, schema, |writer| {
            let mut offset = 0;
            while offset < batch.num_rows() {
                let len = self.row_group_size.min(batch.num_rows() - offset);
                writer.write(&batch.slice(offset, len))?;
                offset += len;
            }
            Ok(())
        })?;

        debug!(path = %path.display(), rows = table.len(), "wrote trip table");
        Ok(())
    }

    pub fn write_stations(&self, stations: &StationTable, path: &Path) -> Result<()> {
        let schema = station_schema();
        let list = stations.stations();

        let names = StringArray::from_iter_values(list.iter().map(|s| s.name.as_str()));
        let latitudes = Float64Array::from_iter_values(list.iter().map(|s| s.latitude));
        let longitudes = Float64Array::from_iter_values(list.iter().map(|s| s.longitude));
        let neighborhoods =
            StringArray::from_iter_values(list.iter().map(|s| s.neighborhood.as_str()));

        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(names),
                Arc::new(latitudes),
                Arc::new(longitudes),
                Arc::new(neighborhoods),
            ],
        )?;

        self.write_atomically(path, schema, |writer| {
            writer.write(&batch)?;
            Ok(())
        })?;

        debug!(path = %path.display(), stations = stations.len(), "wrote station table");
        Ok(())
    }

    fn write_atomically<F>(&self, path: &Path, schema: Arc<Schema>, write: F) -> Result<()>
    where
        F: FnOnce(&mut ArrowWriter<File>) -> Result<()>,
    {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let temp = NamedTempFile::new_in(dir)?;

        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build();

        let mut writer = ArrowWriter::try_new(temp.as_file().try_clone()?, schema, Some(props))?;
        write(&mut writer)?;
        writer.close()?;

        temp.persist(path).map_err(|e| ProcessingError::Io(e.error))?;
        Ok(())
    }

    /// Read a whole trip table snapshot back into memory
    pub fn read_trip_table(&self, path: &Path) -> Result<TripTable> {
        self.read_trip_table_with_limit(path, 0)
    }

    /// Read at most `limit` rows (0 = all rows)
    pub fn read_trip_table_with_limit(&self, path: &Path, limit: usize) -> Result<TripTable> {
        let file = File::open(path)?;
        let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
        let annotated = builder.schema().column_with_name(ANNOTATION_MARKER).is_some();
        let reader = builder.build()?;

        let mut table = TripTable::default();
        if annotated {
            table.annotations = Some(TripAnnotations::default());
        }

        for batch_result in reader {
            let mut batch = batch_result?;
            if limit > 0 {
                let remaining = limit - table.len();
                if remaining == 0 {
                    break;
                }
                if batch.num_rows() > remaining {
                    batch = batch.slice(0, remaining);
                }
            }
            append_batch(&mut table, &batch)?;
        }

        Ok(table)
    }

    pub fn read_stations(&self, path: &Path) -> Result<StationTable> {
        let file = File::open(path)?;
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

        let mut stations = Vec::new();
        for batch_result in reader {
            let batch = batch_result?;
            let names = typed_column::<StringArray>(&batch, "name")?;
            let latitudes = typed_column::<Float64Array>(&batch, "latitude")?;
            let longitudes = typed_column::<Float64Array>(&batch, "longitude")?;
            let neighborhoods = typed_column::<StringArray>(&batch, "neighborhood")?;

            for i in 0..batch.num_rows() {
                stations.push(Station::new(
                    names.value(i).to_string(),
                    latitudes.value(i),
                    longitudes.value(i),
                    neighborhoods.value(i).to_string(),
                ));
            }
        }

        Ok(StationTable::new(stations))
    }

    /// Get file statistics
    pub fn get_file_info(&self, path: &Path) -> Result<ParquetFileInfo> {
        use parquet::file::reader::{FileReader, SerializedFileReader};

        let file = File::open(path)?;
        let reader = SerializedFileReader::new(file)?;
        let metadata = reader.metadata();

        let file_metadata = metadata.file_metadata();
        let row_groups = metadata.num_row_groups();
        let total_rows = file_metadata.num_rows();
        let file_size = std::fs::metadata(path)?.len();

        let row_group_sizes = (0..row_groups)
            .map(|i| metadata.row_group(i).num_rows())
            .collect();

        let compression = if row_groups > 0 && metadata.row_group(0).num_columns() > 0 {
            metadata.row_group(0).column(0).compression()
        } else {
            self.compression
        };

        Ok(ParquetFileInfo {
            total_rows,
            row_groups: row_groups as i32,
            row_group_sizes,
            file_size,
            compression,
        })
    }
}

impl Default for ParquetWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn categorical_type() -> DataType {
    DataType::Dictionary(Box::new(DataType::UInt16), Box::new(DataType::Utf8))
}

/// Arrow schema for a trip table, with the annotation columns on request
pub fn trip_schema(annotated: bool) -> Arc<Schema> {
    let mut fields = vec![
        Field::new("gender", categorical_type(), true),
        Field::new("usertype", categorical_type(), true),
        Field::new("events", categorical_type(), true),
        Field::new("from_station_name", categorical_type(), true),
        Field::new("to_station_name", categorical_type(), true),
        Field::new("day", DataType::UInt8, false),
        Field::new("month", DataType::UInt8, false),
        Field::new("week", DataType::UInt8, false),
        Field::new("hour", DataType::UInt8, false),
        Field::new("tripduration", DataType::UInt8, false),
        Field::new("dpcapacity_start", DataType::UInt8, false),
        Field::new("dpcapacity_end", DataType::UInt8, false),
        Field::new("year", DataType::UInt16, false),
        Field::new("from_station_id", DataType::UInt16, false),
        Field::new("latitude_start", DataType::Float64, false),
        Field::new("longitude_start", DataType::Float64, false),
        Field::new("latitude_end", DataType::Float64, false),
        Field::new("longitude_end", DataType::Float64, false),
        Field::new("temperature", DataType::Int8, false),
    ];

    if annotated {
        fields.extend([
            Field::new("from_neighborhood", categorical_type(), true),
            Field::new("to_neighborhood", categorical_type(), true),
            Field::new(ANNOTATION_MARKER, DataType::Boolean, false),
            Field::new("same_neighborhood_trip", DataType::Boolean, false),
        ]);
    }

    Arc::new(Schema::new(fields))
}

pub fn station_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("name", DataType::Utf8, false),
        Field::new("latitude", DataType::Float64, false),
        Field::new("longitude", DataType::Float64, false),
        Field::new("neighborhood", DataType::Utf8, false),
    ]))
}

fn categorical_array(column: &CategoricalColumn) -> Result<ArrayRef> {
    let keys = UInt16Array::from(column.codes().to_vec());
    let values = StringArray::from_iter_values(column.categories().iter());
    let dictionary = DictionaryArray::<UInt16Type>::try_new(keys, Arc::new(values))?;
    Ok(Arc::new(dictionary))
}

fn trip_table_to_batch(table: &TripTable, schema: Arc<Schema>) -> Result<RecordBatch> {
    let mut columns: Vec<ArrayRef> = vec![
        categorical_array(&table.gender)?,
        categorical_array(&table.usertype)?,
        categorical_array(&table.events)?,
        categorical_array(&table.from_station_name)?,
        categorical_array(&table.to_station_name)?,
        Arc::new(UInt8Array::from(table.day.clone())),
        Arc::new(UInt8Array::from(table.month.clone())),
        Arc::new(UInt8Array::from(table.week.clone())),
        Arc::new(UInt8Array::from(table.hour.clone())),
        Arc::new(UInt8Array::from(table.tripduration.clone())),
        Arc::new(UInt8Array::from(table.dpcapacity_start.clone())),
        Arc::new(UInt8Array::from(table.dpcapacity_end.clone())),
        Arc::new(UInt16Array::from(table.year.clone())),
        Arc::new(UInt16Array::from(table.from_station_id.clone())),
        Arc::new(Float64Array::from(table.latitude_start.clone())),
        Arc::new(Float64Array::from(table.longitude_start.clone())),
        Arc::new(Float64Array::from(table.latitude_end.clone())),
        Arc::new(Float64Array::from(table.longitude_end.clone())),
        Arc::new(Int8Array::from(table.temperature.clone())),
    ];

    if let Some(annotations) = &table.annotations {
        columns.push(categorical_array(&annotations.from_neighborhood)?);
        columns.push(categorical_array(&annotations.to_neighborhood)?);
        columns.push(Arc::new(BooleanArray::from(
            annotations.same_station_trip.clone(),
        )));
        columns.push(Arc::new(BooleanArray::from(
            annotations.same_neighborhood_trip.clone(),
        )));
    }

    Ok(RecordBatch::try_new(schema, columns)?)
}

fn typed_column<'a, T: Array + 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a T> {
    batch
        .column_by_name(name)
        .and_then(|column| column.as_any().downcast_ref::<T>())
        .ok_or_else(|| ProcessingError::InvalidFormat(format!("Missing or invalid {} column", name)))
}

/// Decode any string-like column (dictionary or plain) and re-intern it
fn append_categorical(
    into: &mut CategoricalColumn,
    batch: &RecordBatch,
    name: &str,
    row_offset: usize,
) -> Result<()> {
    let column = batch
        .column_by_name(name)
        .ok_or_else(|| ProcessingError::InvalidFormat(format!("Missing {} column", name)))?;
    let decoded = cast(column, &DataType::Utf8)?;
    let strings = decoded
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| ProcessingError::InvalidFormat(format!("Invalid {} column type", name)))?;

    for (i, value) in strings.iter().enumerate() {
        into.push(value, name, row_offset + i)?;
    }
    Ok(())
}

fn append_batch(table: &mut TripTable, batch: &RecordBatch) -> Result<()> {
    let offset = table.len();

    append_categorical(&mut table.gender, batch, "gender", offset)?;
    append_categorical(&mut table.usertype, batch, "usertype", offset)?;
    append_categorical(&mut table.events, batch, "events", offset)?;
    append_categorical(&mut table.from_station_name, batch, "from_station_name", offset)?;
    append_categorical(&mut table.to_station_name, batch, "to_station_name", offset)?;

    table.day.extend_from_slice(typed_column::<UInt8Array>(batch, "day")?.values());
    table.month.extend_from_slice(typed_column::<UInt8Array>(batch, "month")?.values());
    table.week.extend_from_slice(typed_column::<UInt8Array>(batch, "week")?.values());
    table.hour.extend_from_slice(typed_column::<UInt8Array>(batch, "hour")?.values());
    table
        .tripduration
        .extend_from_slice(typed_column::<UInt8Array>(batch, "tripduration")?.values());
    table
        .dpcapacity_start
        .extend_from_slice(typed_column::<UInt8Array>(batch, "dpcapacity_start")?.values());
    table
        .dpcapacity_end
        .extend_from_slice(typed_column::<UInt8Array>(batch, "dpcapacity_end")?.values());

    table.year.extend_from_slice(typed_column::<UInt16Array>(batch, "year")?.values());
    table
        .from_station_id
        .extend_from_slice(typed_column::<UInt16Array>(batch, "from_station_id")?.values());

    table
        .latitude_start
        .extend_from_slice(typed_column::<Float64Array>(batch, "latitude_start")?.values());
    table
        .longitude_start
        .extend_from_slice(typed_column::<Float64Array>(batch, "longitude_start")?.values());
    table
        .latitude_end
        .extend_from_slice(typed_column::<Float64Array>(batch, "latitude_end")?.values());
    table
        .longitude_end
        .extend_from_slice(typed_column::<Float64Array>(batch, "longitude_end")?.values());

    table
        .temperature
        .extend_from_slice(typed_column::<Int8Array>(batch, "temperature")?.values());

    if let Some(annotations) = table.annotations.as_mut() {
        append_categorical(
            &mut annotations.from_neighborhood,
            batch,
            "from_neighborhood",
            offset,
        )?;
        append_categorical(
            &mut annotations.to_neighborhood,
            batch,
            "to_neighborhood",
            offset,
        )?;

        let same_station = typed_column::<BooleanArray>(batch, ANNOTATION_MARKER)?;
        let same_neighborhood = typed_column::<BooleanArray>(batch, "same_neighborhood_trip")?;
        annotations
            .same_station_trip
            .extend((0..same_station.len()).map(|i| same_station.value(i)));
        annotations
            .same_neighborhood_trip
            .extend((0..same_neighborhood.len()).map(|i| same_neighborhood.value(i)));
    }

    Ok(())
}

#[derive(Debug)]
pub struct ParquetFileInfo {
    pub total_rows: i64,
    pub row_groups: i32,
    pub row_group_sizes: Vec<i64>,
    pub file_size: u64,
    pub compression: Compression,
}

impl ParquetFileInfo {
    pub fn summary(&self) -> String {
        let avg_rows = if self.row_groups > 0 {
            self.total_rows as f64 / self.row_groups as f64
        } else {
            0.0
        };

        format!(
            "Parquet File Summary:\n\
            - Total rows: {}\n\
            - Row groups: {}\n\
            - File size: {:.2} MB\n\
            - Compression: {:?}\n\
            - Avg rows per group: {:.0}",
            self.total_rows,
            self.row_groups,
            self.file_size as f64 / 1_048_576.0, // Convert to MB
            self.compression,
            avg_rows
        )
    }
}
