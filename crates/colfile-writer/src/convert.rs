// CSV to columnar file conversion
//
// Records are parsed against an explicit schema and appended in row groups
// of `rows_per_group` rows. A failed conversion removes the partial target.

use chrono::{NaiveDate, NaiveDateTime};
use colfile_config::{CsvSettings, WriterSettings};
use colfile_core::{ColumnType, Field, Schema, TableBuilder, Value, DATE_FORMAT, TIMESTAMP_FORMAT};
use std::fs::File;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{Result, WriterError};
use crate::writer::{write_new_file, ColumnarWriter};

/// Accepted in addition to `TIMESTAMP_FORMAT`
const ISO_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvOptions {
    /// Skip the first record; off by default, so column names come from the schema
    pub has_header: bool,
    /// Must be ASCII
    pub delimiter: char,
    pub rows_per_group: usize,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self::from(&CsvSettings::default())
    }
}

impl From<&CsvSettings> for CsvOptions {
    fn from(settings: &CsvSettings) -> Self {
        Self {
            has_header: settings.has_header,
            delimiter: settings.delimiter,
            rows_per_group: settings.rows_per_group,
        }
    }
}

/// Convert the CSV file at `src` into a new columnar file at `dest`
///
/// Returns the number of data rows written. `dest` must not exist.
pub fn convert_csv(
    src: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    schema: &Schema,
    settings: &WriterSettings,
    options: &CsvOptions,
) -> Result<u64> {
    let (src, dest) = (src.as_ref(), dest.as_ref());

    let delimiter = u8::try_from(options.delimiter).map_err(|_| {
        WriterError::invalid_config(format!(
            "CSV delimiter '{}' is not a single-byte character",
            options.delimiter
        ))
    })?;
    if options.rows_per_group == 0 {
        return Err(WriterError::invalid_config(
            "rows_per_group must be greater than 0",
        ));
    }

    let file = File::open(src).map_err(|e| WriterError::io(src, e))?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(options.has_header)
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(file);

    debug!(src = %src.display(), dest = %dest.display(), "Converting CSV");

    let written = write_new_file(dest, schema.clone(), settings, |writer| {
        let mut chunk = RowChunk::new(schema);

        for record in reader.records() {
            let record = record.map_err(csv_error)?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            chunk.push_record(&record, line)?;

            if chunk.len() >= options.rows_per_group {
                chunk.flush(writer)?;
            }
        }
        chunk.flush(writer)
    });

    match written {
        Ok(summary) => {
            info!(
                src = %src.display(),
                dest = %dest.display(),
                rows = summary.rows,
                row_groups = summary.row_groups,
                "Converted CSV"
            );
            Ok(summary.rows)
        }
        // the target belongs to someone else
        Err(e @ WriterError::TargetExists { .. }) => Err(e),
        Err(e) => {
            if let Err(remove_err) = std::fs::remove_file(dest) {
                warn!(dest = %dest.display(), error = %remove_err, "Failed to remove partial target");
            }
            Err(e)
        }
    }
}

fn csv_error(err: csv::Error) -> WriterError {
    let line = err.position().map(|p| p.line()).unwrap_or(0);
    WriterError::invalid_csv(line, err.to_string())
}

/// Column buffers for the row group being assembled
struct RowChunk<'a> {
    schema: &'a Schema,
    columns: Vec<Vec<Value>>,
}

impl<'a> RowChunk<'a> {
    fn new(schema: &'a Schema) -> Self {
        Self {
            schema,
            columns: vec![Vec::new(); schema.len()],
        }
    }

    fn len(&self) -> usize {
        self.columns.first().map(Vec::len).unwrap_or(0)
    }

    fn push_record(&mut self, record: &csv::StringRecord, line: u64) -> Result<()> {
        if record.len() != self.schema.len() {
            return Err(WriterError::invalid_csv(
                line,
                format!(
                    "expected {} fields, found {}",
                    self.schema.len(),
                    record.len()
                ),
            ));
        }

        for ((field, cell), column) in self
            .schema
            .fields()
            .iter()
            .zip(record.iter())
            .zip(self.columns.iter_mut())
        {
            let value = parse_cell(field, cell).map_err(|msg| WriterError::invalid_csv(line, msg))?;
            column.push(value);
        }
        Ok(())
    }

    fn flush(&mut self, writer: &mut ColumnarWriter) -> Result<()> {
        if self.len() == 0 {
            return Ok(());
        }

        let mut builder = TableBuilder::with_schema(self.schema.clone());
        for (field, column) in self.schema.fields().iter().zip(self.columns.iter_mut()) {
            builder.push_column(field.name(), std::mem::take(column));
        }
        writer.append(&builder.build()?)
    }
}

/// Parse one CSV cell as `field`'s type
///
/// An empty cell is an empty string for string columns and null otherwise.
fn parse_cell(field: &Field, cell: &str) -> std::result::Result<Value, String> {
    if cell.is_empty() {
        if field.column_type() == ColumnType::Utf8 {
            return Ok(Value::String(String::new()));
        }
        if field.is_nullable() {
            return Ok(Value::Null);
        }
        return Err(format!("column '{}' is not nullable but is empty", field.name()));
    }

    let text = cell.trim();
    let invalid = || {
        format!(
            "column '{}': cannot parse '{}' as {}",
            field.name(),
            cell,
            field.column_type()
        )
    };

    match field.column_type() {
        ColumnType::Int64 => text.parse::<i64>().map(Value::Int).map_err(|_| invalid()),
        ColumnType::Float64 => text.parse::<f64>().map(Value::Float).map_err(|_| invalid()),
        ColumnType::Utf8 => Ok(Value::String(cell.to_string())),
        ColumnType::Boolean => parse_bool(text).map(Value::Bool).ok_or_else(invalid),
        ColumnType::Timestamp => NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(text, ISO_TIMESTAMP_FORMAT))
            .map(Value::Timestamp)
            .map_err(|_| invalid()),
        ColumnType::Date => NaiveDate::parse_from_str(text, DATE_FORMAT)
            .map(Value::Date)
            .map_err(|_| invalid()),
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}
