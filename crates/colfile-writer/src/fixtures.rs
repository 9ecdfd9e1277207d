// Fixed test datasets
//
// Three small files covering every column type, nulls in a float column and
// a multi-row-group layout. Readers are tested against these.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use colfile_config::WriterSettings;
use colfile_core::{ColumnType, Field, Schema, Table, TableBuilder, TableError};
use std::path::Path;
use tracing::info;

use crate::error::{Result, WriterError};
use crate::writer::{write_file, WriteSummary};

pub const EXAMPLE1: &str = "example1.parquet";
pub const EXAMPLE2: &str = "example2.parquet";
pub const EXAMPLE3: &str = "example3.parquet";

/// Write all three fixture files into `dir`, creating it if needed
pub fn write_all(dir: impl AsRef<Path>, settings: &WriterSettings) -> Result<Vec<WriteSummary>> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir).map_err(|e| WriterError::io(dir, e))?;

    let summaries = vec![
        write_example1(&dir.join(EXAMPLE1), settings)?,
        write_example2(&dir.join(EXAMPLE2), settings)?,
        write_example3(&dir.join(EXAMPLE3), settings)?,
    ];

    info!(dir = %dir.display(), files = summaries.len(), "Wrote fixtures");
    Ok(summaries)
}

/// Two row groups of three rows
pub fn write_example1(path: &Path, settings: &WriterSettings) -> Result<WriteSummary> {
    let first = TableBuilder::new()
        .column("one", [1i64, 2, 3])
        .column("two", [1i64, 2, 3])
        .column("three", ["foo", "bar", "baz"])
        .column("four", timestamps("four", &[1, 2, 3])?)
        .column("five", dates("five", &[1, 2, 3])?)
        .column("six", [true, false, true])
        .column("seven", [Some(0.5), None, Some(1.0)])
        .build()?;

    let second = TableBuilder::with_schema(first.schema().clone())
        .column("one", [4i64, 5, 6])
        .column("two", [4i64, 5, 6])
        .column("three", ["uno", "dos", "tres"])
        .column("four", timestamps("four", &[4, 5, 6])?)
        .column("five", dates("five", &[4, 5, 6])?)
        .column("six", [false, false, false])
        .column("seven", [Some(0.5), None, Some(1.0)])
        .build()?;

    write_tables(path, settings, &[first, second])
}

/// One row group of five rows; `seven` is mostly null
pub fn write_example2(path: &Path, settings: &WriterSettings) -> Result<WriteSummary> {
    let schema = Schema::new(vec![
        Field::nullable("one", ColumnType::Int64),
        Field::nullable("two", ColumnType::Int64),
        Field::nullable("three", ColumnType::Utf8),
        Field::nullable("four", ColumnType::Timestamp),
        Field::nullable("five", ColumnType::Date),
        Field::nullable("six", ColumnType::Boolean),
        Field::nullable("seven", ColumnType::Float64),
    ])?;

    let table = TableBuilder::with_schema(schema)
        .column("one", [1i64, 3, 5, 7, 9])
        .column("two", [2i64, 4, 6, 8, 0])
        .column("three", ["eins", "zwei", "drei", "vier", "fünf"])
        .column("four", timestamps("four", &[1, 3, 5, 7, 9])?)
        .column("five", dates("five", &[1, 3, 5, 7, 9])?)
        .column("six", [true, false, true, false, true])
        .column("seven", [Some(0.1), None, None, None, None])
        .build()?;

    write_tables(path, settings, &[table])
}

/// One row group of two rows, no float column
pub fn write_example3(path: &Path, settings: &WriterSettings) -> Result<WriteSummary> {
    let table = TableBuilder::new()
        .column("one", [1i64, 3])
        .column("two", [2i64, 4])
        .column("three", ["eins", "zwei"])
        .column("four", timestamps("four", &[1, 3])?)
        .column("five", dates("five", &[1, 3])?)
        .column("six", [true, false])
        .build()?;

    write_tables(path, settings, &[table])
}

fn write_tables(path: &Path, settings: &WriterSettings, tables: &[Table]) -> Result<WriteSummary> {
    let schema = match tables.first() {
        Some(table) => table.schema().clone(),
        None => return Err(TableError::NoColumns.into()),
    };

    write_file(path, schema, settings, |writer| {
        tables.iter().try_for_each(|table| writer.append(table))
    })
}

/// Days of January 2018
fn dates(column: &str, days: &[u32]) -> Result<Vec<NaiveDate>> {
    days.iter()
        .enumerate()
        .map(|(row, &day)| {
            NaiveDate::from_ymd_opt(2018, 1, day).ok_or_else(|| {
                WriterError::Table(TableError::OutOfRange {
                    column: column.to_string(),
                    row,
                })
            })
        })
        .collect()
}

/// Midnight on days of January 2018
fn timestamps(column: &str, days: &[u32]) -> Result<Vec<NaiveDateTime>> {
    Ok(dates(column, days)?
        .into_iter()
        .map(|date| date.and_time(NaiveTime::default()))
        .collect())
}
