// CSV conversion tests

use colfile_config::WriterSettings;
use colfile_core::{ColumnType, Field, Schema, Value};
use colfile_writer::{convert_csv, ColumnarReader, CsvOptions, ErrorCode, WriterError};
use std::path::Path;

fn schema() -> Schema {
    Schema::new(vec![
        Field::required("id", ColumnType::Int64),
        Field::nullable("name", ColumnType::Utf8),
        Field::nullable("score", ColumnType::Float64),
        Field::nullable("active", ColumnType::Boolean),
        Field::nullable("seen", ColumnType::Timestamp),
        Field::nullable("day", ColumnType::Date),
    ])
    .unwrap()
}

const CSV: &str = "\
id,name,score,active,seen,day
1,alpha,0.5,true,2018-01-01 00:00:00,2018-01-01
2,,,false,2018-01-02T12:30:00.250,2018-01-02
3,gamma,1.5,1,,
4,delta,2.0,0,2018-01-04 08:00:00,2018-01-04
5,epsilon,-3.25,TRUE,2018-01-05 09:15:00,2018-01-05
";

fn with_header() -> CsvOptions {
    CsvOptions {
        has_header: true,
        ..CsvOptions::default()
    }
}

fn write_source(dir: &Path, content: &str) -> std::path::PathBuf {
    let path = dir.join("input.csv");
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn converts_all_rows_in_groups() {
    let dir = tempfile::tempdir().unwrap();
    let src = write_source(dir.path(), CSV);
    let dest = dir.path().join("out.parquet");
    let options = CsvOptions {
        rows_per_group: 2,
        ..with_header()
    };

    let rows = convert_csv(&src, &dest, &schema(), &WriterSettings::default(), &options).unwrap();
    assert_eq!(rows, 5);

    let reader = ColumnarReader::open(&dest).unwrap();
    assert_eq!(reader.schema(), &schema());
    assert_eq!(reader.num_row_groups(), 3);
    assert_eq!(reader.num_rows(), 5);

    let first = reader.read_row_group(0).unwrap();
    let names = first.column_by_name("name").unwrap();
    assert_eq!(
        names,
        &[Value::String("alpha".to_string()), Value::String(String::new())]
    );
    assert!(first.column_by_name("score").unwrap()[1].is_null());
    let active = first.column_by_name("active").unwrap();
    assert_eq!(active, &[Value::Bool(true), Value::Bool(false)]);

    let second = reader.read_row_group(1).unwrap();
    assert!(second.column_by_name("seen").unwrap()[0].is_null());
    assert!(second.column_by_name("day").unwrap()[0].is_null());
}

#[test]
fn headerless_input_with_custom_delimiter() {
    let dir = tempfile::tempdir().unwrap();
    let src = write_source(dir.path(), "1;a\n2;b\n3;c\n");
    let dest = dir.path().join("out.parquet");
    let schema = Schema::new(vec![
        Field::required("n", ColumnType::Int64),
        Field::required("s", ColumnType::Utf8),
    ])
    .unwrap();
    let options = CsvOptions {
        has_header: false,
        delimiter: ';',
        ..CsvOptions::default()
    };

    let rows = convert_csv(&src, &dest, &schema, &WriterSettings::default(), &options).unwrap();
    assert_eq!(rows, 3);

    let table = ColumnarReader::open(&dest).unwrap().read_row_group(0).unwrap();
    assert_eq!(
        table.column_by_name("n").unwrap(),
        &[Value::Int(1), Value::Int(2), Value::Int(3)]
    );
}

#[test]
fn existing_target_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let src = write_source(dir.path(), CSV);
    let dest = dir.path().join("taken.parquet");
    std::fs::write(&dest, b"keep me").unwrap();

    let err = convert_csv(
        &src,
        &dest,
        &schema(),
        &WriterSettings::default(),
        &CsvOptions::default(),
    )
    .unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::E007TargetExists));
    assert_eq!(std::fs::read(&dest).unwrap(), b"keep me");
}

#[test]
fn missing_source_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("out.parquet");

    let err = convert_csv(
        dir.path().join("missing.csv"),
        &dest,
        &schema(),
        &WriterSettings::default(),
        &CsvOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, WriterError::Io { .. }));
    assert!(!dest.exists());
}

#[test]
fn bad_cell_reports_line_and_removes_target() {
    let dir = tempfile::tempdir().unwrap();
    let src = write_source(
        dir.path(),
        "id,name,score,active,seen,day\n1,a,1.0,true,,\n2,b,not-a-number,true,,\n",
    );
    let dest = dir.path().join("out.parquet");

    let err = convert_csv(
        &src,
        &dest,
        &schema(),
        &WriterSettings::default(),
        &with_header(),
    )
    .unwrap_err();
    match err {
        WriterError::InvalidCsv { line, message, .. } => {
            assert_eq!(line, 3);
            assert!(message.contains("score"), "unexpected message: {message}");
        }
        other => panic!("expected InvalidCsv, got {other:?}"),
    }
    assert!(!dest.exists());
}

#[test]
fn wrong_field_count_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let src = write_source(dir.path(), "id,name,score,active,seen,day\n1,a,1.0\n");
    let dest = dir.path().join("out.parquet");

    let err = convert_csv(
        &src,
        &dest,
        &schema(),
        &WriterSettings::default(),
        &with_header(),
    )
    .unwrap_err();
    assert!(err.to_string().contains("expected 6 fields, found 3"));
}

#[test]
fn empty_required_cell_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let src = write_source(dir.path(), "id,name,score,active,seen,day\n,a,1.0,true,,\n");
    let dest = dir.path().join("out.parquet");

    let err = convert_csv(
        &src,
        &dest,
        &schema(),
        &WriterSettings::default(),
        &with_header(),
    )
    .unwrap_err();
    assert!(err.to_string().contains("not nullable"));
}

#[test]
fn first_line_is_data_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let src = write_source(dir.path(), "1,a\n2,b\n3,c\n");
    let dest = dir.path().join("out.parquet");
    let schema = Schema::new(vec![
        Field::required("n", ColumnType::Int64),
        Field::required("s", ColumnType::Utf8),
    ])
    .unwrap();

    let rows = convert_csv(&src, &dest, &schema, &WriterSettings::default(), &CsvOptions::default())
        .unwrap();
    assert_eq!(rows, 3);

    let table = ColumnarReader::open(&dest).unwrap().read_row_group(0).unwrap();
    assert_eq!(
        table.column_by_name("n").unwrap(),
        &[Value::Int(1), Value::Int(2), Value::Int(3)]
    );
}

#[test]
fn empty_string_cells_survive_for_both_nullabilities() {
    let dir = tempfile::tempdir().unwrap();
    let src = write_source(dir.path(), "1,,x\n2,y,\n");
    let dest = dir.path().join("out.parquet");
    let schema = Schema::new(vec![
        Field::required("n", ColumnType::Int64),
        Field::required("req", ColumnType::Utf8),
        Field::nullable("opt", ColumnType::Utf8),
    ])
    .unwrap();

    let rows = convert_csv(&src, &dest, &schema, &WriterSettings::default(), &CsvOptions::default())
        .unwrap();
    assert_eq!(rows, 2);

    let table = ColumnarReader::open(&dest).unwrap().read_row_group(0).unwrap();
    assert_eq!(
        table.column_by_name("req").unwrap(),
        &[Value::String(String::new()), Value::String("y".to_string())]
    );
    assert_eq!(
        table.column_by_name("opt").unwrap(),
        &[Value::String("x".to_string()), Value::String(String::new())]
    );
}
