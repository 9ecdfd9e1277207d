// Integration tests for colfile-core
//
// Exercises the builder contract across many column shapes rather than one
// hand-picked table.

use colfile_core::{ColumnType, Field, Schema, TableBuilder, TableError, Value};

fn int_column(len: usize) -> Vec<i64> {
    (0..len as i64).collect()
}

#[test]
fn consistent_lengths_build_with_common_row_count() {
    for len in [1usize, 2, 3, 17, 256] {
        for width in 1..5 {
            let mut builder = TableBuilder::new();
            for col in 0..width {
                builder.push_column(format!("c{}", col), int_column(len));
            }

            let table = builder.build().expect("consistent table should build");
            assert_eq!(table.num_rows(), len);
            assert_eq!(table.num_columns(), width);
        }
    }
}

#[test]
fn any_length_mismatch_fails() {
    for (first, second) in [(3usize, 2usize), (2, 3), (1, 0), (10, 11)] {
        let result = TableBuilder::new()
            .column("a", int_column(first))
            .column("b", int_column(second))
            .build();

        match result {
            Err(TableError::LengthMismatch {
                column,
                expected,
                actual,
            }) => {
                assert_eq!(column, "b");
                assert_eq!(expected, first);
                assert_eq!(actual, second);
            }
            other => panic!("expected LengthMismatch for {first}/{second}, got {other:?}"),
        }
    }
}

#[test]
fn mismatch_in_later_column_is_reported_by_name() {
    let result = TableBuilder::new()
        .column("one", [1i64, 2, 3])
        .column("two", [1i64, 2, 3])
        .column("three", ["foo", "bar"])
        .build();

    let err = result.unwrap_err();
    assert!(err.to_string().contains("'three'"), "unexpected: {err}");
}

#[test]
fn explicit_schema_wins_over_inference() {
    let schema = Schema::new(vec![
        Field::required("one", ColumnType::Int64),
        Field::nullable("seven", ColumnType::Float64),
    ])
    .unwrap();

    let table = TableBuilder::with_schema(schema.clone())
        .column("one", [1i64, 3, 5, 7, 9])
        .column("seven", [Some(0.1), None, None, None, None])
        .build()
        .unwrap();

    assert_eq!(table.schema(), &schema);
    assert_eq!(table.column(1).unwrap()[0], Value::Float(0.1));
    assert_eq!(
        table.column(1).unwrap().iter().filter(|v| v.is_null()).count(),
        4
    );
}
