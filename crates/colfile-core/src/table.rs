// In-memory tables and the builder that validates them
//
// A `Table` is only ever produced by `TableBuilder::build` (or by decoding a
// row group), so every table upholds: at least one column, all columns the
// same length, every value matching its field's type and nullability.

use chrono::SubsecRound;
use std::collections::HashSet;

use crate::error::{Result, TableError};
use crate::schema::{Field, Schema};
use crate::value::Value;

/// Immutable, validated table
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    schema: Schema,
    columns: Vec<Vec<Value>>,
    num_rows: usize,
}

impl Table {
    /// Caller guarantees the invariants listed at the top of this module
    pub(crate) fn from_validated(schema: Schema, columns: Vec<Vec<Value>>, num_rows: usize) -> Self {
        Self {
            schema,
            columns,
            num_rows,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows == 0
    }

    pub fn column(&self, index: usize) -> Option<&[Value]> {
        self.columns.get(index).map(Vec::as_slice)
    }

    pub fn column_by_name(&self, name: &str) -> Option<&[Value]> {
        self.schema.index_of(name).and_then(|idx| self.column(idx))
    }

    pub fn columns(&self) -> &[Vec<Value>] {
        &self.columns
    }

    /// Copy out one row, in schema order
    pub fn row(&self, index: usize) -> Option<Vec<&Value>> {
        if index >= self.num_rows {
            return None;
        }
        Some(self.columns.iter().map(|col| &col[index]).collect())
    }

    pub fn rows(&self) -> impl Iterator<Item = Vec<&Value>> + '_ {
        (0..self.num_rows).map(move |idx| self.columns.iter().map(|col| &col[idx]).collect())
    }
}

/// Accumulates named columns and validates them into a `Table`.
///
/// With [`TableBuilder::new`] the schema is inferred: each column takes the
/// type of its first non-null value and is nullable. With
/// [`TableBuilder::with_schema`] the supplied schema is authoritative.
///
/// ```
/// use colfile_core::{ColumnType, Field, Schema, TableBuilder};
///
/// let table = TableBuilder::new()
///     .column("one", [1i64, 2, 3])
///     .column("seven", [Some(0.5), None, Some(1.0)])
///     .build()
///     .unwrap();
/// assert_eq!(table.num_rows(), 3);
/// assert_eq!(table.schema().fields()[1].column_type(), ColumnType::Float64);
/// ```
#[derive(Debug, Default)]
pub struct TableBuilder {
    schema: Option<Schema>,
    columns: Vec<(String, Vec<Value>)>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schema(schema: Schema) -> Self {
        Self {
            schema: Some(schema),
            columns: Vec::new(),
        }
    }

    /// Append a column, builder style
    pub fn column<I, V>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.push_column(name, values);
        self
    }

    /// Append a column in place
    pub fn push_column<I, V>(&mut self, name: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.columns
            .push((name.into(), values.into_iter().map(Into::into).collect()));
    }

    pub fn build(self) -> Result<Table> {
        let Some((_, first)) = self.columns.first() else {
            return Err(TableError::NoColumns);
        };
        let num_rows = first.len();

        let mut seen = HashSet::with_capacity(self.columns.len());
        for (name, _) in &self.columns {
            if !seen.insert(name.as_str()) {
                return Err(TableError::DuplicateColumn(name.clone()));
            }
        }

        for (name, values) in &self.columns {
            if values.len() != num_rows {
                return Err(TableError::LengthMismatch {
                    column: name.clone(),
                    expected: num_rows,
                    actual: values.len(),
                });
            }
        }

        let schema = match self.schema {
            Some(schema) => {
                check_names(&schema, &self.columns)?;
                schema
            }
            None => infer_schema(&self.columns)?,
        };

        let columns = self
            .columns
            .into_iter()
            .zip(schema.fields())
            .map(|((_, values), field)| normalize_column(field, values))
            .collect::<Result<Vec<_>>>()?;

        Ok(Table::from_validated(schema, columns, num_rows))
    }
}

fn check_names(schema: &Schema, columns: &[(String, Vec<Value>)]) -> Result<()> {
    if schema.len() != columns.len() {
        return Err(TableError::SchemaMismatch(format!(
            "schema declares {} columns, builder has {}",
            schema.len(),
            columns.len()
        )));
    }

    for (idx, (field, (name, _))) in schema.fields().iter().zip(columns).enumerate() {
        if field.name() != name {
            return Err(TableError::SchemaMismatch(format!(
                "column {}: schema declares '{}', builder has '{}'",
                idx,
                field.name(),
                name
            )));
        }
    }

    Ok(())
}

fn infer_schema(columns: &[(String, Vec<Value>)]) -> Result<Schema> {
    let fields = columns
        .iter()
        .map(|(name, values)| {
            values
                .iter()
                .find_map(Value::column_type)
                .map(|column_type| Field::nullable(name.as_str(), column_type))
                .ok_or_else(|| TableError::CannotInfer(name.clone()))
        })
        .collect::<Result<Vec<_>>>()?;

    Schema::new(fields)
}

/// Check every value against the field and truncate timestamps to the
/// stored microsecond precision
fn normalize_column(field: &Field, mut values: Vec<Value>) -> Result<Vec<Value>> {
    for (row, value) in values.iter_mut().enumerate() {
        match value.column_type() {
            None if !field.is_nullable() => {
                return Err(TableError::UnexpectedNull {
                    column: field.name().to_string(),
                    row,
                });
            }
            None => {}
            Some(found) if found != field.column_type() => {
                return Err(TableError::TypeMismatch {
                    column: field.name().to_string(),
                    row,
                    expected: field.column_type(),
                    found,
                });
            }
            Some(_) => {
                if let Value::Timestamp(ts) = value {
                    *ts = ts.trunc_subsecs(6);
                }
            }
        }
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ColumnType;
    use chrono::NaiveDate;

    #[test]
    fn test_build_infers_schema() {
        let table = TableBuilder::new()
            .column("one", [1i64, 2, 3])
            .column("three", ["foo", "bar", "baz"])
            .column("six", [true, false, true])
            .build()
            .unwrap();

        assert_eq!(table.num_rows(), 3);
        assert_eq!(table.num_columns(), 3);
        let types: Vec<_> = table
            .schema()
            .fields()
            .iter()
            .map(Field::column_type)
            .collect();
        assert_eq!(
            types,
            vec![ColumnType::Int64, ColumnType::Utf8, ColumnType::Boolean]
        );
        assert!(table.schema().fields().iter().all(Field::is_nullable));
    }

    #[test]
    fn test_build_rejects_length_mismatch() {
        let result = TableBuilder::new()
            .column("one", [1i64, 2, 3])
            .column("two", [1i64, 2])
            .build();

        match result {
            Err(TableError::LengthMismatch {
                column,
                expected,
                actual,
            }) => {
                assert_eq!(column, "two");
                assert_eq!(expected, 3);
                assert_eq!(actual, 2);
            }
            other => panic!("expected LengthMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_build_rejects_empty_builder() {
        assert!(matches!(
            TableBuilder::new().build(),
            Err(TableError::NoColumns)
        ));
    }

    #[test]
    fn test_build_rejects_duplicate_names() {
        let result = TableBuilder::new()
            .column("one", [1i64])
            .column("one", [2i64])
            .build();
        assert!(matches!(result, Err(TableError::DuplicateColumn(_))));
    }

    #[test]
    fn test_all_null_column_needs_schema() {
        let result = TableBuilder::new()
            .column("seven", [None::<f64>, None])
            .build();
        assert!(matches!(result, Err(TableError::CannotInfer(name)) if name == "seven"));

        let schema = Schema::new(vec![Field::nullable("seven", ColumnType::Float64)]).unwrap();
        let table = TableBuilder::with_schema(schema)
            .column("seven", [None::<f64>, None])
            .build()
            .unwrap();
        assert_eq!(table.num_rows(), 2);
        assert!(table.column(0).unwrap().iter().all(Value::is_null));
    }

    #[test]
    fn test_explicit_schema_checks_types_and_nulls() {
        let schema = Schema::new(vec![Field::required("one", ColumnType::Int64)]).unwrap();

        let wrong_type = TableBuilder::with_schema(schema.clone())
            .column("one", [Value::Int(1), Value::Float(2.0)])
            .build();
        assert!(matches!(
            wrong_type,
            Err(TableError::TypeMismatch { row: 1, .. })
        ));

        let null = TableBuilder::with_schema(schema.clone())
            .column("one", [Some(1i64), None])
            .build();
        assert!(matches!(null, Err(TableError::UnexpectedNull { row: 1, .. })));

        let renamed = TableBuilder::with_schema(schema)
            .column("uno", [1i64])
            .build();
        assert!(matches!(renamed, Err(TableError::SchemaMismatch(_))));
    }

    #[test]
    fn test_inferred_column_rejects_mixed_types() {
        let result = TableBuilder::new()
            .column("mixed", [Value::Null, Value::Int(1), Value::from("x")])
            .build();
        assert!(matches!(
            result,
            Err(TableError::TypeMismatch {
                row: 2,
                expected: ColumnType::Int64,
                found: ColumnType::Utf8,
                ..
            })
        ));
    }

    #[test]
    fn test_timestamps_truncated_to_micros() {
        let ts = NaiveDate::from_ymd_opt(2018, 1, 1)
            .unwrap()
            .and_hms_nano_opt(0, 0, 0, 1_234_567)
            .unwrap();
        let table = TableBuilder::new().column("four", [ts]).build().unwrap();

        let expected = NaiveDate::from_ymd_opt(2018, 1, 1)
            .unwrap()
            .and_hms_micro_opt(0, 0, 0, 1_234)
            .unwrap();
        assert_eq!(table.column(0).unwrap()[0], Value::Timestamp(expected));
    }

    #[test]
    fn test_rows_and_lookup() {
        let table = TableBuilder::new()
            .column("one", [1i64, 2])
            .column("three", ["foo", "bar"])
            .build()
            .unwrap();

        let row = table.row(1).unwrap();
        assert_eq!(row, vec![&Value::Int(2), &Value::from("bar")]);
        assert!(table.row(2).is_none());
        assert_eq!(table.rows().count(), 2);
        assert_eq!(table.column_by_name("three").unwrap().len(), 2);
        assert!(table.column_by_name("missing").is_none());
    }

    #[test]
    fn test_zero_row_table() {
        let table = TableBuilder::new()
            .column("one", Vec::<i64>::new())
            .build();
        // Inference has nothing to look at
        assert!(matches!(table, Err(TableError::CannotInfer(_))));

        let schema = Schema::new(vec![Field::nullable("one", ColumnType::Int64)]).unwrap();
        let table = TableBuilder::with_schema(schema)
            .column("one", Vec::<i64>::new())
            .build()
            .unwrap();
        assert!(table.is_empty());
    }
}
