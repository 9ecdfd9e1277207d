// Convert tables to and from Arrow RecordBatch
//
// Columns are built with typed Arrow builders in schema order. Decoding casts
// each incoming column to its canonical Arrow type first, so batches written
// by other tools with narrower widths or other timestamp units still decode.

use arrow::array::{
    Array, ArrayRef, AsArray, BooleanBuilder, Date32Builder, Float64Builder, Int64Builder,
    RecordBatch, StringBuilder, TimestampMicrosecondBuilder,
};
use arrow::compute::cast;
use arrow::datatypes::{Date32Type, Float64Type, Int64Type, TimestampMicrosecondType};
use std::sync::Arc;

use crate::error::{Result, TableError};
use crate::schema::{Field, Schema};
use crate::table::Table;
use crate::value::{
    date_to_days, days_to_date, micros_to_timestamp, timestamp_to_micros, ColumnType, Value,
};

impl Table {
    /// Encode the table as one Arrow `RecordBatch`
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let columns = self
            .schema()
            .fields()
            .iter()
            .zip(self.columns())
            .map(|(field, values)| build_array(field, values))
            .collect::<Result<Vec<_>>>()?;

        Ok(RecordBatch::try_new(self.schema().arrow_schema(), columns)?)
    }

    /// Decode a `RecordBatch` into a table, validating it like the builder does
    pub fn try_from_record_batch(batch: &RecordBatch) -> Result<Table> {
        let schema = Schema::try_from_arrow(batch.schema().as_ref())?;

        let columns = schema
            .fields()
            .iter()
            .zip(batch.columns())
            .map(|(field, array)| decode_array(field, array))
            .collect::<Result<Vec<_>>>()?;

        Ok(Table::from_validated(schema, columns, batch.num_rows()))
    }
}

fn mismatch(field: &Field, row: usize, value: &Value) -> TableError {
    match value.column_type() {
        Some(found) => TableError::TypeMismatch {
            column: field.name().to_string(),
            row,
            expected: field.column_type(),
            found,
        },
        None => TableError::UnexpectedNull {
            column: field.name().to_string(),
            row,
        },
    }
}

fn build_array(field: &Field, values: &[Value]) -> Result<ArrayRef> {
    let len = values.len();
    let array: ArrayRef = match field.column_type() {
        ColumnType::Int64 => {
            let mut builder = Int64Builder::with_capacity(len);
            for (row, value) in values.iter().enumerate() {
                match value {
                    Value::Int(v) => builder.append_value(*v),
                    Value::Null => builder.append_null(),
                    other => return Err(mismatch(field, row, other)),
                }
            }
            Arc::new(builder.finish())
        }
        ColumnType::Float64 => {
            let mut builder = Float64Builder::with_capacity(len);
            for (row, value) in values.iter().enumerate() {
                match value {
                    Value::Float(v) => builder.append_value(*v),
                    Value::Null => builder.append_null(),
                    other => return Err(mismatch(field, row, other)),
                }
            }
            Arc::new(builder.finish())
        }
        ColumnType::Utf8 => {
            let mut builder = StringBuilder::with_capacity(len, len * 8);
            for (row, value) in values.iter().enumerate() {
                match value {
                    Value::String(v) => builder.append_value(v),
                    Value::Null => builder.append_null(),
                    other => return Err(mismatch(field, row, other)),
                }
            }
            Arc::new(builder.finish())
        }
        ColumnType::Boolean => {
            let mut builder = BooleanBuilder::with_capacity(len);
            for (row, value) in values.iter().enumerate() {
                match value {
                    Value::Bool(v) => builder.append_value(*v),
                    Value::Null => builder.append_null(),
                    other => return Err(mismatch(field, row, other)),
                }
            }
            Arc::new(builder.finish())
        }
        ColumnType::Timestamp => {
            let mut builder = TimestampMicrosecondBuilder::with_capacity(len);
            for (row, value) in values.iter().enumerate() {
                match value {
                    Value::Timestamp(v) => builder.append_value(timestamp_to_micros(*v)),
                    Value::Null => builder.append_null(),
                    other => return Err(mismatch(field, row, other)),
                }
            }
            Arc::new(builder.finish())
        }
        ColumnType::Date => {
            let mut builder = Date32Builder::with_capacity(len);
            for (row, value) in values.iter().enumerate() {
                match value {
                    Value::Date(v) => builder.append_value(date_to_days(*v)),
                    Value::Null => builder.append_null(),
                    other => return Err(mismatch(field, row, other)),
                }
            }
            Arc::new(builder.finish())
        }
    };

    if !field.is_nullable() && array.null_count() > 0 {
        let row = values.iter().position(Value::is_null).unwrap_or_default();
        return Err(TableError::UnexpectedNull {
            column: field.name().to_string(),
            row,
        });
    }

    Ok(array)
}

fn unexpected_layout(field: &Field, array: &ArrayRef) -> TableError {
    TableError::UnsupportedType {
        column: field.name().to_string(),
        data_type: array.data_type().to_string(),
    }
}

fn decode_array(field: &Field, array: &ArrayRef) -> Result<Vec<Value>> {
    let target = field.arrow_type();
    let array = if array.data_type() == &target {
        Arc::clone(array)
    } else {
        cast(array.as_ref(), &target)?
    };

    let values = match field.column_type() {
        ColumnType::Int64 => {
            let typed = array
                .as_primitive_opt::<Int64Type>()
                .ok_or_else(|| unexpected_layout(field, &array))?;
            typed
                .iter()
                .map(|v| v.map(Value::Int).unwrap_or(Value::Null))
                .collect()
        }
        ColumnType::Float64 => {
            let typed = array
                .as_primitive_opt::<Float64Type>()
                .ok_or_else(|| unexpected_layout(field, &array))?;
            typed
                .iter()
                .map(|v| v.map(Value::Float).unwrap_or(Value::Null))
                .collect()
        }
        ColumnType::Utf8 => {
            let typed = array
                .as_string_opt::<i32>()
                .ok_or_else(|| unexpected_layout(field, &array))?;
            typed
                .iter()
                .map(|v| v.map(Value::from).unwrap_or(Value::Null))
                .collect()
        }
        ColumnType::Boolean => {
            let typed = array
                .as_boolean_opt()
                .ok_or_else(|| unexpected_layout(field, &array))?;
            typed
                .iter()
                .map(|v| v.map(Value::Bool).unwrap_or(Value::Null))
                .collect()
        }
        ColumnType::Timestamp => {
            let typed = array
                .as_primitive_opt::<TimestampMicrosecondType>()
                .ok_or_else(|| unexpected_layout(field, &array))?;
            typed
                .iter()
                .enumerate()
                .map(|(row, v)| match v {
                    Some(micros) => micros_to_timestamp(micros)
                        .map(Value::Timestamp)
                        .ok_or_else(|| TableError::OutOfRange {
                            column: field.name().to_string(),
                            row,
                        }),
                    None => Ok(Value::Null),
                })
                .collect::<Result<Vec<_>>>()?
        }
        ColumnType::Date => {
            let typed = array
                .as_primitive_opt::<Date32Type>()
                .ok_or_else(|| unexpected_layout(field, &array))?;
            typed
                .iter()
                .enumerate()
                .map(|(row, v)| match v {
                    Some(days) => days_to_date(days).map(Value::Date).ok_or_else(|| {
                        TableError::OutOfRange {
                            column: field.name().to_string(),
                            row,
                        }
                    }),
                    None => Ok(Value::Null),
                })
                .collect::<Result<Vec<_>>>()?
        }
    };

    Ok(values)
}
