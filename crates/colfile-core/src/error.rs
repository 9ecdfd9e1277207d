//! Error types for table construction and conversion

use arrow::error::ArrowError;
use thiserror::Error;

use crate::value::ColumnType;

/// Errors raised while building tables or converting them to and from Arrow
#[derive(Debug, Error)]
pub enum TableError {
    /// A schema or table must have at least one column
    #[error("table has no columns")]
    NoColumns,

    /// Two columns share a name
    #[error("duplicate column name '{0}'")]
    DuplicateColumn(String),

    /// Columns within one table disagree in row count
    #[error("column '{column}' has {actual} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// Column names, order, types or nullability differ from the expected schema
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    /// Type inference found nothing but nulls
    #[error("column '{0}' contains only nulls; supply an explicit schema")]
    CannotInfer(String),

    /// A value does not match its column type
    #[error("column '{column}' row {row}: expected {expected}, found {found}")]
    TypeMismatch {
        column: String,
        row: usize,
        expected: ColumnType,
        found: ColumnType,
    },

    /// A null value in a column declared non-nullable
    #[error("column '{column}' is not nullable but row {row} is null")]
    UnexpectedNull { column: String, row: usize },

    /// An Arrow type with no `ColumnType` counterpart
    #[error("column '{column}' has unsupported type {data_type}")]
    UnsupportedType { column: String, data_type: String },

    /// A stored temporal value cannot be represented
    #[error("column '{column}' row {row}: value out of range")]
    OutOfRange { column: String, row: usize },

    /// Unrecognised column type name
    #[error("unknown column type '{0}'; expected one of int, float, string, bool, timestamp, date")]
    UnknownType(String),

    #[error(transparent)]
    Arrow(#[from] ArrowError),
}

/// Result type alias for TableError
pub type Result<T> = std::result::Result<T, TableError>;
