// colfile-core - Typed tables, independent of any file
//
// This crate holds the PURE data model: tagged values, explicit schemas,
// the validating table builder and the Arrow conversion. No I/O.

pub mod error;
pub mod schema;
pub mod table;
pub mod to_arrow;
pub mod value;

// Re-export commonly used types
pub use error::{Result, TableError};
pub use schema::{Field, Schema};
pub use table::{Table, TableBuilder};
pub use value::{ColumnType, Value, DATE_FORMAT, TIMESTAMP_FORMAT};
