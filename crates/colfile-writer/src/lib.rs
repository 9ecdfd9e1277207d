//! Parquet writer for colfile tables
//!
//! This crate writes `colfile_core::Table`s to Parquet files, one row group
//! per append, and reads them back. CSV conversion and the fixture datasets
//! are built on the same writer.

// WriterError carries paths and parquet sources; the error path is cold.
#![allow(clippy::result_large_err)]

mod convert;
mod encoding;
mod error;
pub mod fixtures;
mod reader;
mod sink;
mod writer;

pub use convert::{convert_csv, CsvOptions};
pub use encoding::{writer_properties, VERSION_METADATA_KEY};
pub use error::{ErrorCode, Result, WriterError};
pub use reader::{is_columnar_file, read_schema, ColumnarReader};
pub use writer::{write_file, write_new_file, ColumnarWriter, WriteSummary};

// Re-export commonly used crates for convenience
pub use colfile_config;
pub use colfile_core;
