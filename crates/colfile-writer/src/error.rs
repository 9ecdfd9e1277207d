//! Error types for the writer crate

use colfile_core::TableError;
use parquet::errors::ParquetError;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error codes for programmatic handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// E001: Row group schema differs from the file schema
    E001SchemaMismatch,
    /// E002: Table could not be built or converted
    E002InvalidTable,
    /// E003: Target path could not be created, written, read or closed
    E003Io,
    /// E004: Configuration missing or invalid
    E004InvalidConfig,
    /// E005: Encoding or decoding a row group failed
    E005WriteFailure,
    /// E006: Writer refused work after an earlier failure
    E006Poisoned,
    /// E007: Conversion target already exists
    E007TargetExists,
    /// E008: CSV input could not be parsed
    E008InvalidCsv,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::E001SchemaMismatch => "E001",
            Self::E002InvalidTable => "E002",
            Self::E003Io => "E003",
            Self::E004InvalidConfig => "E004",
            Self::E005WriteFailure => "E005",
            Self::E006Poisoned => "E006",
            Self::E007TargetExists => "E007",
            Self::E008InvalidCsv => "E008",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur while writing, reading or converting files
#[derive(Debug, Error)]
pub enum WriterError {
    /// Appended table does not have the writer's schema
    #[error("[{code}] Schema mismatch writing '{}': {details}", .path.display())]
    SchemaMismatch {
        code: &'static str,
        path: PathBuf,
        details: String,
    },

    /// Building or converting a table failed, including column length mismatches
    #[error("[E002] {0}")]
    Table(#[from] TableError),

    /// File system failure on a specific path
    #[error("[{code}] I/O error on '{}': {source}", .path.display())]
    Io {
        code: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration provided
    #[error("[{code}] Invalid configuration: {message}")]
    InvalidConfig { code: &'static str, message: String },

    /// Parquet encoding, decoding or footer failure
    #[error("[{code}] Parquet operation failed on '{}': {source}", .path.display())]
    Parquet {
        code: &'static str,
        path: PathBuf,
        #[source]
        source: ParquetError,
    },

    /// The writer hit an earlier failure; its file is never finalized
    #[error("[{code}] Writer for '{}' is poisoned by an earlier failure", .path.display())]
    Poisoned { code: &'static str, path: PathBuf },

    /// CSV conversion refuses to overwrite an existing file
    #[error("[{code}] Target '{}' already exists", .path.display())]
    TargetExists { code: &'static str, path: PathBuf },

    /// CSV record or cell could not be parsed
    #[error("[{code}] Invalid CSV at line {line}: {message}")]
    InvalidCsv {
        code: &'static str,
        line: u64,
        message: String,
    },

    /// Row group index past the end of the file
    #[error("row group {index} out of range: file has {count} row groups")]
    RowGroupOutOfRange { index: usize, count: usize },
}

impl WriterError {
    /// Create a schema mismatch error with error code
    pub fn schema_mismatch(path: &Path, details: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            code: ErrorCode::E001SchemaMismatch.as_str(),
            path: path.to_path_buf(),
            details: details.into(),
        }
    }

    /// Create an I/O error bound to the path it happened on
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            code: ErrorCode::E003Io.as_str(),
            path: path.to_path_buf(),
            source,
        }
    }

    /// Create an invalid config error with error code
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            code: ErrorCode::E004InvalidConfig.as_str(),
            message: message.into(),
        }
    }

    /// Create a parquet failure bound to the file it happened on
    pub fn parquet(path: &Path, source: ParquetError) -> Self {
        Self::Parquet {
            code: ErrorCode::E005WriteFailure.as_str(),
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn poisoned(path: &Path) -> Self {
        Self::Poisoned {
            code: ErrorCode::E006Poisoned.as_str(),
            path: path.to_path_buf(),
        }
    }

    pub fn target_exists(path: &Path) -> Self {
        Self::TargetExists {
            code: ErrorCode::E007TargetExists.as_str(),
            path: path.to_path_buf(),
        }
    }

    /// Create a CSV error; `line` is 1-based
    pub fn invalid_csv(line: u64, message: impl Into<String>) -> Self {
        Self::InvalidCsv {
            code: ErrorCode::E008InvalidCsv.as_str(),
            line,
            message: message.into(),
        }
    }

    /// Error code for programmatic handling, if this error carries one
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::SchemaMismatch { .. } => Some(ErrorCode::E001SchemaMismatch),
            Self::Table(_) => Some(ErrorCode::E002InvalidTable),
            Self::Io { .. } => Some(ErrorCode::E003Io),
            Self::InvalidConfig { .. } => Some(ErrorCode::E004InvalidConfig),
            Self::Parquet { .. } => Some(ErrorCode::E005WriteFailure),
            Self::Poisoned { .. } => Some(ErrorCode::E006Poisoned),
            Self::TargetExists { .. } => Some(ErrorCode::E007TargetExists),
            Self::InvalidCsv { .. } => Some(ErrorCode::E008InvalidCsv),
            Self::RowGroupOutOfRange { .. } => None,
        }
    }
}

/// Result type alias for WriterError
pub type Result<T> = std::result::Result<T, WriterError>;
