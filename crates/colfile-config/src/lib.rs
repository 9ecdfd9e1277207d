// colfile-config - Layered configuration for writers and tools
//
// Supports configuration from multiple sources:
// 1. Environment variables (highest priority)
// 2. Config file path from COLFILE_CONFIG env var
// 3. Config file contents from COLFILE_CONFIG_CONTENT env var
// 4. Default config file locations (./colfile.toml, ./.colfile.toml)
// 5. Built-in defaults (lowest priority)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

mod env_overrides;
mod sources;
mod validation;

pub use env_overrides::{apply_env_overrides, EnvSource, ENV_PREFIX};

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColfileConfig {
    #[serde(default)]
    pub writer: WriterSettings,

    #[serde(default)]
    pub csv: CsvSettings,

    #[serde(default)]
    pub log: LogSettings,
}

/// Parquet writer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterSettings {
    pub compression: Compression,
    /// Only used when `compression = "zstd"`
    pub zstd_level: i32,
    /// Upper bound on rows per row group; larger appends are split
    pub max_row_group_size: usize,
    pub data_page_size_limit: usize,
    pub dictionary_enabled: bool,
    pub statistics: StatisticsLevel,
    /// Written to the file footer's `created_by` field
    pub created_by: Option<String>,
}

impl Default for WriterSettings {
    fn default() -> Self {
        Self {
            compression: Compression::Snappy,
            zstd_level: 3,
            max_row_group_size: default_max_row_group_size(),
            data_page_size_limit: 1024 * 1024,
            dictionary_enabled: true,
            statistics: StatisticsLevel::Page,
            created_by: None,
        }
    }
}

fn default_max_row_group_size() -> usize {
    1_000_000
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    None,
    Snappy,
    Zstd,
}

impl std::fmt::Display for Compression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Compression::None => write!(f, "none"),
            Compression::Snappy => write!(f, "snappy"),
            Compression::Zstd => write!(f, "zstd"),
        }
    }
}

impl std::str::FromStr for Compression {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "none" | "uncompressed" => Ok(Compression::None),
            "snappy" => Ok(Compression::Snappy),
            "zstd" => Ok(Compression::Zstd),
            _ => anyhow::bail!("Unsupported compression: {}. Supported: none, snappy, zstd", s),
        }
    }
}

/// Granularity of min/max statistics written to the file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatisticsLevel {
    None,
    Chunk,
    Page,
}

impl std::str::FromStr for StatisticsLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "none" => Ok(StatisticsLevel::None),
            "chunk" => Ok(StatisticsLevel::Chunk),
            "page" => Ok(StatisticsLevel::Page),
            _ => anyhow::bail!("Unsupported statistics level: {}. Supported: none, chunk, page", s),
        }
    }
}

/// CSV conversion settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvSettings {
    /// Off by default: the first line is data and names come from the schema
    pub has_header: bool,
    pub delimiter: char,
    pub rows_per_group: usize,
}

impl Default for CsvSettings {
    fn default() -> Self {
        Self {
            has_header: false,
            delimiter: ',',
            rows_per_group: default_max_row_group_size(),
        }
    }
}

/// Logging settings for the binary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => anyhow::bail!("Unsupported log format: {}. Supported: text, json", s),
        }
    }
}

impl ColfileConfig {
    /// Load configuration from all sources with priority
    pub fn load() -> Result<Self> {
        sources::load_config()
    }

    /// Load from an explicit file (CLI `--config`), then apply env overrides
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        sources::load_from_file_path(path)
    }

    /// Parse TOML content on top of the defaults, without env overrides
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }
}
