// Configuration validation
//
// Rejects values the writer cannot use and warns about suspicious ones

use crate::*;
use anyhow::{bail, Result};
use tracing::warn;

/// Range accepted by the zstd codec
const ZSTD_LEVELS: std::ops::RangeInclusive<i32> = 1..=22;

pub fn validate_config(config: &ColfileConfig) -> Result<()> {
    validate_writer_settings(&config.writer)?;
    validate_csv_settings(&config.csv)?;
    Ok(())
}

fn validate_writer_settings(config: &WriterSettings) -> Result<()> {
    if config.max_row_group_size == 0 {
        bail!("writer.max_row_group_size must be greater than 0");
    }

    if config.data_page_size_limit == 0 {
        bail!("writer.data_page_size_limit must be greater than 0");
    }

    if config.compression == Compression::Zstd && !ZSTD_LEVELS.contains(&config.zstd_level) {
        bail!(
            "writer.zstd_level must be between {} and {}, got {}",
            ZSTD_LEVELS.start(),
            ZSTD_LEVELS.end(),
            config.zstd_level
        );
    }

    if config.max_row_group_size > 64 * 1024 * 1024 {
        warn!(
            max_row_group_size = config.max_row_group_size,
            "writer.max_row_group_size is very large; row groups are buffered in memory"
        );
    }

    Ok(())
}

fn validate_csv_settings(config: &CsvSettings) -> Result<()> {
    if config.rows_per_group == 0 {
        bail!("csv.rows_per_group must be greater than 0");
    }

    if !config.delimiter.is_ascii() {
        bail!("csv.delimiter must be an ASCII character");
    }

    if config.delimiter == '"' || config.delimiter == '\n' || config.delimiter == '\r' {
        bail!("csv.delimiter cannot be a quote or line terminator");
    }

    Ok(())
}
