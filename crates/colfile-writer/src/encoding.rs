use colfile_config::{Compression as CompressionSetting, StatisticsLevel, WriterSettings};
use parquet::basic::{Compression, ZstdLevel};
use parquet::file::properties::{EnabledStatistics, WriterProperties};
use parquet::format::KeyValue;

use crate::error::{Result, WriterError};

/// Key under which the producing library version is recorded in the footer
pub const VERSION_METADATA_KEY: &str = "colfile.version";

fn compression_setting(settings: &WriterSettings) -> Result<Compression> {
    Ok(match settings.compression {
        CompressionSetting::None => Compression::UNCOMPRESSED,
        CompressionSetting::Snappy => Compression::SNAPPY,
        CompressionSetting::Zstd => {
            let level = ZstdLevel::try_new(settings.zstd_level).map_err(|e| {
                WriterError::invalid_config(format!(
                    "zstd_level {} rejected: {}",
                    settings.zstd_level, e
                ))
            })?;
            Compression::ZSTD(level)
        }
    })
}

fn statistics_setting(level: StatisticsLevel) -> EnabledStatistics {
    match level {
        StatisticsLevel::None => EnabledStatistics::None,
        StatisticsLevel::Chunk => EnabledStatistics::Chunk,
        StatisticsLevel::Page => EnabledStatistics::Page,
    }
}

/// Build writer properties from settings
///
/// - Compression and statistics level as configured
/// - Dictionary encoding unless disabled
/// - Row groups capped at `max_row_group_size` rows
/// - Library version embedded in the key/value metadata
pub fn writer_properties(settings: &WriterSettings) -> Result<WriterProperties> {
    if settings.max_row_group_size == 0 {
        return Err(WriterError::invalid_config(
            "max_row_group_size must be greater than 0",
        ));
    }

    let metadata = vec![KeyValue {
        key: VERSION_METADATA_KEY.to_string(),
        value: Some(env!("CARGO_PKG_VERSION").to_string()),
    }];

    let mut builder = WriterProperties::builder()
        .set_dictionary_enabled(settings.dictionary_enabled)
        .set_statistics_enabled(statistics_setting(settings.statistics))
        .set_compression(compression_setting(settings)?)
        .set_data_page_size_limit(settings.data_page_size_limit)
        .set_max_row_group_size(settings.max_row_group_size)
        .set_key_value_metadata(Some(metadata));

    if let Some(created_by) = &settings.created_by {
        builder = builder.set_created_by(created_by.clone());
    }

    Ok(builder.build())
}
