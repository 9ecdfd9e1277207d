use super::{ColfileConfig, Compression, LogFormat, StatisticsLevel};
use anyhow::{anyhow, Context, Result};

pub const ENV_PREFIX: &str = "COLFILE_";

/// Abstraction over environment-variable lookups so tests can supply their
/// own source of overrides.
pub trait EnvSource {
    /// Look up `key` with the `COLFILE_` prefix applied
    fn get(&self, key: &str) -> Option<String>;
}

/// Apply environment-variable overrides (highest priority) to the config.
pub fn apply_env_overrides<E: EnvSource>(config: &mut ColfileConfig, env: &E) -> Result<()> {
    // Writer configuration
    if let Some(compression) = env.get("COMPRESSION") {
        config.writer.compression = compression
            .parse::<Compression>()
            .context("Invalid COLFILE_COMPRESSION value")?;
    }
    if let Some(level) = get_env_parsed::<E, i32>(env, "ZSTD_LEVEL")? {
        config.writer.zstd_level = level;
    }
    if let Some(size) = get_env_parsed::<E, usize>(env, "MAX_ROW_GROUP_SIZE")? {
        config.writer.max_row_group_size = size;
    }
    if let Some(size) = get_env_parsed::<E, usize>(env, "DATA_PAGE_SIZE_LIMIT")? {
        config.writer.data_page_size_limit = size;
    }
    if let Some(enabled) = get_env_parsed::<E, bool>(env, "DICTIONARY_ENABLED")? {
        config.writer.dictionary_enabled = enabled;
    }
    if let Some(level) = env.get("STATISTICS") {
        config.writer.statistics = level
            .parse::<StatisticsLevel>()
            .context("Invalid COLFILE_STATISTICS value")?;
    }
    if let Some(created_by) = env.get("CREATED_BY") {
        config.writer.created_by = Some(created_by);
    }

    // CSV conversion
    if let Some(has_header) = get_env_parsed::<E, bool>(env, "CSV_HAS_HEADER")? {
        config.csv.has_header = has_header;
    }
    if let Some(delimiter) = env.get("CSV_DELIMITER") {
        config.csv.delimiter = parse_delimiter(&delimiter)?;
    }
    if let Some(rows) = get_env_parsed::<E, usize>(env, "CSV_ROWS_PER_GROUP")? {
        config.csv.rows_per_group = rows;
    }

    // Logging
    if let Some(level) = env.get("LOG_LEVEL") {
        config.log.level = level;
    }
    if let Some(format) = env.get("LOG_FORMAT") {
        config.log.format = format
            .parse::<LogFormat>()
            .context("Invalid COLFILE_LOG_FORMAT value")?;
    }

    Ok(())
}

/// Accepts a single character, or `\t` / `tab` for tab-separated input
pub(crate) fn parse_delimiter(raw: &str) -> Result<char> {
    if raw == "\\t" || raw.eq_ignore_ascii_case("tab") {
        return Ok('\t');
    }

    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(anyhow!(
            "Invalid {}CSV_DELIMITER '{}': expected a single character",
            ENV_PREFIX,
            raw
        )),
    }
}

fn get_env_parsed<E, T>(env: &E, key: &str) -> Result<Option<T>>
where
    E: EnvSource,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env.get(key) {
        Some(val) => {
            let parsed = val
                .trim()
                .parse::<T>()
                .map_err(|e| anyhow!("Failed to parse {}{}: {}", ENV_PREFIX, key, e))?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapEnv(HashMap<&'static str, &'static str>);

    impl EnvSource for MapEnv {
        fn get(&self, key: &str) -> Option<String> {
            self.0.get(key).map(|v| v.to_string())
        }
    }

    fn env(pairs: &[(&'static str, &'static str)]) -> MapEnv {
        MapEnv(pairs.iter().copied().collect())
    }

    #[test]
    fn test_env_overrides_apply() {
        let mut config = ColfileConfig::default();
        let source = env(&[
            ("COMPRESSION", "zstd"),
            ("ZSTD_LEVEL", "7"),
            ("MAX_ROW_GROUP_SIZE", "5000"),
            ("CSV_DELIMITER", "tab"),
            ("CSV_HAS_HEADER", "true"),
            ("LOG_FORMAT", "JSON"),
            ("CREATED_BY", "fixture-gen"),
        ]);

        apply_env_overrides(&mut config, &source).unwrap();

        assert_eq!(config.writer.compression, Compression::Zstd);
        assert_eq!(config.writer.zstd_level, 7);
        assert_eq!(config.writer.max_row_group_size, 5000);
        assert_eq!(config.csv.delimiter, '\t');
        assert!(config.csv.has_header);
        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(config.writer.created_by.as_deref(), Some("fixture-gen"));
    }

    #[test]
    fn test_env_override_parse_error_names_variable() {
        let mut config = ColfileConfig::default();
        let source = env(&[("MAX_ROW_GROUP_SIZE", "lots")]);

        let err = apply_env_overrides(&mut config, &source).unwrap_err();
        assert!(err.to_string().contains("COLFILE_MAX_ROW_GROUP_SIZE"));
    }

    #[test]
    fn test_unknown_log_format_is_rejected() {
        let mut config = ColfileConfig::default();
        let source = env(&[("LOG_FORMAT", "pretty")]);

        let err = apply_env_overrides(&mut config, &source).unwrap_err();
        assert!(err.to_string().contains("COLFILE_LOG_FORMAT"));
        assert_eq!(config.log.format, LogFormat::Text);
    }

    #[test]
    fn test_no_overrides_leaves_defaults() {
        let mut config = ColfileConfig::default();
        apply_env_overrides(&mut config, &env(&[])).unwrap();
        assert_eq!(config, ColfileConfig::default());
    }

    #[test]
    fn test_parse_delimiter() {
        assert_eq!(parse_delimiter(";").unwrap(), ';');
        assert_eq!(parse_delimiter("\\t").unwrap(), '\t');
        assert!(parse_delimiter("::").is_err());
        assert!(parse_delimiter("").is_err());
    }
}
