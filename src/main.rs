use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colfile_config::{ColfileConfig, Compression};
use colfile_core::{ColumnType, Field};
use std::path::PathBuf;

mod commands;
mod init;

/// Write typed tables to Parquet files and inspect them
#[derive(Parser)]
#[command(name = "colfile")]
#[command(version)]
#[command(about = "Write typed tables to Parquet files and inspect them", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short = 'v', long, value_name = "LEVEL", global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write the example1/2/3 fixture files
    Fixtures {
        /// Directory to write into (created if missing)
        #[arg(short, long, value_name = "DIR", default_value = ".")]
        out_dir: PathBuf,
    },

    /// Convert a CSV file into a new Parquet file
    ConvertCsv {
        /// CSV input
        src: PathBuf,

        /// Parquet output; must not exist
        dest: PathBuf,

        /// Column as NAME:TYPE, with a trailing `?` for nullable (repeatable, in order)
        #[arg(short, long = "field", value_name = "NAME:TYPE[?]", required = true, value_parser = parse_field)]
        fields: Vec<Field>,

        /// Compression: none, snappy, zstd (overrides config file)
        #[arg(long, value_name = "CODEC")]
        compression: Option<Compression>,

        /// Skip the first line as a header row
        #[arg(long)]
        header: bool,

        /// Field delimiter (overrides config file)
        #[arg(short, long, value_name = "CHAR")]
        delimiter: Option<char>,
    },

    /// Print schema and row-group layout of a Parquet file
    Inspect {
        file: PathBuf,

        /// Also print every row as a JSON line
        #[arg(long)]
        rows: bool,
    },
}

/// Parse `name:type` or `name:type?`
fn parse_field(raw: &str) -> std::result::Result<Field, String> {
    let (name, ty) = raw
        .rsplit_once(':')
        .ok_or_else(|| format!("expected NAME:TYPE, got '{}'", raw))?;
    if name.is_empty() {
        return Err(format!("missing column name in '{}'", raw));
    }

    let (ty, nullable) = match ty.strip_suffix('?') {
        Some(stripped) => (stripped, true),
        None => (ty, false),
    };
    let column_type = ty.parse::<ColumnType>().map_err(|e| e.to_string())?;

    Ok(Field::new(name, column_type, nullable))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Step 1: Load base configuration
    let mut config = if let Some(config_path) = &cli.config {
        ColfileConfig::load_from_path(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else {
        ColfileConfig::load().context("Failed to load configuration")?
    };

    // Step 2: Apply CLI overrides (highest priority)
    apply_cli_overrides(&mut config, &cli);
    config.validate().context("Invalid configuration")?;

    init::init_tracing(&config.log);

    match cli.command {
        Command::Fixtures { out_dir } => commands::fixtures(&config, &out_dir),
        Command::ConvertCsv {
            src, dest, fields, ..
        } => commands::convert_csv(&config, &src, &dest, fields),
        Command::Inspect { file, rows } => commands::inspect(&file, rows),
    }
}

fn apply_cli_overrides(config: &mut ColfileConfig, cli: &Cli) {
    if let Some(level) = &cli.log_level {
        config.log.level = level.clone();
    }

    if let Command::ConvertCsv {
        compression,
        header,
        delimiter,
        ..
    } = &cli.command
    {
        if let Some(compression) = compression {
            config.writer.compression = *compression;
        }
        if *header {
            config.csv.has_header = true;
        }
        if let Some(delimiter) = delimiter {
            config.csv.delimiter = *delimiter;
        }
    }
}
