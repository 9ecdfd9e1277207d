// Subcommand implementations

use anyhow::{Context, Result};
use colfile_config::ColfileConfig;
use colfile_core::{Field, Schema};
use colfile_writer::{fixtures, ColumnarReader, CsvOptions};
use std::path::Path;
use tracing::info;

pub(crate) fn fixtures(config: &ColfileConfig, out_dir: &Path) -> Result<()> {
    let summaries = fixtures::write_all(out_dir, &config.writer)
        .with_context(|| format!("Failed to write fixtures to {}", out_dir.display()))?;

    for summary in summaries {
        println!(
            "{}\t{} row groups\t{} rows\t{}",
            summary.path.display(),
            summary.row_groups,
            summary.rows,
            summary.hash_hex()
        );
    }
    Ok(())
}

pub(crate) fn convert_csv(
    config: &ColfileConfig,
    src: &Path,
    dest: &Path,
    fields: Vec<Field>,
) -> Result<()> {
    let schema = Schema::new(fields).context("Invalid --field list")?;
    let options = CsvOptions::from(&config.csv);

    info!(compression = %config.writer.compression, "Converting {}", src.display());
    let rows = colfile_writer::convert_csv(src, dest, &schema, &config.writer, &options)
        .with_context(|| format!("Failed to convert {} to {}", src.display(), dest.display()))?;

    println!("{rows}");
    Ok(())
}

pub(crate) fn inspect(file: &Path, print_rows: bool) -> Result<()> {
    let reader =
        ColumnarReader::open(file).with_context(|| format!("Failed to open {}", file.display()))?;

    println!("file: {}", file.display());
    println!("schema:");
    for field in reader.schema().fields() {
        println!("  {field}");
    }
    println!("row groups: {}", reader.num_row_groups());
    for index in 0..reader.num_row_groups() {
        println!("  {}: {} rows", index, reader.row_group_num_rows(index)?);
    }
    println!("rows: {}", reader.num_rows());

    if print_rows {
        let names: Vec<&str> = reader.schema().names().collect();
        for table in reader.read_all()? {
            for row in table.rows() {
                let object: serde_json::Map<String, serde_json::Value> = names
                    .iter()
                    .zip(row)
                    .map(|(name, value)| (name.to_string(), value.to_json()))
                    .collect();
                println!("{}", serde_json::Value::Object(object));
            }
        }
    }
    Ok(())
}
