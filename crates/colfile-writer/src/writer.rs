// Columnar file writer
//
// One writer owns one file and one schema. Each append becomes one or more
// row groups; the footer is written exactly once, at close or drop.

use arrow::record_batch::RecordBatch;
use colfile_config::WriterSettings;
use colfile_core::{Schema, Table};
use parquet::arrow::ArrowWriter;
use parquet::errors::Result as ParquetResult;
use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::encoding::writer_properties;
use crate::error::{Result, WriterError};
use crate::sink::HashingWriter;

/// What `close()` reports about a finalized file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteSummary {
    pub path: PathBuf,
    pub row_groups: usize,
    pub rows: u64,
    pub bytes: u64,
    /// BLAKE3 hash of the complete file
    pub content_hash: [u8; 32],
}

impl WriteSummary {
    pub fn hash_hex(&self) -> String {
        hex::encode(self.content_hash)
    }
}

enum State {
    Open(Box<ArrowWriter<HashingWriter>>),
    Poisoned,
    Closed,
}

/// Writes tables to a single Parquet file, one row group per append
pub struct ColumnarWriter {
    path: PathBuf,
    schema: Schema,
    max_row_group_size: usize,
    state: State,
    rows_written: u64,
    row_groups_written: usize,
}

impl ColumnarWriter {
    /// Create (or truncate) `path` and start a file with `schema`
    pub fn create(path: impl AsRef<Path>, schema: Schema, settings: &WriterSettings) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).map_err(|e| WriterError::io(&path, e))?;
        Self::start(path, file, schema, settings)
    }

    /// Like `create`, but fails with `TargetExists` if `path` already exists
    ///
    /// The existence check and the creation are one atomic open.
    pub fn create_new(
        path: impl AsRef<Path>,
        schema: Schema,
        settings: &WriterSettings,
    ) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => WriterError::target_exists(&path),
                _ => WriterError::io(&path, e),
            })?;
        Self::start(path, file, schema, settings)
    }

    fn start(path: PathBuf, file: File, schema: Schema, settings: &WriterSettings) -> Result<Self> {
        let properties = writer_properties(settings)?;
        let writer = ArrowWriter::try_new(
            HashingWriter::new(file),
            schema.arrow_schema(),
            Some(properties),
        )
        .map_err(|e| WriterError::parquet(&path, e))?;

        debug!(path = %path.display(), columns = schema.len(), "Created columnar writer");

        Ok(Self {
            path,
            schema,
            max_row_group_size: settings.max_row_group_size,
            state: State::Open(Box::new(writer)),
            rows_written: 0,
            row_groups_written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    pub fn row_groups_written(&self) -> usize {
        self.row_groups_written
    }

    pub fn is_poisoned(&self) -> bool {
        matches!(self.state, State::Poisoned)
    }

    /// Append `table` as a new row group
    ///
    /// The table's schema must equal the writer's schema exactly; a mismatch
    /// is rejected before anything is written and leaves the writer usable.
    /// Tables longer than `max_row_group_size` are split into consecutive row
    /// groups. A zero-row table writes nothing.
    ///
    /// Any encoding or I/O failure poisons the writer.
    pub fn append(&mut self, table: &Table) -> Result<()> {
        let writer = match &mut self.state {
            State::Open(writer) => writer,
            State::Poisoned | State::Closed => return Err(WriterError::poisoned(&self.path)),
        };

        if let Some(details) = self.schema.difference(table.schema()) {
            return Err(WriterError::schema_mismatch(&self.path, details));
        }

        if table.is_empty() {
            debug!(path = %self.path.display(), "Skipping empty table");
            return Ok(());
        }

        let batch = table.to_record_batch()?;

        match write_row_groups(writer, &batch, self.max_row_group_size) {
            Ok(flushed) => {
                debug!(
                    path = %self.path.display(),
                    rows = batch.num_rows(),
                    row_groups = flushed - self.row_groups_written,
                    "Appended row group"
                );
                self.rows_written += batch.num_rows() as u64;
                self.row_groups_written = flushed;
                Ok(())
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Write failed, poisoning writer");
                self.state = State::Poisoned;
                Err(WriterError::parquet(&self.path, e))
            }
        }
    }

    /// Flush remaining data, write the footer and release the file
    pub fn close(mut self) -> Result<WriteSummary> {
        self.finish()
    }

    fn finish(&mut self) -> Result<WriteSummary> {
        let writer = match std::mem::replace(&mut self.state, State::Closed) {
            State::Open(writer) => writer,
            State::Poisoned | State::Closed => return Err(WriterError::poisoned(&self.path)),
        };

        let sink = (*writer)
            .into_inner()
            .map_err(|e| WriterError::parquet(&self.path, e))?;
        let (bytes, hash) = sink.finish().map_err(|e| WriterError::io(&self.path, e))?;

        let summary = WriteSummary {
            path: self.path.clone(),
            row_groups: self.row_groups_written,
            rows: self.rows_written,
            bytes,
            content_hash: *hash.as_bytes(),
        };

        info!(
            path = %summary.path.display(),
            row_groups = summary.row_groups,
            rows = summary.rows,
            bytes = summary.bytes,
            hash = %summary.hash_hex(),
            "Wrote columnar file"
        );

        Ok(summary)
    }
}

impl Drop for ColumnarWriter {
    fn drop(&mut self) {
        if self.is_poisoned() {
            warn!(path = %self.path.display(), "Dropping poisoned writer; file left unfinalized");
        } else if matches!(self.state, State::Open(_)) {
            if let Err(e) = self.finish() {
                warn!(path = %self.path.display(), error = %e, "Failed to finalize file on drop");
            }
        }
    }
}

/// Write `batch` in slices of at most `max_rows`, one row group each.
/// Returns the total number of row groups flushed so far.
fn write_row_groups(
    writer: &mut ArrowWriter<HashingWriter>,
    batch: &RecordBatch,
    max_rows: usize,
) -> ParquetResult<usize> {
    let total = batch.num_rows();
    let mut offset = 0;
    while offset < total {
        let len = max_rows.min(total - offset);
        writer.write(&batch.slice(offset, len))?;
        writer.flush()?;
        offset += len;
    }
    Ok(writer.flushed_row_groups().len())
}

/// Create a writer, hand it to `f`, and close it whatever `f` returns
///
/// If `f` fails, the file is still finalized (unless the writer was
/// poisoned) and `f`'s error is returned.
pub fn write_file<F>(
    path: impl AsRef<Path>,
    schema: Schema,
    settings: &WriterSettings,
    f: F,
) -> Result<WriteSummary>
where
    F: FnOnce(&mut ColumnarWriter) -> Result<()>,
{
    run_scoped(ColumnarWriter::create(path, schema, settings)?, f)
}

/// `write_file` for a target that must not exist yet
pub fn write_new_file<F>(
    path: impl AsRef<Path>,
    schema: Schema,
    settings: &WriterSettings,
    f: F,
) -> Result<WriteSummary>
where
    F: FnOnce(&mut ColumnarWriter) -> Result<()>,
{
    run_scoped(ColumnarWriter::create_new(path, schema, settings)?, f)
}

fn run_scoped<F>(mut writer: ColumnarWriter, f: F) -> Result<WriteSummary>
where
    F: FnOnce(&mut ColumnarWriter) -> Result<()>,
{
    match f(&mut writer) {
        Ok(()) => writer.close(),
        Err(e) => {
            let path = writer.path().to_path_buf();
            if let Err(close_err) = writer.close() {
                warn!(path = %path.display(), error = %close_err, "Close after failed write also failed");
            }
            Err(e)
        }
    }
}
