// Read columnar files back into tables
//
// Whole row groups are materialized in memory. The footer is parsed once at
// open and reused for every row group read.

use arrow::compute::concat_batches;
use arrow::record_batch::RecordBatch;
use colfile_core::{Schema, Table};
use parquet::arrow::arrow_reader::{
    ArrowReaderMetadata, ArrowReaderOptions, ParquetRecordBatchReaderBuilder,
};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Result, WriterError};

const MAGIC: &[u8; 4] = b"PAR1";

pub struct ColumnarReader {
    path: PathBuf,
    file: File,
    metadata: ArrowReaderMetadata,
    schema: Schema,
}

impl ColumnarReader {
    /// Open `path` and parse its footer
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| WriterError::io(&path, e))?;

        let metadata = ArrowReaderMetadata::load(&file, ArrowReaderOptions::default())
            .map_err(|e| WriterError::parquet(&path, e))?;
        let schema = Schema::try_from_arrow(metadata.schema().as_ref())?;

        debug!(
            path = %path.display(),
            row_groups = metadata.metadata().num_row_groups(),
            "Opened columnar file"
        );

        Ok(Self {
            path,
            file,
            metadata,
            schema,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn num_row_groups(&self) -> usize {
        self.metadata.metadata().num_row_groups()
    }

    pub fn num_rows(&self) -> u64 {
        self.metadata.metadata().file_metadata().num_rows().max(0) as u64
    }

    pub fn row_group_num_rows(&self, index: usize) -> Result<u64> {
        self.check_index(index)?;
        let rows = self.metadata.metadata().row_group(index).num_rows();
        Ok(rows.max(0) as u64)
    }

    /// Key/value metadata stored in the footer
    pub fn key_value(&self, key: &str) -> Option<&str> {
        self.metadata
            .metadata()
            .file_metadata()
            .key_value_metadata()?
            .iter()
            .find(|kv| kv.key == key)
            .and_then(|kv| kv.value.as_deref())
    }

    /// Read one row group into a table
    pub fn read_row_group(&self, index: usize) -> Result<Table> {
        self.check_index(index)?;

        let file = self
            .file
            .try_clone()
            .map_err(|e| WriterError::io(&self.path, e))?;
        let reader = ParquetRecordBatchReaderBuilder::new_with_metadata(file, self.metadata.clone())
            .with_row_groups(vec![index])
            .build()
            .map_err(|e| WriterError::parquet(&self.path, e))?;

        let batches = reader
            .collect::<std::result::Result<Vec<RecordBatch>, _>>()
            .map_err(|e| WriterError::Table(e.into()))?;
        let batch = concat_batches(self.metadata.schema(), &batches)
            .map_err(|e| WriterError::Table(e.into()))?;

        Ok(Table::try_from_record_batch(&batch)?)
    }

    /// Read every row group, one table per group in file order
    pub fn read_all(&self) -> Result<Vec<Table>> {
        (0..self.num_row_groups())
            .map(|index| self.read_row_group(index))
            .collect()
    }

    fn check_index(&self, index: usize) -> Result<()> {
        let count = self.num_row_groups();
        if index >= count {
            return Err(WriterError::RowGroupOutOfRange { index, count });
        }
        Ok(())
    }
}

/// Read only the schema of a columnar file
pub fn read_schema(path: impl AsRef<Path>) -> Result<Schema> {
    Ok(ColumnarReader::open(path)?.schema)
}

/// Check for the `PAR1` magic at both ends of the file
pub fn is_columnar_file(path: impl AsRef<Path>) -> Result<bool> {
    let path = path.as_ref();
    let mut file = File::open(path).map_err(|e| WriterError::io(path, e))?;
    let len = file
        .metadata()
        .map_err(|e| WriterError::io(path, e))?
        .len();

    // header magic, footer length, footer magic
    if len < 12 {
        return Ok(false);
    }

    let mut head = [0u8; 4];
    let mut tail = [0u8; 4];
    file.read_exact(&mut head)
        .and_then(|_| file.seek(SeekFrom::End(-4)))
        .and_then(|_| file.read_exact(&mut tail))
        .map_err(|e| WriterError::io(path, e))?;

    Ok(&head == MAGIC && &tail == MAGIC)
}
