use std::fs::File;
use std::io::{self, BufWriter, Write};

/// Buffered file sink that hashes every byte it accepts
pub(crate) struct HashingWriter {
    inner: BufWriter<File>,
    hasher: blake3::Hasher,
    bytes_written: u64,
}

impl HashingWriter {
    pub(crate) fn new(file: File) -> Self {
        Self {
            inner: BufWriter::new(file),
            hasher: blake3::Hasher::new(),
            bytes_written: 0,
        }
    }

    /// Flush and sync the file, returning its size and content hash
    pub(crate) fn finish(self) -> io::Result<(u64, blake3::Hash)> {
        let file = self.inner.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        Ok((self.bytes_written, self.hasher.finalize()))
    }
}

impl Write for HashingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.hasher.update(&buf[..n]);
        self.bytes_written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_matches_file_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.bin");

        let mut sink = HashingWriter::new(File::create(&path).unwrap());
        sink.write_all(b"PAR1").unwrap();
        sink.write_all(b"payload").unwrap();
        let (len, hash) = sink.finish().unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(len, bytes.len() as u64);
        assert_eq!(hash, blake3::hash(&bytes));
    }
}
