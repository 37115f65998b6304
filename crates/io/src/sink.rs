use crate::codec::{CompressionFormat, EncodedWriter};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{action} '{}': {source}", .path.display())]
pub struct SinkError {
    pub action: &'static str,
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

impl SinkError {
    pub fn create(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self {
            action: "Cannot create output file",
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn write(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self {
            action: "Error while writing output file",
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

/// An output file open for writing. The encoder is finalized by `finish`, or on drop
/// if the sink is abandoned on an error path.
pub struct Sink {
    path: PathBuf,
    format: CompressionFormat,
    writer: Option<EncodedWriter>,
    bytes_written: u64,
}

impl Sink {
    pub fn create(path: impl AsRef<Path>, level: u32, threads: u32) -> Result<Self, SinkError> {
        let format = CompressionFormat::from_path(&path);
        let writer = EncodedWriter::create(&path, format, level, threads)
            .map_err(|e| SinkError::create(&path, e))?;

        Ok(Self {
            path: path.as_ref().to_path_buf(),
            format,
            writer: Some(writer),
            bytes_written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> CompressionFormat {
        self.format
    }

    /// Uncompressed bytes accepted so far
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn finish(mut self) -> Result<(), SinkError> {
        self.close()
    }

    fn close(&mut self) -> Result<(), SinkError> {
        match self.writer.take() {
            Some(writer) => writer.finish().map_err(|e| SinkError::write(&self.path, e)),
            None => Ok(()),
        }
    }

    fn writer(&mut self) -> io::Result<&mut EncodedWriter> {
        self.writer
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "sink already closed"))
    }
}

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.writer()?.write(buf)?;
        self.bytes_written += written as u64;
        Ok(written)
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.writer()?.write_all(buf)?;
        self.bytes_written += buf.len() as u64;
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer()?.flush()
    }
}

impl Drop for Sink {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

/// All the outputs of a round-robin split, opened together. If any of them cannot be
/// created the ones already opened are released in reverse order before the error is
/// returned, and the same happens when the set is dropped on an error path.
pub struct SinkSet {
    sinks: Vec<Sink>,
}

impl SinkSet {
    pub fn create(
        paths: &[impl AsRef<Path>],
        level: u32,
        threads: u32,
    ) -> Result<Self, SinkError> {
        let mut set = SinkSet {
            sinks: Vec::with_capacity(paths.len()),
        };
        for path in paths {
            // On failure `set` is dropped here, releasing what was opened so far
            set.sinks.push(Sink::create(path, level, threads)?);
        }
        Ok(set)
    }

    pub fn as_mut_slice(&mut self) -> &mut [Sink] {
        &mut self.sinks
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sink> {
        self.sinks.iter()
    }

    /// Finishes every sink, last opened first. All sinks are closed even when one
    /// of them fails; the first error is returned.
    pub fn finish(mut self) -> Result<(), SinkError> {
        let mut first_error = None;
        while let Some(sink) = self.sinks.pop() {
            if let Err(err) = sink.finish() {
                first_error.get_or_insert(err);
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Drop for SinkSet {
    fn drop(&mut self) {
        while let Some(sink) = self.sinks.pop() {
            drop(sink);
        }
    }
}
