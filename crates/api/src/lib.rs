pub mod boundary;
pub mod chunker;
pub mod error;
pub mod round_robin;

use crate::chunker::{chunk_stream, ChunkOutputs, ChunkTotals};
use crate::round_robin::split_round_robin;
use fastqsplitter_logging::stats::{OutputFileStats, SplitMode, SplitStats};
use fastqsplitter_logging::{info, warn};
use io::{Sink, SinkSet, StreamReader};
use std::path::PathBuf;
use std::time::Instant;

pub use crate::boundary::BoundaryCompleter;
pub use crate::error::{SplitError, SplitResult};
pub use config::{CompletionMode, ConfigError, SplitterConfig};
pub use fastqsplitter_logging::MessageLevel;
pub use io::{CompressionFormat, InputSource, SinkError};

/// Bytes and units received by one output of the round-robin splitter
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OutputTotals {
    pub bytes: u64,
    pub units: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SplitTotals {
    pub units: u64,
    pub newlines: u64,
    pub per_output: Vec<OutputTotals>,
}

impl SplitTotals {
    pub(crate) fn new(outputs_count: usize) -> Self {
        Self {
            units: 0,
            newlines: 0,
            per_output: vec![OutputTotals::default(); outputs_count],
        }
    }

    pub(crate) fn add_unit(&mut self, index: usize, bytes: usize) {
        self.units += 1;
        let output = &mut self.per_output[index];
        output.bytes += bytes as u64;
        output.units += 1;
    }

    pub fn bytes(&self) -> u64 {
        self.per_output.iter().map(|o| o.bytes).sum()
    }
}

/// Splits `input` over `output_files`, one unit at a time in rotation. Every output is
/// compressed according to its own extension.
pub fn split_fastqs(
    input: &InputSource,
    output_files: &[PathBuf],
    config: &SplitterConfig,
) -> SplitResult<SplitStats> {
    config.validate_outputs(output_files.len())?;

    let start_time = Instant::now();
    let input_name = input.to_string();
    let mut reader = StreamReader::new(io::open_reader(input).map_err(|source| {
        SplitError::Input {
            input: input_name.clone(),
            source,
        }
    })?);

    let mut sinks = SinkSet::create(
        output_files,
        config.compression_level,
        config.threads_per_file,
    )?;
    for sink in sinks.iter() {
        info!(
            "Opened output '{}', compression: {}",
            sink.path().display(),
            sink.format().name()
        );
    }
    info!(
        "Splitting '{}' over {} outputs, {} bytes per unit",
        input_name,
        output_files.len(),
        config.buffer_size
    );

    let totals = split_round_robin(&mut reader, sinks.as_mut_slice(), config)
        .map_err(|e| e.with_names(&input_name, |index| output_files.get(index).cloned()))?;
    let bytes_written: Vec<u64> = sinks.iter().map(|sink| sink.bytes_written()).collect();
    sinks.finish()?;

    check_input_shape(&input_name, &reader, totals.newlines, config);

    let mut stats = SplitStats::new(
        SplitMode::RoundRobin,
        input_name,
        config.buffer_size,
        config.lines_per_record,
    );
    stats.total_bytes = reader.bytes_read();
    stats.total_newlines = totals.newlines;
    stats.total_units = totals.units;
    stats.outputs = output_files
        .iter()
        .zip(bytes_written)
        .zip(totals.per_output.iter())
        .map(|((path, bytes_written), output)| OutputFileStats {
            file_name: path.clone(),
            bytes_written,
            units_written: output.units,
        })
        .collect();
    stats.elapsed = start_time.elapsed().into();

    info!(
        "Wrote {} bytes in {} units, elapsed {:?}",
        stats.total_bytes, stats.total_units, stats.elapsed
    );
    Ok(stats)
}

/// Opens the chunk files on demand as `prefix + group + suffix`
struct FileChunkOutputs<'a> {
    prefix: &'a str,
    suffix: &'a str,
    config: &'a SplitterConfig,
    created: Vec<OutputFileStats>,
}

impl ChunkOutputs for FileChunkOutputs<'_> {
    type Output = Sink;

    fn open(&mut self, group_number: usize) -> SplitResult<Sink> {
        let path = io::chunk_file_name(self.prefix, group_number, self.suffix);
        let sink = Sink::create(
            &path,
            self.config.compression_level,
            self.config.threads_per_file,
        )?;
        info!(
            "Writing chunk '{}', compression: {}",
            path.display(),
            sink.format().name()
        );
        Ok(sink)
    }

    fn close(
        &mut self,
        _group_number: usize,
        output: Sink,
        totals: &ChunkTotals,
    ) -> SplitResult<()> {
        let path = output.path().to_path_buf();
        let bytes_written = output.bytes_written();
        output.finish()?;
        info!("Completed '{}' with {} bytes", path.display(), bytes_written);
        self.created.push(OutputFileStats {
            file_name: path,
            bytes_written,
            units_written: totals.buffers,
        });
        Ok(())
    }
}

/// Splits `input` into consecutive files of roughly `max_size` uncompressed bytes.
/// Files are numbered from 0 in creation order and returned in the stats outputs.
pub fn chunk_fastqs(
    input: &InputSource,
    max_size: u64,
    prefix: &str,
    suffix: &str,
    config: &SplitterConfig,
) -> SplitResult<SplitStats> {
    config.validate_max_size(max_size)?;

    let start_time = Instant::now();
    let input_name = input.to_string();
    let mut reader = StreamReader::new(io::open_reader(input).map_err(|source| {
        SplitError::Input {
            input: input_name.clone(),
            source,
        }
    })?);
    info!(
        "Chunking '{}' into files of at least {} bytes",
        input_name,
        max_size - config.buffer_size as u64
    );

    let mut outputs = FileChunkOutputs {
        prefix,
        suffix,
        config,
        created: Vec::new(),
    };
    let chunks = chunk_stream(&mut reader, &mut outputs, max_size, config).map_err(|e| {
        e.with_names(&input_name, |index| {
            Some(io::chunk_file_name(prefix, index, suffix))
        })
    })?;

    let total_newlines = chunks.iter().map(|c| c.newlines).sum::<u64>();
    check_input_shape(&input_name, &reader, total_newlines, config);

    let mut stats = SplitStats::new(
        SplitMode::Chunked,
        input_name,
        config.buffer_size,
        config.lines_per_record,
    );
    stats.total_bytes = reader.bytes_read();
    stats.total_newlines = total_newlines;
    stats.total_units = chunks.iter().map(|c| c.buffers).sum();
    stats.outputs = outputs.created;
    stats.elapsed = start_time.elapsed().into();

    info!(
        "Wrote {} bytes in {} files, elapsed {:?}",
        stats.total_bytes,
        stats.outputs.len(),
        stats.elapsed
    );
    Ok(stats)
}

fn check_input_shape<R: std::io::BufRead>(
    input_name: &str,
    reader: &StreamReader<R>,
    newlines: u64,
    config: &SplitterConfig,
) {
    if !reader.ends_with_newline() {
        warn!("Input '{}' does not end with a newline", input_name);
    }
    if newlines % config.lines_per_record as u64 != 0 {
        warn!(
            "Input '{}' has {} lines, not a multiple of {} lines per record",
            input_name, newlines, config.lines_per_record
        );
    }
}
