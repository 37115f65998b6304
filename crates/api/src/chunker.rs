use crate::boundary::BoundaryCompleter;
use crate::error::{SplitError, SplitResult};
use config::SplitterConfig;
use io::StreamReader;
use std::io::{BufRead, Write};

/// What was written into a single chunk
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ChunkTotals {
    pub bytes: u64,
    pub newlines: u64,
    /// Raw buffers read, the completion not included
    pub buffers: u64,
}

/// Destination of the successive chunks. Only one output is open at any time: it is
/// opened right before its first byte and closed once its size threshold is reached.
pub trait ChunkOutputs {
    type Output: Write;

    fn open(&mut self, group_number: usize) -> SplitResult<Self::Output>;

    fn close(
        &mut self,
        group_number: usize,
        output: Self::Output,
        totals: &ChunkTotals,
    ) -> SplitResult<()>;
}

/// Copies raw buffers into `output` until at least `max_size - buffer_size` bytes are
/// written, then completes the last record. Stops early when the stream ends.
pub fn read_chunk_to_file<R: BufRead, W: Write>(
    reader: &mut StreamReader<R>,
    output: &mut W,
    max_size: u64,
    config: &SplitterConfig,
) -> SplitResult<ChunkTotals> {
    let target_size = max_size.saturating_sub(config.buffer_size as u64);
    let mut buffer = Vec::with_capacity(config.buffer_size);
    let mut totals = ChunkTotals::default();

    loop {
        let count = reader
            .read_chunk(&mut buffer, config.buffer_size)
            .map_err(SplitError::Read)?;
        if count == 0 {
            return Ok(totals);
        }

        output.write_all(&buffer).map_err(SplitError::write(0))?;
        totals.newlines += io::count_newlines(&buffer) as u64;
        totals.bytes += count as u64;
        totals.buffers += 1;

        if totals.bytes >= target_size {
            let mut completion = Vec::new();
            BoundaryCompleter::from_config(config).complete_after(
                reader,
                totals.newlines,
                buffer.last(),
                &mut completion,
            )?;
            output.write_all(&completion).map_err(SplitError::write(0))?;
            totals.newlines += io::count_newlines(&completion) as u64;
            totals.bytes += completion.len() as u64;
            return Ok(totals);
        }
    }
}

/// Fills successive outputs from `reader` until it is exhausted. Returns the totals of
/// every chunk, in creation order.
pub fn chunk_stream<R: BufRead, O: ChunkOutputs>(
    reader: &mut StreamReader<R>,
    outputs: &mut O,
    max_size: u64,
    config: &SplitterConfig,
) -> SplitResult<Vec<ChunkTotals>> {
    config.validate_max_size(max_size)?;

    let mut chunks = Vec::new();
    let mut group_number = 0;

    while !reader.peek_empty().map_err(SplitError::Read)? {
        let mut output = outputs.open(group_number)?;
        let totals = read_chunk_to_file(reader, &mut output, max_size, config)
            .map_err(|e| e.at_output(group_number))?;
        outputs.close(group_number, output, &totals)?;

        chunks.push(totals);
        group_number += 1;
    }

    Ok(chunks)
}
