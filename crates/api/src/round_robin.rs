use crate::boundary::BoundaryCompleter;
use crate::error::{SplitError, SplitResult};
use crate::SplitTotals;
use config::SplitterConfig;
use io::StreamReader;
use std::io::{BufRead, Write};

/// Distributes the stream over `outputs` one unit at a time, rotating through them.
/// A unit is a raw buffer of `buffer_size` bytes plus the lines completing its last
/// record, so every output only ever receives whole records.
pub fn split_round_robin<R: BufRead, W: Write>(
    reader: &mut StreamReader<R>,
    outputs: &mut [W],
    config: &SplitterConfig,
) -> SplitResult<SplitTotals> {
    config.validate_outputs(outputs.len())?;

    let completer = BoundaryCompleter::from_config(config);
    let mut totals = SplitTotals::new(outputs.len());
    let mut buffer = Vec::with_capacity(config.buffer_size);
    let mut completion = Vec::new();
    let mut output_index = 0;

    loop {
        let count = reader
            .read_chunk(&mut buffer, config.buffer_size)
            .map_err(SplitError::Read)?;
        if count == 0 {
            return Ok(totals);
        }

        let newline_count = io::count_newlines(&buffer) as u64;
        completer.complete_after(reader, newline_count, buffer.last(), &mut completion)?;

        let output = &mut outputs[output_index];
        output
            .write_all(&buffer)
            .map_err(SplitError::write(output_index))?;
        output
            .write_all(&completion)
            .map_err(SplitError::write(output_index))?;

        totals.newlines += newline_count + io::count_newlines(&completion) as u64;
        totals.add_unit(output_index, buffer.len() + completion.len());

        output_index += 1;
        if output_index == outputs.len() {
            output_index = 0;
        }
    }
}
