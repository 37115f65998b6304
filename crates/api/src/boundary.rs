use crate::error::{SplitError, SplitResult};
use config::{CompletionMode, SplitterConfig};
use io::StreamReader;
use std::io::BufRead;

/// Computes and fetches the whole lines that bring a raw buffer to the next record
/// boundary.
#[derive(Copy, Clone, Debug)]
pub struct BoundaryCompleter {
    lines_per_record: usize,
    mode: CompletionMode,
}

impl BoundaryCompleter {
    pub fn new(lines_per_record: usize, mode: CompletionMode) -> Self {
        assert!(lines_per_record > 0);
        Self {
            lines_per_record,
            mode,
        }
    }

    pub fn from_config(config: &SplitterConfig) -> Self {
        Self::new(config.lines_per_record, config.completion_mode)
    }

    /// Lines still to read after data holding `newline_count` newlines. When the data
    /// does not end with a newline, the unfinished line is the first one to complete.
    pub fn missing_lines(&self, newline_count: u64, ends_with_newline: bool) -> usize {
        let remainder = (newline_count % self.lines_per_record as u64) as usize;
        match self.mode {
            CompletionMode::Exact if remainder == 0 && ends_with_newline => 0,
            _ => self.lines_per_record - remainder,
        }
    }

    /// Replaces `completion` with the lines that follow `buffer` up to the record
    /// boundary. At the end of the stream it holds whatever was left, possibly nothing.
    pub fn complete<R: BufRead>(
        &self,
        reader: &mut StreamReader<R>,
        buffer: &[u8],
        completion: &mut Vec<u8>,
    ) -> SplitResult<usize> {
        let newline_count = io::count_newlines(buffer) as u64;
        self.complete_after(reader, newline_count, buffer.last(), completion)
    }

    /// Same as `complete`, for data already counted: `newline_count` newlines in total
    /// and `last_byte` as the final byte written.
    pub fn complete_after<R: BufRead>(
        &self,
        reader: &mut StreamReader<R>,
        newline_count: u64,
        last_byte: Option<&u8>,
        completion: &mut Vec<u8>,
    ) -> SplitResult<usize> {
        completion.clear();
        let ends_with_newline = last_byte.map_or(true, |&b| b == b'\n');
        let missing = self.missing_lines(newline_count, ends_with_newline);
        reader
            .read_lines(completion, missing)
            .map_err(SplitError::Read)
    }
}
