use thiserror::Error;

pub const DEFAULT_LINES_PER_RECORD: usize = 4;

/// 64KB raw reads from the input stream
pub const DEFAULT_BUFFER_SIZE: usize = 1024 * 64;

// Values such as 5 or 30 bytes are accepted by the algorithm but make no sense
pub const MIN_BUFFER_SIZE: usize = 1024;

// Speed is more important than file size when splitting
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 1;

/// Extra threads only pay off with compression levels above 1
pub const DEFAULT_THREADS_PER_FILE: u32 = 1;

pub const DEFAULT_SUFFIX: &str = ".fastq.gz";
pub const DEFAULT_CHUNK_PREFIX: &str = "split.";

pub const DEFAULT_OUTPUT_BUFFER_SIZE: usize = 1024 * 1024;
pub const DEFAULT_INPUT_BUFFER_SIZE: usize = 1024 * 128;

/// How many lines are pulled after a buffer to reach the next record boundary
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum CompletionMode {
    /// Zero lines when the buffer already ends on a record boundary
    #[default]
    Exact,
    /// Always `L - newlines % L` lines, so a boundary-aligned buffer pulls one more whole record
    FullRecordOnAlignedBuffer,
}

#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum ConfigError {
    #[error("The number of lines per record should be at least 1.")]
    ZeroLinesPerRecord,

    #[error("The buffer size should be at least {min}, got {size}.")]
    BufferTooSmall { size: usize, min: usize },

    #[error("The number of output files should be at least 1.")]
    NoOutputs,

    #[error("Maximum size {max_size} should be larger than buffer size {buffer_size}.")]
    MaxSizeBelowBuffer { max_size: u64, buffer_size: usize },

    #[error("The number of threads per file should be at least 1.")]
    ZeroThreads,
}

/// Parameters shared by both splitting modes. Built once and passed by reference
/// to every component, validated before any file is touched.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SplitterConfig {
    pub lines_per_record: usize,
    pub buffer_size: usize,
    pub compression_level: u32,
    pub threads_per_file: u32,
    pub completion_mode: CompletionMode,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            lines_per_record: DEFAULT_LINES_PER_RECORD,
            buffer_size: DEFAULT_BUFFER_SIZE,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            threads_per_file: DEFAULT_THREADS_PER_FILE,
            completion_mode: CompletionMode::Exact,
        }
    }
}

impl SplitterConfig {
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    pub fn with_lines_per_record(mut self, lines_per_record: usize) -> Self {
        self.lines_per_record = lines_per_record;
        self
    }

    pub fn with_compression(mut self, level: u32, threads_per_file: u32) -> Self {
        self.compression_level = level;
        self.threads_per_file = threads_per_file;
        self
    }

    pub fn with_completion_mode(mut self, mode: CompletionMode) -> Self {
        self.completion_mode = mode;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lines_per_record < 1 {
            return Err(ConfigError::ZeroLinesPerRecord);
        }
        if self.buffer_size < MIN_BUFFER_SIZE {
            return Err(ConfigError::BufferTooSmall {
                size: self.buffer_size,
                min: MIN_BUFFER_SIZE,
            });
        }
        if self.threads_per_file < 1 {
            return Err(ConfigError::ZeroThreads);
        }
        Ok(())
    }

    pub fn validate_outputs(&self, outputs_count: usize) -> Result<(), ConfigError> {
        self.validate()?;
        if outputs_count < 1 {
            return Err(ConfigError::NoOutputs);
        }
        Ok(())
    }

    pub fn validate_max_size(&self, max_size: u64) -> Result<(), ConfigError> {
        self.validate()?;
        if max_size < self.buffer_size as u64 {
            return Err(ConfigError::MaxSizeBelowBuffer {
                max_size,
                buffer_size: self.buffer_size,
            });
        }
        Ok(())
    }
}
