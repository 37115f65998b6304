use config::ConfigError;
use io::SinkError;
use std::io as stdio;
use std::path::PathBuf;
use thiserror::Error;

pub type SplitResult<T> = Result<T, SplitError>;

#[derive(Debug, Error)]
pub enum SplitError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Cannot read input '{input}': {source}")]
    Input {
        input: String,
        #[source]
        source: stdio::Error,
    },

    /// Read failure inside a splitter, before the input name is attached
    #[error("Error while reading the input stream: {0}")]
    Read(#[source] stdio::Error),

    /// Write failure inside a splitter, `index` is the position of the output
    #[error("Error while writing output #{index}: {source}")]
    Write {
        index: usize,
        #[source]
        source: stdio::Error,
    },

    #[error(transparent)]
    Sink(#[from] SinkError),
}

impl SplitError {
    pub(crate) fn write(index: usize) -> impl FnOnce(stdio::Error) -> Self {
        move |source| SplitError::Write { index, source }
    }

    pub(crate) fn at_output(self, index: usize) -> Self {
        match self {
            SplitError::Write { source, .. } => SplitError::Write { index, source },
            other => other,
        }
    }

    /// Attaches file names to errors raised by the stream-level splitters
    pub(crate) fn with_names(
        self,
        input: &str,
        output: impl FnOnce(usize) -> Option<PathBuf>,
    ) -> Self {
        match self {
            SplitError::Read(source) => SplitError::Input {
                input: input.to_string(),
                source,
            },
            SplitError::Write { index, source } => match output(index) {
                Some(path) => SplitError::Sink(SinkError::write(path, source)),
                None => SplitError::Write { index, source },
            },
            other => other,
        }
    }
}
