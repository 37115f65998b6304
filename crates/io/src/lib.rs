use bstr::ByteSlice;
use std::path::{Path, PathBuf};

pub mod codec;
pub mod sink;
pub mod stream_reader;

pub use codec::{open_reader, CompressionFormat, InputSource};
pub use sink::{Sink, SinkError, SinkSet};
pub use stream_reader::StreamReader;

#[inline]
pub fn count_newlines(buffer: &[u8]) -> usize {
    buffer.find_iter(b"\n").count()
}

/// `prefix + index + suffix` for every index in `0..count`
pub fn generate_output_names(prefix: &str, count: usize, suffix: &str) -> Vec<PathBuf> {
    (0..count)
        .map(|i| chunk_file_name(prefix, i, suffix))
        .collect()
}

pub fn chunk_file_name(prefix: &str, group_number: usize, suffix: &str) -> PathBuf {
    PathBuf::from(format!("{}{}{}", prefix, group_number, suffix))
}

const COMPRESSION_EXTENSIONS: [&str; 4] = [".gz", ".bz2", ".xz", ".lz4"];
const FASTQ_EXTENSIONS: [&str; 2] = [".fastq", ".fq"];

/// Output prefix derived from the input file name: `reads.fastq.gz` gives `reads.`.
/// Without an input file (standard input) `fallback` is returned.
pub fn default_prefix(input: Option<&Path>, fallback: &str) -> String {
    let Some(file_name) = input
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
    else {
        return fallback.to_string();
    };

    let mut stem = file_name.as_str();
    for extensions in [&COMPRESSION_EXTENSIONS[..], &FASTQ_EXTENSIONS[..]] {
        if let Some(stripped) = extensions.iter().find_map(|ext| stem.strip_suffix(ext)) {
            stem = stripped;
        }
    }

    if stem.is_empty() {
        fallback.to_string()
    } else {
        format!("{}.", stem)
    }
}
