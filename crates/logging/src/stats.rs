use std::{
    fs::File,
    io::{self, BufWriter, Write},
    ops::AddAssign,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Serialize, Serializer};

#[derive(Clone, Copy, Default)]
pub struct PrintableDuration(pub Duration);

impl From<Duration> for PrintableDuration {
    fn from(duration: Duration) -> Self {
        Self(duration)
    }
}

impl AddAssign<Duration> for PrintableDuration {
    fn add_assign(&mut self, other: Duration) {
        self.0.add_assign(other);
    }
}

impl std::fmt::Debug for PrintableDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let secs = self.0.as_secs();
        let millis = self.0.subsec_millis();
        write!(f, "{}.{:03}s", secs, millis)
    }
}

impl Serialize for PrintableDuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.0.as_secs_f64())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SplitMode {
    RoundRobin,
    Chunked,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct OutputFileStats {
    pub file_name: PathBuf,
    pub bytes_written: u64,
    pub units_written: u64,
}

/// Summary of a single splitting run. A unit is one raw buffer read from the input
/// together with its completion, in both modes: `total_units` is the sum of the
/// `units_written` of the outputs.
#[derive(Clone, Debug, Serialize)]
pub struct SplitStats {
    pub mode: SplitMode,
    pub input: String,
    pub buffer_size: usize,
    pub lines_per_record: usize,
    pub elapsed: PrintableDuration,
    pub total_bytes: u64,
    pub total_newlines: u64,
    pub total_units: u64,
    pub outputs: Vec<OutputFileStats>,
}

impl SplitStats {
    pub fn new(
        mode: SplitMode,
        input: impl Into<String>,
        buffer_size: usize,
        lines_per_record: usize,
    ) -> Self {
        Self {
            mode,
            input: input.into(),
            buffer_size,
            lines_per_record,
            elapsed: PrintableDuration::default(),
            total_bytes: 0,
            total_newlines: 0,
            total_units: 0,
            outputs: Vec::new(),
        }
    }

    pub fn output_paths(&self) -> Vec<PathBuf> {
        self.outputs.iter().map(|o| o.file_name.clone()).collect()
    }
}

pub fn write_stats(output_file: &Path, stats: &SplitStats) -> io::Result<()> {
    let mut file = BufWriter::new(File::create(output_file)?);
    serde_json::to_writer_pretty(&mut file, stats)?;
    file.write_all(b"\n")?;
    file.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_serializes_as_seconds() {
        let mut duration = PrintableDuration::from(Duration::from_millis(1500));
        duration += Duration::from_millis(250);
        assert_eq!(serde_json::to_string(&duration).unwrap(), "1.75");
        assert_eq!(format!("{:?}", duration), "1.750s");
    }

    #[test]
    fn stats_are_written_as_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");

        let mut stats = SplitStats::new(SplitMode::RoundRobin, "reads.fastq", 1024, 4);
        stats.outputs.push(OutputFileStats {
            file_name: PathBuf::from("reads.0.fastq.gz"),
            bytes_written: 150,
            units_written: 2,
        });
        stats.total_bytes = 150;
        stats.total_units = 2;

        write_stats(&path, &stats).unwrap();

        let value: serde_json::Value =
            serde_json::from_reader(File::open(&path).unwrap()).unwrap();
        assert_eq!(value["mode"], "round-robin");
        assert_eq!(value["total_bytes"], 150);
        assert_eq!(value["outputs"][0]["file_name"], "reads.0.fastq.gz");
        assert_eq!(value["outputs"][0]["units_written"], 2);
        assert_eq!(value["outputs"][0]["bytes_written"], 150);
        assert_eq!(stats.output_paths(), vec![PathBuf::from("reads.0.fastq.gz")]);
    }
}
