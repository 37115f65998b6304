use fastqsplitter_api::{
    chunk_fastqs, split_fastqs, ConfigError, InputSource, SplitError, SplitterConfig,
};
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn fastq(seed: u64, records: usize) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut data = Vec::new();
    for i in 0..records {
        let length = rng.gen_range(20..=150);
        let sequence: String = (0..length)
            .map(|_| ['A', 'C', 'G', 'T'][rng.gen_range(0..4)])
            .collect();
        let quality: String = (0..length).map(|_| rng.gen_range('!'..='J')).collect();
        data.extend_from_slice(format!("@read{}\n{}\n+\n{}\n", i, sequence, quality).as_bytes());
    }
    data
}

fn read_output(path: &Path) -> Vec<u8> {
    let mut data = Vec::new();
    let file = File::open(path).unwrap();
    let mut reader: Box<dyn Read> = match path.extension() {
        Some(ext) if ext == "gz" => Box::new(MultiGzDecoder::new(file)),
        _ => Box::new(file),
    };
    reader.read_to_end(&mut data).unwrap();
    data
}

fn lines(data: &[u8]) -> usize {
    data.iter().filter(|&&b| b == b'\n').count()
}

fn write_input(dir: &TempDir, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    if name.ends_with(".gz") {
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::fast());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap();
    } else {
        fs::write(&path, data).unwrap();
    }
    path
}

fn dir_entries(dir: &TempDir) -> Vec<PathBuf> {
    let mut entries: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    entries.sort();
    entries
}

fn config() -> SplitterConfig {
    SplitterConfig::default().with_buffer_size(4096)
}

#[test]
fn round_robin_into_gzip_outputs() {
    let dir = TempDir::new().unwrap();
    let data = fastq(1, 3000);
    let input = write_input(&dir, "reads.fastq", &data);
    let outputs = io::generate_output_names(
        &format!("{}/reads.", dir.path().display()),
        3,
        ".fastq.gz",
    );

    let stats = split_fastqs(&InputSource::Path(input), &outputs, &config()).unwrap();

    let units: u64 = stats.outputs.iter().map(|o| o.units_written).sum();
    assert_eq!(stats.total_units, units);

    let mut total = 0;
    for (output, output_stats) in outputs.iter().zip(stats.outputs.iter()) {
        let content = read_output(output);
        assert_eq!(lines(&content) % 4, 0);
        assert!(content.starts_with(b"@read"));
        assert_eq!(content.len() as u64, output_stats.bytes_written);
        assert!(output_stats.units_written > 0);
        total += content.len();
    }
    assert_eq!(total, data.len());
    assert_eq!(stats.total_bytes, data.len() as u64);
    assert_eq!(stats.total_newlines, 4 * 3000);
    assert_eq!(stats.output_paths(), outputs);
}

#[test]
fn outputs_follow_the_given_order() {
    let dir = TempDir::new().unwrap();
    let data = fastq(2, 2000);
    let input = write_input(&dir, "reads.fq.gz", &data);
    let outputs = vec![
        dir.path().join("z.fq"),
        dir.path().join("a.fq"),
        dir.path().join("m.fq"),
    ];

    let stats = split_fastqs(&InputSource::Path(input), &outputs, &config()).unwrap();
    assert_eq!(stats.output_paths(), outputs);

    // The first unit is the first buffer of the input, completed to a record boundary
    let first = read_output(&outputs[0]);
    assert_eq!(&first[..4096], &data[..4096]);
    let sizes: Vec<_> = outputs.iter().map(|o| read_output(o).len()).collect();
    assert!(sizes.iter().all(|&size| size > 0));
    assert_eq!(sizes.iter().sum::<usize>(), data.len());
}

#[test]
fn chunks_are_bounded_from_below() {
    let dir = TempDir::new().unwrap();
    let data = fastq(3, 4000);
    let input = write_input(&dir, "reads.fastq.gz", &data);
    let prefix = format!("{}/split.", dir.path().display());
    let max_size = 64 * 1024;

    let stats = chunk_fastqs(&InputSource::Path(input), max_size, &prefix, ".fq", &config())
        .unwrap();

    let paths = stats.output_paths();
    assert!(paths.len() > 2);
    let mut rebuilt = Vec::new();
    for (group, path) in paths.iter().enumerate() {
        assert_eq!(path, &PathBuf::from(format!("{}{}.fq", prefix, group)));
        let content = read_output(path);
        assert_eq!(lines(&content) % 4, 0);
        assert_eq!(content.len() as u64, stats.outputs[group].bytes_written);
        if group + 1 < paths.len() {
            assert!(content.len() as u64 >= max_size - 4096);
        }
        rebuilt.extend_from_slice(&content);
    }
    assert_eq!(rebuilt, data);
    let units: u64 = stats.outputs.iter().map(|o| o.units_written).sum();
    assert_eq!(stats.total_units, units);
    assert!(stats.total_units >= paths.len() as u64);
}

#[test]
fn chunks_can_be_compressed() {
    let dir = TempDir::new().unwrap();
    let data = fastq(4, 1500);
    let input = write_input(&dir, "reads.fastq", &data);
    let prefix = format!("{}/part.", dir.path().display());

    let stats = chunk_fastqs(
        &InputSource::Path(input),
        32 * 1024,
        &prefix,
        ".fastq.gz",
        &config(),
    )
    .unwrap();

    let rebuilt: Vec<u8> = stats
        .output_paths()
        .iter()
        .flat_map(|p| read_output(p))
        .collect();
    assert_eq!(rebuilt, data);
}

#[test]
fn empty_input_creates_no_chunk() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "empty.fastq", b"");
    let prefix = format!("{}/split.", dir.path().display());

    let stats =
        chunk_fastqs(&InputSource::Path(input.clone()), 8192, &prefix, ".fq", &config()).unwrap();
    assert!(stats.outputs.is_empty());
    assert_eq!(dir_entries(&dir), vec![input]);
}

#[test]
fn config_errors_come_before_any_file() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "reads.fastq", &fastq(5, 100));
    let source = InputSource::Path(input.clone());

    let err = split_fastqs(&source, &[], &config()).unwrap_err();
    assert!(matches!(err, SplitError::Config(ConfigError::NoOutputs)));

    let prefix = format!("{}/split.", dir.path().display());
    let err = chunk_fastqs(&source, 1000, &prefix, ".fq", &config()).unwrap_err();
    assert!(matches!(
        err,
        SplitError::Config(ConfigError::MaxSizeBelowBuffer { .. })
    ));

    let tiny = SplitterConfig::default().with_buffer_size(10);
    let outputs = vec![dir.path().join("out.0.fq")];
    let err = split_fastqs(&source, &outputs, &tiny).unwrap_err();
    assert!(matches!(
        err,
        SplitError::Config(ConfigError::BufferTooSmall { .. })
    ));

    assert_eq!(dir_entries(&dir), vec![input]);
}

#[test]
fn missing_input_is_reported_with_its_path() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("missing.fastq.gz");
    let outputs = vec![dir.path().join("out.0.fq")];

    let err = split_fastqs(&InputSource::Path(input), &outputs, &config()).unwrap_err();
    assert!(matches!(err, SplitError::Input { .. }));
    assert!(err.to_string().contains("missing.fastq.gz"));
    assert!(dir_entries(&dir).is_empty());
}

#[test]
fn unwritable_output_is_reported_with_its_path() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "reads.fastq", &fastq(6, 100));
    let outputs = vec![
        dir.path().join("out.0.fq"),
        dir.path().join("no_such_dir").join("out.1.fq"),
    ];

    let err = split_fastqs(&InputSource::Path(input), &outputs, &config()).unwrap_err();
    assert!(matches!(err, SplitError::Sink(_)));
    assert!(err.to_string().contains("out.1.fq"));
}

// Writes to /dev/full fail with ENOSPC once the output buffer is flushed, so each
// failing output must receive more than one buffered megabyte.
#[cfg(target_os = "linux")]
#[test]
fn full_round_robin_output_is_reported_with_its_path() {
    let dir = TempDir::new().unwrap();
    let data = fastq(7, 25_000);
    let input = write_input(&dir, "reads.fastq", &data);
    let healthy = dir.path().join("out.0.fq.gz");
    let outputs = vec![healthy.clone(), PathBuf::from("/dev/full")];

    let err = split_fastqs(&InputSource::Path(input), &outputs, &config()).unwrap_err();
    match &err {
        SplitError::Sink(sink_error) => assert_eq!(sink_error.path, Path::new("/dev/full")),
        other => panic!("unexpected error: {}", other),
    }
    assert!(err.to_string().contains("/dev/full"));

    // The other output was finalized on the error path and holds whole records
    let content = read_output(&healthy);
    assert!(content.len() > 4096);
    assert_eq!(&content[..4096], &data[..4096]);
    assert_eq!(lines(&content) % 4, 0);
}

#[cfg(target_os = "linux")]
#[test]
fn failing_chunk_keeps_the_previous_chunks_complete() {
    let dir = TempDir::new().unwrap();
    let data = fastq(8, 25_000);
    let input = write_input(&dir, "reads.fastq.gz", &data);
    let prefix = format!("{}/split.", dir.path().display());
    let failing = PathBuf::from(format!("{}1.fq", prefix));
    std::os::unix::fs::symlink("/dev/full", &failing).unwrap();

    let max_size = 2 * 1024 * 1024;
    let err = chunk_fastqs(&InputSource::Path(input), max_size, &prefix, ".fq", &config())
        .unwrap_err();
    match &err {
        SplitError::Sink(sink_error) => assert_eq!(sink_error.path, failing),
        other => panic!("unexpected error: {}", other),
    }
    assert!(err.to_string().contains("split.1.fq"));

    let first = read_output(&PathBuf::from(format!("{}0.fq", prefix)));
    assert!(first.len() as u64 >= max_size - 4096);
    assert_eq!(lines(&first) % 4, 0);
    assert_eq!(&first[..], &data[..first.len()]);
    assert!(!PathBuf::from(format!("{}2.fq", prefix)).exists());
}
