mod utils;

use crate::utils::parse_size;
use anyhow::Context;
use backtrace::Backtrace;
use config::{CompletionMode, SplitterConfig, DEFAULT_CHUNK_PREFIX};
use fastqsplitter_api::{chunk_fastqs, split_fastqs, InputSource, MessageLevel};
use fastqsplitter_logging::stats::write_stats;
use fastqsplitter_logging::UnrecoverableErrorLogging;
use std::panic;
use std::path::PathBuf;
use std::process::exit;
use structopt::clap::ArgGroup;
use structopt::StructOpt;

#[derive(StructOpt, Debug)]
#[structopt(
    name = "fastqsplitter",
    about = "Splits a FASTQ file into several files, keeping records whole",
    group = ArgGroup::with_name("split-mode").required(true)
)]
struct SplitterArgs {
    /// The FASTQ file to split, standard input when missing or '-'
    #[structopt(parse(from_os_str))]
    input: Option<PathBuf>,

    /// Prefix of the generated output files (default: the input name without extensions)
    #[structopt(short = "p", long)]
    prefix: Option<String>,

    /// Suffix of the generated output files. The extension selects the compression:
    /// '.gz' gzip, '.bz2' bzip2, '.xz' xz, '.lz4' lz4, anything else none
    #[structopt(short = "s", long, default_value = ".fastq.gz")]
    suffix: String,

    /// Number of output files to split over, records are distributed round-robin
    #[structopt(short = "n", long, group = "split-mode")]
    number: Option<usize>,

    /// Scatter over these output files, round-robin. Can be given multiple times
    #[structopt(
        short = "o",
        long = "output",
        parse(from_os_str),
        number_of_values = 1,
        group = "split-mode"
    )]
    output: Vec<PathBuf>,

    /// Split in chunks of this size before compression. Accepts the suffixes K, M and G
    #[structopt(
        short = "m",
        long = "max-size",
        parse(try_from_str = parse_size),
        group = "split-mode"
    )]
    max_size: Option<u64>,

    /// Compression level of the output files
    #[structopt(short = "c", long = "compression-level", default_value = "1")]
    compression_level: u32,

    /// Compression threads per output file, only used by xz
    #[structopt(short = "t", long = "threads-per-file", default_value = "1")]
    threads_per_file: u32,

    /// Path of an optional json file with the statistics of the run
    #[structopt(long = "stats-file", parse(from_os_str))]
    stats_file: Option<PathBuf>,

    /// Only print warnings and errors
    #[structopt(short = "q", long)]
    quiet: bool,

    #[structopt(short = "b", long = "buffer-size", default_value = "65536", hidden = true)]
    buffer_size: usize,

    /// Always complete a full extra record when a buffer ends on a record boundary
    #[structopt(long = "legacy-completion", hidden = true)]
    legacy_completion: bool,
}

impl SplitterArgs {
    fn splitter_config(&self) -> SplitterConfig {
        let completion_mode = if self.legacy_completion {
            CompletionMode::FullRecordOnAlignedBuffer
        } else {
            CompletionMode::Exact
        };

        SplitterConfig::default()
            .with_buffer_size(self.buffer_size)
            .with_compression(self.compression_level, self.threads_per_file)
            .with_completion_mode(completion_mode)
    }

    fn output_prefix(&self, input: &InputSource) -> String {
        match &self.prefix {
            Some(prefix) => prefix.clone(),
            None => io::default_prefix(input.path(), DEFAULT_CHUNK_PREFIX),
        }
    }
}

fn print_warnings_only(level: MessageLevel, message: &str) {
    if level != MessageLevel::Info {
        fastqsplitter_logging::print_message(level, message);
    }
}

fn run(args: SplitterArgs) -> anyhow::Result<()> {
    let config = args.splitter_config();
    config.validate()?;

    let input = InputSource::from_arg(args.input.as_deref());
    let prefix = args.output_prefix(&input);

    let stats = match args.max_size {
        Some(max_size) => chunk_fastqs(&input, max_size, &prefix, &args.suffix, &config)?,
        None => {
            let outputs = match args.number {
                Some(number) => io::generate_output_names(&prefix, number, &args.suffix),
                None => args.output.clone(),
            };
            split_fastqs(&input, &outputs, &config)?
        }
    };

    if let Some(stats_file) = &args.stats_file {
        write_stats(stats_file, &stats)
            .with_context(|| format!("Cannot write stats file '{}'", stats_file.display()))?;
    }

    Ok(())
}

fn main() {
    let args = SplitterArgs::from_args();
    if args.quiet {
        fastqsplitter_logging::setup_logging_callback(print_warnings_only);
    }

    panic::set_hook(Box::new(move |info| {
        if let Some(location) = info.location() {
            eprintln!("Thread panicked at location: {}", location);
        }
        if let Some(s) = info.payload().downcast_ref::<&str>() {
            eprintln!("Panic payload: {:?}", s);
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            eprintln!("Panic payload: {:?}", s);
        }

        eprintln!("Backtrace: {:?}", Backtrace::new());

        exit(1);
    }));

    if run(args).log_unrecoverable_error("Splitting failed").is_err() {
        exit(1);
    }
}
