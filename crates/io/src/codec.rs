use config::{DEFAULT_INPUT_BUFFER_SIZE, DEFAULT_OUTPUT_BUFFER_SIZE};
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use lz4::{BlockMode, BlockSize, ContentChecksum};
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use xz2::stream::{Check, MtStreamBuilder};

/// Container format of a stream, chosen from the file extension only
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CompressionFormat {
    Plain,
    Gzip,
    Bzip2,
    Xz,
    Lz4,
}

impl CompressionFormat {
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        match path.as_ref().extension().and_then(|e| e.to_str()) {
            Some("gz") => Self::Gzip,
            Some("bz2") => Self::Bzip2,
            Some("xz") => Self::Xz,
            Some("lz4") => Self::Lz4,
            _ => Self::Plain,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Plain => "none",
            Self::Gzip => "gzip",
            Self::Bzip2 => "bzip2",
            Self::Xz => "xz",
            Self::Lz4 => "lz4",
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum InputSource {
    Stdin,
    Path(PathBuf),
}

impl InputSource {
    /// `-` selects the standard input
    pub fn from_arg(arg: Option<&Path>) -> Self {
        match arg {
            None => Self::Stdin,
            Some(path) if path.as_os_str() == "-" => Self::Stdin,
            Some(path) => Self::Path(path.to_path_buf()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Stdin => None,
            Self::Path(path) => Some(path),
        }
    }
}

impl Display for InputSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdin => write!(f, "<stdin>"),
            Self::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

pub fn open_reader(source: &InputSource) -> io::Result<Box<dyn BufRead>> {
    let path = match source {
        InputSource::Stdin => {
            return Ok(Box::new(BufReader::with_capacity(
                DEFAULT_INPUT_BUFFER_SIZE,
                io::stdin(),
            )))
        }
        InputSource::Path(path) => path,
    };

    let file = File::open(path)?;
    let reader: Box<dyn BufRead> = match CompressionFormat::from_path(path) {
        CompressionFormat::Plain => {
            Box::new(BufReader::with_capacity(DEFAULT_INPUT_BUFFER_SIZE, file))
        }
        CompressionFormat::Gzip => Box::new(BufReader::with_capacity(
            DEFAULT_INPUT_BUFFER_SIZE,
            MultiGzDecoder::new(file),
        )),
        CompressionFormat::Bzip2 => Box::new(BufReader::with_capacity(
            DEFAULT_INPUT_BUFFER_SIZE,
            bzip2::read::MultiBzDecoder::new(file),
        )),
        CompressionFormat::Xz => Box::new(BufReader::with_capacity(
            DEFAULT_INPUT_BUFFER_SIZE,
            xz2::read::XzDecoder::new_multi_decoder(file),
        )),
        CompressionFormat::Lz4 => Box::new(BufReader::with_capacity(
            DEFAULT_INPUT_BUFFER_SIZE,
            lz4::Decoder::new(file)?,
        )),
    };
    Ok(reader)
}

/// One encoder per output file, all of them layered over the same buffered file
pub(crate) enum EncodedWriter {
    Plain(BufWriter<File>),
    Gzip(GzEncoder<BufWriter<File>>),
    Bzip2(bzip2::write::BzEncoder<BufWriter<File>>),
    Xz(xz2::write::XzEncoder<BufWriter<File>>),
    Lz4(lz4::Encoder<BufWriter<File>>),
}

impl EncodedWriter {
    pub(crate) fn create(
        path: impl AsRef<Path>,
        format: CompressionFormat,
        level: u32,
        threads: u32,
    ) -> io::Result<Self> {
        let file = BufWriter::with_capacity(DEFAULT_OUTPUT_BUFFER_SIZE, File::create(&path)?);

        Ok(match format {
            CompressionFormat::Plain => Self::Plain(file),
            CompressionFormat::Gzip => Self::Gzip(GzEncoder::new(
                file,
                flate2::Compression::new(level.min(9)),
            )),
            CompressionFormat::Bzip2 => Self::Bzip2(bzip2::write::BzEncoder::new(
                file,
                bzip2::Compression::new(level.clamp(1, 9)),
            )),
            CompressionFormat::Xz => {
                let preset = level.min(9);
                if threads > 1 {
                    let stream = MtStreamBuilder::new()
                        .threads(threads)
                        .preset(preset)
                        .check(Check::Crc64)
                        .encoder()?;
                    Self::Xz(xz2::write::XzEncoder::new_stream(file, stream))
                } else {
                    Self::Xz(xz2::write::XzEncoder::new(file, preset))
                }
            }
            CompressionFormat::Lz4 => Self::Lz4(
                lz4::EncoderBuilder::new()
                    .level(level)
                    .checksum(ContentChecksum::ChecksumEnabled)
                    .block_mode(BlockMode::Linked)
                    .block_size(BlockSize::Max1MB)
                    .build(file)?,
            ),
        })
    }

    /// Writes the container trailer and flushes the file
    pub(crate) fn finish(self) -> io::Result<()> {
        let mut file = match self {
            Self::Plain(file) => file,
            Self::Gzip(encoder) => encoder.finish()?,
            Self::Bzip2(encoder) => encoder.finish()?,
            Self::Xz(encoder) => encoder.finish()?,
            Self::Lz4(encoder) => {
                let (file, result) = encoder.finish();
                result?;
                file
            }
        };
        file.flush()
    }
}

impl Write for EncodedWriter {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Plain(w) => w.write(buf),
            Self::Gzip(w) => w.write(buf),
            Self::Bzip2(w) => w.write(buf),
            Self::Xz(w) => w.write(buf),
            Self::Lz4(w) => w.write(buf),
        }
    }

    #[inline]
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        match self {
            Self::Plain(w) => w.write_all(buf),
            Self::Gzip(w) => w.write_all(buf),
            Self::Bzip2(w) => w.write_all(buf),
            Self::Xz(w) => w.write_all(buf),
            Self::Lz4(w) => w.write_all(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Plain(w) => w.flush(),
            Self::Gzip(w) => w.flush(),
            Self::Bzip2(w) => w.flush(),
            Self::Xz(w) => w.flush(),
            Self::Lz4(w) => w.flush(),
        }
    }
}
