use std::io::{self, BufRead, Read};

/// Single pass reader over a (decompressed) input stream. Hands out raw chunks of a
/// fixed size and whole lines, never rewinds.
pub struct StreamReader<R: BufRead> {
    inner: R,
    bytes_read: u64,
    last_byte: Option<u8>,
}

impl<R: BufRead> StreamReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            bytes_read: 0,
            last_byte: None,
        }
    }

    /// Replaces the content of `buffer` with up to `size` bytes. Fewer bytes are
    /// returned only when the stream ends, zero bytes means the stream is exhausted.
    pub fn read_chunk(&mut self, buffer: &mut Vec<u8>, size: usize) -> io::Result<usize> {
        buffer.clear();
        buffer.reserve(size);
        let count = (&mut self.inner).take(size as u64).read_to_end(buffer)?;
        self.track(buffer);
        Ok(count)
    }

    /// Appends the next line, newline included, to `buffer`. At the end of the stream
    /// the trailing bytes without a newline are appended, or nothing.
    pub fn read_line(&mut self, buffer: &mut Vec<u8>) -> io::Result<usize> {
        let start = buffer.len();
        let count = self.inner.read_until(b'\n', buffer)?;
        self.track(&buffer[start..]);
        Ok(count)
    }

    /// Appends up to `lines` whole lines to `buffer`, stopping early at the end of the
    /// stream. Returns the number of lines actually appended.
    pub fn read_lines(&mut self, buffer: &mut Vec<u8>, lines: usize) -> io::Result<usize> {
        for read in 0..lines {
            if self.read_line(buffer)? == 0 {
                return Ok(read);
            }
        }
        Ok(lines)
    }

    pub fn peek_empty(&mut self) -> io::Result<bool> {
        Ok(self.inner.fill_buf()?.is_empty())
    }

    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// False only if something was read and it did not end with a newline
    pub fn ends_with_newline(&self) -> bool {
        self.last_byte.map_or(true, |b| b == b'\n')
    }

    #[inline]
    fn track(&mut self, data: &[u8]) {
        if let Some(&last) = data.last() {
            self.bytes_read += data.len() as u64;
            self.last_byte = Some(last);
        }
    }
}
