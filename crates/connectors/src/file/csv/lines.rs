use crate::file::csv::error::FileError;
use bytes::BytesMut;
use futures_util::Stream;
use tokio::io::AsyncRead;
use tokio_util::codec::{Decoder, FramedRead};

/// Default upper bound for a single line, in bytes.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 500_000;

/// A decoded, non-empty line with its 1-based position in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub number: usize,
    pub text: String,
}

/// Frames an arbitrary byte stream into newline-delimited lines.
///
/// Empty lines are counted but never emitted, a trailing `\r` is stripped,
/// and the final line is emitted at end of input even without a newline.
/// Any line longer than `max_length` bytes is a fatal error; the pending
/// buffer is cleared when it is reported.
#[derive(Debug, Clone)]
pub struct LineSplitter {
    max_length: usize,
    line: usize,
    scanned: usize,
}

impl LineSplitter {
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length,
            line: 0,
            scanned: 0,
        }
    }

    /// Number of the last line that was completed, empty lines included.
    pub fn current_line(&self) -> usize {
        self.line
    }

    /// Wraps an async reader into a stream of lines.
    pub fn frame<R: AsyncRead>(
        reader: R,
        max_length: usize,
    ) -> impl Stream<Item = Result<Line, FileError>> {
        FramedRead::new(reader, LineSplitter::new(max_length))
    }

    fn overflow(&mut self, buf: &mut BytesMut) -> FileError {
        buf.clear();
        self.scanned = 0;
        FileError::LineTooLong {
            max: self.max_length,
            line: self.line + 1,
        }
    }

    fn emit(&mut self, mut raw: BytesMut) -> Result<Option<Line>, FileError> {
        self.line += 1;
        if raw.last() == Some(&b'\r') {
            raw.truncate(raw.len() - 1);
        }
        if raw.is_empty() {
            return Ok(None);
        }
        let text = String::from_utf8(raw.to_vec())
            .map_err(|_| FileError::InvalidUtf8 { line: self.line })?;
        Ok(Some(Line {
            number: self.line,
            text,
        }))
    }
}

impl Default for LineSplitter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINE_LENGTH)
    }
}

impl Decoder for LineSplitter {
    type Item = Line;
    type Error = FileError;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Line>, FileError> {
        loop {
            let newline = buf[self.scanned..]
                .iter()
                .position(|b| *b == b'\n')
                .map(|offset| offset + self.scanned);

            let Some(pos) = newline else {
                if buf.len() > self.max_length {
                    return Err(self.overflow(buf));
                }
                self.scanned = buf.len();
                return Ok(None);
            };

            if pos > self.max_length {
                return Err(self.overflow(buf));
            }

            let mut raw = buf.split_to(pos + 1);
            raw.truncate(pos);
            self.scanned = 0;

            if let Some(line) = self.emit(raw)? {
                return Ok(Some(line));
            }
        }
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Line>, FileError> {
        if let Some(line) = self.decode(buf)? {
            return Ok(Some(line));
        }
        if buf.is_empty() {
            return Ok(None);
        }
        let raw = buf.split();
        self.scanned = 0;
        self.emit(raw)
    }
}
