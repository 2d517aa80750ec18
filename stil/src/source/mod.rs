pub mod entry;
pub mod locator;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::debug;

use crate::parser::StilError;

/// A single line of text with its terminator stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// 1-based line number in the resource the line was read from.
    pub number: usize,
    pub text: String,
}

impl Line {
    pub fn new(number: usize, text: impl Into<String>) -> Self {
        Line {
            number,
            text: text.into(),
        }
    }
}

/// Buffered line reader over a text resource.
///
/// The read buffer grows to fit the longest line seen, so there is no line
/// length limit. Lines that are not valid UTF-8 are decoded as Latin-1, which
/// is what the older HVSC documents are written in.
pub struct LineSource<R> {
    reader: R,
    buffer: Vec<u8>,
    lineno: usize,
}

impl LineSource<BufReader<File>> {
    /// Open a file for reading. The file is closed when the source is dropped.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StilError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| StilError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("opened '{}'", path.display());
        Ok(LineSource::new(BufReader::new(file)))
    }
}

impl<R: BufRead> LineSource<R> {
    pub fn new(reader: R) -> Self {
        LineSource {
            reader,
            buffer: Vec::new(),
            lineno: 0,
        }
    }

    /// Number of the last line returned, 0 before the first read.
    pub fn line_number(&self) -> usize {
        self.lineno
    }

    /// Read the next line. `Ok(None)` signals end of stream.
    pub fn next_line(&mut self) -> Result<Option<Line>, StilError> {
        self.buffer.clear();
        let read = self
            .reader
            .read_until(b'\n', &mut self.buffer)
            .map_err(|source| StilError::Read {
                line: self.lineno + 1,
                source,
            })?;
        if read == 0 {
            return Ok(None);
        }
        self.lineno += 1;

        let mut end = self.buffer.len();
        if end > 0 && self.buffer[end - 1] == b'\n' {
            end -= 1;
        }
        if end > 0 && self.buffer[end - 1] == b'\r' {
            end -= 1;
        }
        Ok(Some(Line {
            number: self.lineno,
            text: decode(&self.buffer[..end]),
        }))
    }

    /// Release the underlying reader.
    pub fn close(self) {
        debug!("closing line source after {} lines", self.lineno);
    }
}

impl<R: BufRead> Iterator for LineSource<R> {
    type Item = Result<Line, StilError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_line().transpose()
    }
}

fn decode(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_owned(),
        Err(_) => bytes.iter().map(|&b| char::from(b)).collect(),
    }
}
