use std::fmt;
use std::io::BufRead;
use std::ops::Range;

use log::{debug, trace};

use crate::parser::StilError;
use crate::source::{Line, LineSource};

/// The raw lines of one located entry, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryBuffer {
    key: String,
    lines: Vec<Line>,
}

impl EntryBuffer {
    pub fn new(key: impl Into<String>) -> Self {
        EntryBuffer {
            key: key.into(),
            lines: Vec::new(),
        }
    }

    /// Build a buffer from in-memory lines, numbered from 1. Lines are taken
    /// as given; no blank-line termination is applied.
    pub fn from_lines<I, S>(key: impl Into<String>, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        EntryBuffer {
            key: key.into(),
            lines: lines
                .into_iter()
                .enumerate()
                .map(|(i, text)| Line::new(i + 1, text))
                .collect(),
        }
    }

    /// Read the entry following a located key line.
    ///
    /// Stops at the first blank line or at end of stream; both are a normal
    /// end of entry. The blank line itself is consumed but not kept.
    pub fn accumulate<R: BufRead>(
        source: &mut LineSource<R>,
        key: impl Into<String>,
    ) -> Result<Self, StilError> {
        let mut entry = EntryBuffer::new(key);
        while let Some(line) = source.next_line()? {
            if line.text.trim().is_empty() {
                debug!("blank line {} ends entry '{}'", line.number, entry.key);
                break;
            }
            trace!("line {}: '{}'", line.number, line.text);
            entry.push(line)?;
        }
        Ok(entry)
    }

    pub fn push(&mut self, line: Line) -> Result<(), StilError> {
        self.lines
            .try_reserve(1)
            .map_err(|_| StilError::OutOfMemory { what: "entry buffer" })?;
        self.lines.push(line);
        Ok(())
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The entry text, lines joined with `\n`. Spans handed out by
    /// [`EntryBuffer::line_span`] index into this string.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Byte range of line `index` within [`EntryBuffer::text`].
    pub fn line_span(&self, index: usize) -> Range<usize> {
        let start: usize = self.lines[..index].iter().map(|l| l.text.len() + 1).sum();
        start..start + self.lines[index].text.len()
    }
}

impl fmt::Display for EntryBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{}", line.text)?;
        }
        Ok(())
    }
}
