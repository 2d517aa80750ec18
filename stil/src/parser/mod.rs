pub mod classify;
pub mod comment;
pub mod error;
mod structural;
pub mod timestamp;

pub use error::{ParseError, StilError};
pub use timestamp::TimestampError;

use crate::document::StilDocument;
use crate::source::entry::EntryBuffer;

/// What to do with fields that appear before any tune marker or comment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PreambleFields {
    /// Treat the start of the entry as an implicit `(#1)` and keep them.
    #[default]
    Retain,
    /// Discard the first such field while promoting the block to tune 1.
    Drop,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    pub preamble_fields: PreambleFields,
}

/// Parser entry point.
pub struct Parser {
    entry: EntryBuffer,
    file_id: usize,
    options: ParseOptions,
}

impl Parser {
    pub fn new(entry: EntryBuffer, file_id: usize) -> Self {
        Parser {
            entry,
            file_id,
            options: ParseOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    /// Parse the entry into a document, discarding warnings.
    pub fn parse(&self) -> Result<StilDocument, StilError> {
        self.parse_with_diagnostics().map(|(document, _)| document)
    }

    /// Parse the entry, also returning warnings about lines that were
    /// ignored. Warnings never make the parse fail.
    pub fn parse_with_diagnostics(&self) -> Result<(StilDocument, Vec<ParseError>), StilError> {
        structural::build_document(&self.entry, self.file_id, self.options)
    }
}
