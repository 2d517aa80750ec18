use log::debug;

use crate::block::Block;
use crate::block::field::{Field, FieldKind};
use crate::block::timestamp::Timestamp;
use crate::document::StilDocument;
use crate::parser::classify::{classify, field_content, parse_tune_marker};
use crate::parser::comment;
use crate::parser::error::{ParseError, StilError};
use crate::parser::timestamp;
use crate::parser::{ParseOptions, PreambleFields};
use crate::source::entry::EntryBuffer;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Turn the lines of one entry into a document of per-tune blocks.
pub fn build_document(
    entry: &EntryBuffer,
    file_id: usize,
    options: ParseOptions,
) -> Result<(StilDocument, Vec<ParseError>), StilError> {
    let mut builder = BlockBuilder::new(entry, file_id, options);
    builder.process_lines()?;
    builder.finalize()
}

// ---------------------------------------------------------------------------
// Builder state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Nothing has tied the working block to a tune yet.
    Preamble,
    InTune(u32),
}

struct BlockBuilder<'a> {
    entry: &'a EntryBuffer,
    file_id: usize,
    options: ParseOptions,
    state: State,
    /// Block being filled. Moved into `blocks` when a new tune starts.
    working: Block,
    global_comment: Option<String>,
    /// Completed blocks, in marker order.
    blocks: Vec<Block>,
    warnings: Vec<ParseError>,
}

impl<'a> BlockBuilder<'a> {
    fn new(entry: &'a EntryBuffer, file_id: usize, options: ParseOptions) -> Self {
        BlockBuilder {
            entry,
            file_id,
            options,
            state: State::Preamble,
            working: Block::new(0),
            global_comment: None,
            blocks: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn process_lines(&mut self) -> Result<(), StilError> {
        let entry = self.entry;
        let lines = entry.lines();
        let mut i = 0;

        while i < lines.len() {
            let text = lines[i].text.as_str();

            if let Some(tune) = parse_tune_marker(text) {
                self.enter_tune(tune)?;
                i += 1;
                continue;
            }

            match classify(text) {
                Some(FieldKind::Comment) => {
                    let (comment, next) = comment::accumulate(lines, i)?;
                    match self.state {
                        State::Preamble => {
                            debug!("entry-wide comment on line {}", lines[i].number);
                            self.global_comment = Some(comment);
                            self.promote();
                        }
                        State::InTune(_) => {
                            self.add_field(Field::new(FieldKind::Comment, comment))?;
                        }
                    }
                    // Resume at the first line the comment did not consume.
                    i = next;
                    continue;
                }
                Some(kind) => {
                    let mut field = Field::new(kind, field_content(text));
                    if kind == FieldKind::Title {
                        annotate_title(&mut field);
                    }
                    self.add_field(field)?;
                }
                None => self.fold_continuation(i)?,
            }
            i += 1;
        }

        Ok(())
    }

    /// Handle a `(#N)` marker.
    fn enter_tune(&mut self, tune: u32) -> Result<(), StilError> {
        match self.state {
            State::Preamble => {
                // The preamble block becomes this tune's block.
                debug!("preamble block tagged as tune {}", tune);
                self.working.tune_number = tune;
            }
            State::InTune(current) if current == tune => {}
            State::InTune(_) => {
                self.finalize_block()?;
                self.working = Block::new(tune);
            }
        }
        self.state = State::InTune(tune);
        Ok(())
    }

    /// Preamble is over without a marker: the working block is tune 1.
    fn promote(&mut self) {
        self.working.tune_number = 1;
        self.state = State::InTune(1);
    }

    fn add_field(&mut self, field: Field) -> Result<(), StilError> {
        if self.state == State::Preamble {
            self.promote();
            if self.options.preamble_fields == PreambleFields::Drop {
                debug!("dropping preamble {} field '{}'", field.kind, field.text);
                return Ok(());
            }
        }
        self.working.push_field(field)
    }

    /// An untagged line that is not a marker either. Indented lines extend
    /// the previous field; anything else is reported and skipped.
    fn fold_continuation(&mut self, index: usize) -> Result<(), StilError> {
        let entry = self.entry;
        let line = &entry.lines()[index];

        if let Some(rest) = comment::continuation(&line.text) {
            if let Some(field) = self.working.last_field_mut() {
                field
                    .text
                    .try_reserve(rest.len())
                    .map_err(|_| StilError::OutOfMemory { what: "field text" })?;
                field.text.push_str(rest);
                if field.kind == FieldKind::Title {
                    annotate_title(field);
                }
                return Ok(());
            }
        }

        debug!("ignoring line {}: '{}'", line.number, line.text);
        let warning = ParseError::warning(
            "unrecognized line ignored",
            entry.line_span(index),
            self.file_id,
        )
        .with_note(format!(
            "line {} of '{}' is not a field, a tune marker or a continuation of a field",
            line.number,
            entry.key()
        ));
        self.warnings.push(warning);
        Ok(())
    }

    /// Move the working block into the document's block list.
    fn finalize_block(&mut self) -> Result<(), StilError> {
        let block = std::mem::replace(&mut self.working, Block::new(0));
        debug!(
            "finalized tune {} with {} fields",
            block.tune_number,
            block.fields.len()
        );
        self.blocks
            .try_reserve(1)
            .map_err(|_| StilError::OutOfMemory { what: "block list" })?;
        self.blocks.push(block);
        Ok(())
    }

    /// The last working block is always stored. One still in the preamble
    /// keeps tune number 0.
    fn finalize(mut self) -> Result<(StilDocument, Vec<ParseError>), StilError> {
        self.finalize_block()?;

        let document = StilDocument::new(
            self.entry.key().to_owned(),
            self.global_comment,
            self.blocks,
        );
        Ok((document, self.warnings))
    }
}

// ---------------------------------------------------------------------------
// Title sub-fields
// ---------------------------------------------------------------------------

/// Derive album and timestamp from a title's text. The text is left as is.
fn annotate_title(field: &mut Field) {
    let mut body = field.text.trim_end();
    field.album = None;
    if let Some((before, album)) = split_album(body) {
        field.album = Some(album.to_owned());
        body = before.trim_end();
    }
    field.timestamp = trailing_timestamp(body);
}

/// Split `text [from album]` into its parts.
fn split_album(text: &str) -> Option<(&str, &str)> {
    let inner = text.strip_suffix(']')?;
    let open = inner.rfind("[from ")?;
    Some((&inner[..open], inner[open + "[from ".len()..].trim()))
}

/// Timestamp in the last parenthesized group, if the text ends with one.
/// Remarks such as `(lyrics)` are not timestamps and yield `None`, and so
/// does a group that opens at the very start of the text.
fn trailing_timestamp(text: &str) -> Option<Timestamp> {
    let inner = text.strip_suffix(')')?;
    let open = inner.rfind('(').filter(|&open| open > 0)?;
    match timestamp::parse(&inner[open + 1..]) {
        Ok((ts, _)) => Some(ts),
        Err(err) => {
            debug!("'({})' is not a timestamp: {}", &inner[open + 1..], err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn title(text: &str) -> Field {
        let mut field = Field::new(FieldKind::Title, text);
        annotate_title(&mut field);
        field
    }

    #[test]
    fn title_timestamps() {
        assert_eq!(title("Rambo (0:30)").timestamp, Some(Timestamp::at(30)));
        assert_eq!(
            title("Rambo (0:30-2:15)").timestamp,
            Some(Timestamp::range(30, 135))
        );
        assert_eq!(title("Rambo (lyrics)").timestamp, None);
        assert_eq!(title("Rambo").timestamp, None);
        assert_eq!(title("(1:00) Rambo").timestamp, None);
    }

    #[test]
    fn title_that_is_only_a_time_has_no_timestamp() {
        assert_eq!(title("(1:00)").timestamp, None);
        assert_eq!(title("(0:30-1:00) [from Somewhere]").timestamp, None);
        assert_eq!(title("A (1:00)").timestamp, Some(Timestamp::at(60)));
    }

    #[test]
    fn title_text_is_not_modified() {
        assert_eq!(title("Rambo (0:30)").text, "Rambo (0:30)");
        assert_eq!(title("Rambo (lyrics)").text, "Rambo (lyrics)");
    }

    #[test]
    fn title_album() {
        let field = title("Axel F (0:10-1:00) [from Beverly Hills Cop]");
        assert_eq!(field.album.as_deref(), Some("Beverly Hills Cop"));
        assert_eq!(field.timestamp, Some(Timestamp::range(10, 60)));

        let field = title("Axel F [from Beverly Hills Cop]");
        assert_eq!(field.album.as_deref(), Some("Beverly Hills Cop"));
        assert_eq!(field.timestamp, None);

        assert_eq!(title("Axel F [remix]").album, None);
    }
}
