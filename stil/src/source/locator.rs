use std::io::BufRead;

use log::debug;

use crate::parser::StilError;
use crate::source::LineSource;

/// Scan forward until a line equals `key` byte for byte.
///
/// On success the source is positioned just after the key line, so the next
/// read yields the first line of the entry. Returns the key's line number, or
/// `None` when the stream ends without a match.
pub fn locate<R: BufRead>(
    source: &mut LineSource<R>,
    key: &str,
) -> Result<Option<usize>, StilError> {
    while let Some(line) = source.next_line()? {
        if line.text == key {
            debug!("found '{}' at line {}", key, line.number);
            return Ok(Some(line.number));
        }
    }
    debug!("'{}' not found in {} lines", key, source.line_number());
    Ok(None)
}
