use crate::parser::StilError;
use crate::parser::classify::field_content;
use crate::source::Line;

/// Indent that marks a line as continuing the field above it.
pub const CONTINUATION_INDENT: &str = "         ";

/// Continuation text of `line`, if it is indented by at least nine spaces.
///
/// The ninth space is kept so merged segments stay space separated.
pub fn continuation(line: &str) -> Option<&str> {
    line.starts_with(CONTINUATION_INDENT)
        .then(|| &line[CONTINUATION_INDENT.len() - 1..])
}

/// Merge the tagged line at `start` with the continuation lines after it.
///
/// Returns the merged text and the index of the first line not consumed.
pub fn accumulate(lines: &[Line], start: usize) -> Result<(String, usize), StilError> {
    let mut text = field_content(&lines[start].text).to_owned();
    let mut next = start + 1;

    while let Some(rest) = lines.get(next).and_then(|l| continuation(&l.text)) {
        text.try_reserve(rest.len())
            .map_err(|_| StilError::OutOfMemory { what: "comment text" })?;
        text.push_str(rest);
        next += 1;
    }

    Ok((text, next))
}
