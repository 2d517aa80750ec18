//! Line-level lexical rules: field tags and tune markers.

use crate::block::field::{FieldKind, TAG_WIDTH};

/// Map a line's fixed-width prefix to the field kind it names.
///
/// `None` means the line carries no tag: it is a tune marker, a continuation
/// or stray text.
pub fn classify(line: &str) -> Option<FieldKind> {
    FieldKind::ALL
        .into_iter()
        .find(|kind| line.as_bytes().starts_with(kind.tag().as_bytes()))
}

/// Field text of a tagged line: everything after the tag and the single
/// separating column, i.e. the line minus its first nine characters.
pub fn field_content(line: &str) -> &str {
    skip_chars(line, TAG_WIDTH + 1)
}

/// Parse a `(#N)` tune marker, ignoring leading whitespace. Tune numbers
/// start at 1.
pub fn parse_tune_marker(line: &str) -> Option<u32> {
    let rest = line.trim_start().strip_prefix("(#")?;
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 || rest.as_bytes().get(digits) != Some(&b')') {
        return None;
    }
    rest[..digits].parse().ok().filter(|&n| n > 0)
}

pub(crate) fn skip_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((i, _)) => &s[i..],
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_tag_is_recognized() {
        for kind in FieldKind::ALL {
            let line = format!("{} some text", kind.tag());
            assert_eq!(classify(&line), Some(kind), "{line}");
            assert_eq!(field_content(&line), "some text");
            assert_eq!(field_content(&line), &line[9..]);
        }
    }

    #[test]
    fn untagged_lines() {
        assert_eq!(classify("(#1)"), None);
        assert_eq!(classify("         continued text"), None);
        assert_eq!(classify("TITLE: not right-aligned"), None);
        assert_eq!(classify("  title: lower case"), None);
        assert_eq!(classify(""), None);
    }

    #[test]
    fn content_of_short_lines() {
        assert_eq!(field_content("COMMENT:"), "");
        assert_eq!(field_content("COMMENT: "), "");
        assert_eq!(field_content("  TITLE: \u{e9}t\u{e9}"), "\u{e9}t\u{e9}");
    }

    #[test]
    fn tune_markers() {
        assert_eq!(parse_tune_marker("(#1)"), Some(1));
        assert_eq!(parse_tune_marker("   (#12)"), Some(12));
        assert_eq!(parse_tune_marker("\t(#3) "), Some(3));
        assert_eq!(parse_tune_marker("(#0)"), None);
        assert_eq!(parse_tune_marker("(#)"), None);
        assert_eq!(parse_tune_marker("(#2"), None);
        assert_eq!(parse_tune_marker("(# 2)"), None);
        assert_eq!(parse_tune_marker("  TITLE: (#2)"), None);
        assert_eq!(parse_tune_marker("(#99999999999)"), None);
    }
}
