use std::fmt;

use crate::block::timestamp::Timestamp;

/// Width of a field tag such as `"  TITLE:"`.
pub const TAG_WIDTH: usize = 8;

/// The kind of a STIL field, one per tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Artist,
    Author,
    /// Only found in BUGlist.txt.
    Bug,
    Comment,
    Name,
    Title,
}

impl FieldKind {
    pub const ALL: [FieldKind; 6] = [
        FieldKind::Artist,
        FieldKind::Author,
        FieldKind::Bug,
        FieldKind::Comment,
        FieldKind::Name,
        FieldKind::Title,
    ];

    /// The literal, right-aligned tag that starts a line of this kind.
    pub fn tag(self) -> &'static str {
        match self {
            FieldKind::Artist => " ARTIST:",
            FieldKind::Author => " AUTHOR:",
            FieldKind::Bug => "    BUG:",
            FieldKind::Comment => "COMMENT:",
            FieldKind::Name => "   NAME:",
            FieldKind::Title => "  TITLE:",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FieldKind::Artist => "artist",
            FieldKind::Author => "author",
            FieldKind::Bug => "bug",
            FieldKind::Comment => "comment",
            FieldKind::Name => "name",
            FieldKind::Title => "title",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One typed piece of metadata. `text` never contains the tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub kind: FieldKind,
    pub text: String,
    pub timestamp: Option<Timestamp>,
    /// Cover source, from a trailing `[from ...]` on a title.
    pub album: Option<String>,
}

impl Field {
    pub fn new(kind: FieldKind, text: impl Into<String>) -> Self {
        Field {
            kind,
            text: text.into(),
            timestamp: None,
            album: None,
        }
    }

    pub fn with_timestamp(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

// Dump layout: the kind is padded inside braces so a tag that leaked into
// field text stands out.
impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{:>7}}} {}", self.kind.name(), self.text)?;
        if let Some(ts) = &self.timestamp {
            write!(f, "\n  {{timestamp}} {}", ts)?;
        }
        if let Some(album) = &self.album {
            write!(f, "\n  {{album}} {}", album)?;
        }
        Ok(())
    }
}
