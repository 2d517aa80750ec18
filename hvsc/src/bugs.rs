use std::path::Path;

use stil::{FieldKind, ParseOptions, Parser, StilDocument};

use crate::error::HvscError;
use crate::lookup::read_entry;
use crate::paths::Hvsc;

/// A known problem with a SID file, from `BUGlist.txt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BugEntry {
    /// Tune the report applies to.
    pub tune: u32,
    pub text: String,
    /// Who reported the problem, from a trailing `(name)`.
    pub user: Option<String>,
}

impl Hvsc {
    /// First bug report for a SID file. `Ok(None)` if it has none.
    pub fn bug(&self, sid: impl AsRef<Path>) -> Result<Option<BugEntry>, HvscError> {
        let key = self.key_for(sid);
        let Some(entry) = read_entry(&self.bugs_path(), &key)? else {
            return Ok(None);
        };
        // A BUG line right after the key belongs to tune 1 and must be kept.
        let options = ParseOptions::default();
        let document = Parser::new(entry, 0).with_options(options).parse()?;
        Ok(first_bug(&document))
    }
}

/// The first `BUG` field of a parsed BUGlist entry.
pub fn first_bug(document: &StilDocument) -> Option<BugEntry> {
    document.blocks().iter().find_map(|block| {
        block
            .fields
            .iter()
            .find(|field| field.kind == FieldKind::Bug)
            .map(|field| split_reporter(block.tune_number, &field.text))
    })
}

fn split_reporter(tune: u32, text: &str) -> BugEntry {
    let text = text.trim_end();
    if let Some(inner) = text.strip_suffix(')') {
        if let Some(open) = inner.rfind('(') {
            let user = inner[open + 1..].trim();
            if !user.is_empty() {
                return BugEntry {
                    tune,
                    text: inner[..open].trim_end().to_owned(),
                    user: Some(user.to_owned()),
                };
            }
        }
    }
    BugEntry {
        tune,
        text: text.to_owned(),
        user: None,
    }
}
