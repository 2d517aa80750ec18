use std::path::Path;

use log::debug;
use stil::source::locator::locate;
use stil::{EntryBuffer, LineSource, ParseOptions, Parser, StilDocument};

use crate::error::HvscError;
use crate::paths::Hvsc;

impl Hvsc {
    /// Raw STIL lines for a SID file. `Ok(None)` if the file has no entry.
    pub fn stil_entry(&self, sid: impl AsRef<Path>) -> Result<Option<EntryBuffer>, HvscError> {
        let key = self.key_for(sid);
        read_entry(&self.stil_path(), &key)
    }

    /// STIL information for a SID file.
    pub fn stil(&self, sid: impl AsRef<Path>) -> Result<Option<StilDocument>, HvscError> {
        self.stil_with_options(sid, ParseOptions::default())
    }

    pub fn stil_with_options(
        &self,
        sid: impl AsRef<Path>,
        options: ParseOptions,
    ) -> Result<Option<StilDocument>, HvscError> {
        let Some(entry) = self.stil_entry(sid)? else {
            return Ok(None);
        };
        let document = Parser::new(entry, 0).with_options(options).parse()?;
        Ok(Some(document))
    }
}

/// Find `key` in a STIL-formatted document and collect its entry.
pub(crate) fn read_entry(path: &Path, key: &str) -> Result<Option<EntryBuffer>, HvscError> {
    let mut source = LineSource::open(path)?;
    if locate(&mut source, key)?.is_none() {
        debug!("no entry for '{}' in '{}'", key, path.display());
        return Ok(None);
    }
    let entry = EntryBuffer::accumulate(&mut source, key)?;
    Ok(Some(entry))
}
