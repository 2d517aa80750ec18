use std::path::{Component, Path, PathBuf};

use crate::error::HvscError;

/// STIL file, relative to the HVSC root.
pub const STIL_FILE: &str = "DOCUMENTS/STIL.txt";
/// BUGlist file, relative to the HVSC root.
pub const BUGS_FILE: &str = "DOCUMENTS/BUGlist.txt";
/// Songlengths database, relative to the HVSC root.
pub const SLDB_FILE: &str = "DOCUMENTS/Songlengths.md5";

/// An HVSC installation, identified by its root directory.
#[derive(Debug, Clone)]
pub struct Hvsc {
    root: PathBuf,
}

impl Hvsc {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, HvscError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(HvscError::InvalidRoot(root));
        }
        Ok(Hvsc { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn stil_path(&self) -> PathBuf {
        self.root.join(STIL_FILE)
    }

    pub fn bugs_path(&self) -> PathBuf {
        self.root.join(BUGS_FILE)
    }

    pub fn sldb_path(&self) -> PathBuf {
        self.root.join(SLDB_FILE)
    }

    /// The archive key for a SID file: its path below the root, with `/`
    /// separators and a leading `/`.
    ///
    /// Paths outside the root are taken to be relative to it already, so
    /// `MUSICIANS/H/Hubbard_Rob/Commando.sid` and an absolute path into the
    /// collection give the same key.
    pub fn key_for(&self, sid: impl AsRef<Path>) -> String {
        let sid = sid.as_ref();
        let relative = sid.strip_prefix(&self.root).unwrap_or(sid);

        let mut key = String::new();
        for component in relative.components() {
            if let Component::Normal(part) = component {
                key.push('/');
                key.push_str(&part.to_string_lossy());
            }
        }
        key
    }

    /// Where a SID file lives on disk, given an absolute path into the
    /// collection, a path relative to the root or an archive key.
    pub fn sid_path(&self, sid: impl AsRef<Path>) -> PathBuf {
        let key = self.key_for(sid);
        self.root.join(key.trim_start_matches('/'))
    }
}
