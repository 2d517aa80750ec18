//! Songlengths database (`Songlengths.md5`).
//!
//! Entries are keyed by the MD5 digest of the SID file's content. Each one is
//! a `; <key>` comment line followed by a `<md5>=<length> <length> ...` line
//! with one length per tune. A length is `M:SS`, optionally with a
//! millisecond fraction (`M:SS.mmm`) and an attribute in parentheses such as
//! `(G)`.

use std::fs;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

use log::debug;
use md5::{Digest, Md5};
use stil::parser::timestamp::parse_simple;
use stil::source::locator::locate;
use stil::{Line, LineSource, TimestampError};

use crate::error::HvscError;
use crate::paths::Hvsc;

const DIGEST_LEN: usize = 32;

/// Handle on a Songlengths file. The file is opened for each lookup.
#[derive(Debug, Clone)]
pub struct Songlengths {
    path: PathBuf,
}

impl Songlengths {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Songlengths { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lengths in whole seconds for the file with archive key `key`.
    pub fn lengths_for_key(&self, key: &str) -> Result<Option<Vec<u32>>, HvscError> {
        let mut source = LineSource::open(&self.path)?;
        let marker = format!("; {key}");
        if locate(&mut source, &marker)?.is_none() {
            debug!("no Songlengths entry for '{}'", key);
            return Ok(None);
        }
        lengths_after_marker(&mut source)
    }

    /// Lengths in whole seconds for the file whose MD5 digest is `digest`.
    pub fn lengths_for_digest(&self, digest: &str) -> Result<Option<Vec<u32>>, HvscError> {
        if digest.len() != DIGEST_LEN || !digest.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(HvscError::InvalidDigest(digest.to_owned()));
        }

        let mut source = LineSource::open(&self.path)?;
        while let Some(line) = source.next_line()? {
            let Some((head, _)) = line.text.split_once('=') else {
                continue;
            };
            if head.trim().eq_ignore_ascii_case(digest) {
                return parse_entry_line(&line).map(Some);
            }
        }
        debug!("no Songlengths entry for digest {}", digest);
        Ok(None)
    }
}

impl Hvsc {
    pub fn songlengths(&self) -> Songlengths {
        Songlengths::new(self.sldb_path())
    }

    /// Song lengths for a SID file, in whole seconds per tune.
    ///
    /// The file is found by the MD5 digest of its content. When the file is
    /// not on disk or its digest is unknown, the `; <key>` line is used.
    pub fn song_lengths(&self, sid: impl AsRef<Path>) -> Result<Option<Vec<u32>>, HvscError> {
        let sid = sid.as_ref();
        let sldb = self.songlengths();

        if let Some(digest) = self.sid_digest(sid)? {
            if let Some(lengths) = sldb.lengths_for_digest(&digest)? {
                return Ok(Some(lengths));
            }
            debug!("digest {} of '{}' not in Songlengths", digest, sid.display());
        }
        sldb.lengths_for_key(&self.key_for(sid))
    }

    /// Hex MD5 of a SID file, `None` if the file does not exist.
    fn sid_digest(&self, sid: &Path) -> Result<Option<String>, HvscError> {
        let path = self.sid_path(sid);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(md5_hex(&bytes))),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("'{}' not on disk, looking up by key", path.display());
                Ok(None)
            }
            Err(source) => Err(HvscError::Io { path, source }),
        }
    }
}

/// Lower-case hex MD5 digest, the form Songlengths entries are keyed by.
pub fn md5_hex(bytes: &[u8]) -> String {
    format!("{:x}", Md5::digest(bytes))
}

/// The digest line that follows a key comment. Another comment, a section
/// header or the end of the file means the key has no lengths.
fn lengths_after_marker<R: BufRead>(
    source: &mut LineSource<R>,
) -> Result<Option<Vec<u32>>, HvscError> {
    while let Some(line) = source.next_line()? {
        let text = line.text.trim();
        if text.is_empty() {
            continue;
        }
        if text.starts_with(';') || text.starts_with('[') {
            break;
        }
        return parse_entry_line(&line).map(Some);
    }
    Ok(None)
}

fn parse_entry_line(line: &Line) -> Result<Vec<u32>, HvscError> {
    let lengths = line.text.split_once('=').map_or("", |(_, lengths)| lengths);
    parse_lengths(lengths).map_err(|source| HvscError::InvalidSonglength {
        line: line.number,
        source,
    })
}

/// Parse a space separated list of lengths into whole seconds.
pub fn parse_lengths(text: &str) -> Result<Vec<u32>, TimestampError> {
    let mut lengths = Vec::new();
    let mut rest = text.trim_start();

    while !rest.is_empty() {
        let (seconds, after) = parse_simple(rest)?;
        let after = skip_fraction(after);
        let after = skip_attribute(after);
        lengths.push(seconds);
        rest = after.trim_start();
    }

    if lengths.is_empty() {
        return Err(TimestampError::ExpectedDigit(0));
    }
    Ok(lengths)
}

/// Milliseconds are truncated.
fn skip_fraction(text: &str) -> &str {
    match text.strip_prefix('.') {
        Some(fraction) => fraction.trim_start_matches(|c: char| c.is_ascii_digit()),
        None => text,
    }
}

fn skip_attribute(text: &str) -> &str {
    text.strip_prefix('(')
        .and_then(|inner| inner.find(')').map(|close| &inner[close + 1..]))
        .unwrap_or(text)
}
