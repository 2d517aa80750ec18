use std::io;
use std::path::PathBuf;

use stil::{StilError, TimestampError};
use thiserror::Error;

use crate::psid::PsidError;

#[derive(Debug, Error)]
pub enum HvscError {
    #[error("HVSC root '{}' is not a directory", .0.display())]
    InvalidRoot(PathBuf),

    #[error(transparent)]
    Stil(#[from] StilError),

    #[error("cannot read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid Songlengths entry at line {line}: {source}")]
    InvalidSonglength {
        line: usize,
        #[source]
        source: TimestampError,
    },

    #[error("'{0}' is not a 32-digit hexadecimal MD5 digest")]
    InvalidDigest(String),

    #[error("invalid SID file '{}': {source}", path.display())]
    Psid {
        path: PathBuf,
        #[source]
        source: PsidError,
    },
}
