//! PSID/RSID file headers.
//!
//! All header words are big-endian. Version 1 headers are 0x76 bytes; version
//! 2 and later add flags, relocation info and extra SID addresses up to 0x7C.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use thiserror::Error;

use crate::error::HvscError;

pub const PSID_MAGIC: &[u8; 4] = b"PSID";
pub const RSID_MAGIC: &[u8; 4] = b"RSID";

pub const HEADER_V1_SIZE: usize = 0x76;
pub const HEADER_V2_SIZE: usize = 0x7c;

const TEXT_LEN: usize = 32;

// Field offsets.
const MAGIC: usize = 0x00;
const VERSION: usize = 0x04;
const DATA_OFFSET: usize = 0x06;
const LOAD_ADDRESS: usize = 0x08;
const INIT_ADDRESS: usize = 0x0a;
const PLAY_ADDRESS: usize = 0x0c;
const SONGS: usize = 0x0e;
const START_SONG: usize = 0x10;
const SPEED: usize = 0x12;
const NAME: usize = 0x16;
const AUTHOR: usize = 0x36;
const RELEASED: usize = 0x56;
const FLAGS: usize = 0x76;
const START_PAGE: usize = 0x78;
const PAGE_LENGTH: usize = 0x79;
const SECOND_SID: usize = 0x7a;
const THIRD_SID: usize = 0x7b;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PsidError {
    #[error("offset out of range: 0x{offset:X} (needed {needed} bytes, available {available})")]
    OffsetOutOfRange {
        offset: usize,
        needed: usize,
        available: usize,
    },
    #[error("invalid magic: {0:?}")]
    InvalidMagic([u8; 4]),
    #[error("unsupported version: {0}")]
    UnsupportedVersion(u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidFormat {
    Psid,
    Rsid,
}

impl SidFormat {
    pub fn magic(self) -> &'static str {
        match self {
            SidFormat::Psid => "PSID",
            SidFormat::Rsid => "RSID",
        }
    }
}

/// Video standard the tune was written for (flags bits 2-3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clock {
    Unknown,
    Pal,
    Ntsc,
    Any,
}

/// SID chip model (flags bits 4-5, 6-7 and 8-9 for the first three SIDs).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidModel {
    Unknown,
    Mos6581,
    Mos8580,
    Any,
}

impl SidModel {
    fn from_bits(bits: u16) -> Self {
        match bits & 0x03 {
            1 => SidModel::Mos6581,
            2 => SidModel::Mos8580,
            3 => SidModel::Any,
            _ => SidModel::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PsidHeader {
    pub format: SidFormat,
    pub version: u16,
    pub data_offset: u16,
    /// 0 when the load address is the first word of the C64 data.
    pub load_address: u16,
    pub init_address: u16,
    pub play_address: u16,
    pub songs: u16,
    pub start_song: u16,
    pub speed: u32,
    pub name: String,
    pub author: String,
    pub released: String,
    // Version 2+ fields; zero for version 1.
    pub flags: u16,
    pub start_page: u8,
    pub page_length: u8,
    /// Middle byte of the second SID's address, 0 if absent or invalid.
    pub second_sid: u8,
    pub third_sid: u8,
}

impl PsidHeader {
    pub fn parse(bytes: &[u8]) -> Result<Self, PsidError> {
        let magic: [u8; 4] = read_slice(bytes, MAGIC, 4)?
            .try_into()
            .map_err(|_| PsidError::InvalidMagic([0; 4]))?;
        let format = match &magic {
            PSID_MAGIC => SidFormat::Psid,
            RSID_MAGIC => SidFormat::Rsid,
            _ => return Err(PsidError::InvalidMagic(magic)),
        };

        let version = read_u16_be_at(bytes, VERSION)?;
        if !(1..=4).contains(&version) {
            return Err(PsidError::UnsupportedVersion(version));
        }
        let header_size = if version < 2 {
            HEADER_V1_SIZE
        } else {
            HEADER_V2_SIZE
        };
        if bytes.len() < header_size {
            return Err(PsidError::OffsetOutOfRange {
                offset: 0,
                needed: header_size,
                available: bytes.len(),
            });
        }

        let mut header = PsidHeader {
            format,
            version,
            data_offset: read_u16_be_at(bytes, DATA_OFFSET)?,
            load_address: read_u16_be_at(bytes, LOAD_ADDRESS)?,
            init_address: read_u16_be_at(bytes, INIT_ADDRESS)?,
            play_address: read_u16_be_at(bytes, PLAY_ADDRESS)?,
            songs: read_u16_be_at(bytes, SONGS)?,
            start_song: read_u16_be_at(bytes, START_SONG)?,
            speed: read_u32_be_at(bytes, SPEED)?,
            name: read_text(bytes, NAME)?,
            author: read_text(bytes, AUTHOR)?,
            released: read_text(bytes, RELEASED)?,
            flags: 0,
            start_page: 0,
            page_length: 0,
            second_sid: 0,
            third_sid: 0,
        };

        if version >= 2 {
            header.flags = read_u16_be_at(bytes, FLAGS)?;
            header.start_page = read_u8_at(bytes, START_PAGE)?;
            header.page_length = read_u8_at(bytes, PAGE_LENGTH)?;
            header.second_sid = valid_sid_address(read_u8_at(bytes, SECOND_SID)?);
            header.third_sid = valid_sid_address(read_u8_at(bytes, THIRD_SID)?);
        }

        debug!(
            "{} v{}: '{}' by '{}', {} songs",
            header.format.magic(),
            header.version,
            header.name,
            header.author,
            header.songs
        );
        Ok(header)
    }

    /// First and last C64 address occupied by the tune data of `file`, the
    /// complete file the header was parsed from.
    pub fn load_range(&self, file: &[u8]) -> Result<(u16, u16), PsidError> {
        let offset = usize::from(self.data_offset);
        let (load, data_len) = if self.load_address == 0 {
            let load = read_u16_le_at(file, offset)?;
            (load, file.len() - offset - 2)
        } else {
            let available = file.len().checked_sub(offset).ok_or(PsidError::OffsetOutOfRange {
                offset,
                needed: 0,
                available: file.len(),
            })?;
            (self.load_address, available)
        };
        // Addresses wrap within the 64K C64 address space.
        let end = (usize::from(load) + data_len).wrapping_sub(1) as u16;
        Ok((load, end))
    }

    pub fn clock(&self) -> Clock {
        match (self.flags >> 2) & 0x03 {
            1 => Clock::Pal,
            2 => Clock::Ntsc,
            3 => Clock::Any,
            _ => Clock::Unknown,
        }
    }

    pub fn sid_model(&self) -> SidModel {
        SidModel::from_bits(self.flags >> 4)
    }

    pub fn second_sid_address(&self) -> Option<u16> {
        sid_io_address(self.second_sid)
    }

    pub fn third_sid_address(&self) -> Option<u16> {
        sid_io_address(self.third_sid)
    }
}

/// A SID file read into memory along with its parsed header.
#[derive(Debug, Clone)]
pub struct PsidFile {
    pub path: PathBuf,
    pub header: PsidHeader,
    pub data: Vec<u8>,
}

impl PsidFile {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, HvscError> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|source| HvscError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("read {} bytes from '{}'", data.len(), path.display());
        let header = PsidHeader::parse(&data).map_err(|source| HvscError::Psid {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(PsidFile {
            path: path.to_path_buf(),
            header,
            data,
        })
    }

    pub fn load_range(&self) -> Result<(u16, u16), HvscError> {
        self.header
            .load_range(&self.data)
            .map_err(|source| HvscError::Psid {
                path: self.path.clone(),
                source,
            })
    }
}

impl fmt::Display for PsidFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let h = &self.header;
        writeln!(f, "file name  : {}", self.path.display())?;
        writeln!(f, "file size  : {}", self.data.len())?;
        writeln!(f, "magic      : {}", h.format.magic())?;
        writeln!(f, "version    : {}", h.version)?;
        writeln!(f, "data offset: ${:04x}", h.data_offset)?;
        match h.load_range(&self.data) {
            Ok((load, end)) => writeln!(f, "load       : ${load:04x}-${end:04x}")?,
            Err(err) => writeln!(f, "load       : {err}")?,
        }
        writeln!(f, "init       : ${:04x}", h.init_address)?;
        writeln!(f, "play       : ${:04x}", h.play_address)?;
        writeln!(f, "songs      : {} (default {})", h.songs, h.start_song)?;
        writeln!(f, "name       : {}", h.name)?;
        writeln!(f, "author     : {}", h.author)?;
        writeln!(f, "released   : {}", h.released)?;

        if h.version < 2 {
            return Ok(());
        }

        writeln!(f, "clock      : {:?}", h.clock())?;
        writeln!(f, "SID model  : {:?}", h.sid_model())?;
        writeln!(f, "start page : ${:04x}", u16::from(h.start_page) * 256)?;
        writeln!(f, "page length: ${:04x}", u16::from(h.page_length) * 256)?;
        for (label, address) in [
            ("second SID", h.second_sid_address()),
            ("third SID ", h.third_sid_address()),
        ] {
            match address {
                Some(address) => writeln!(f, "{label}: ${address:04x}")?,
                None => writeln!(f, "{label}: none")?,
            }
        }
        Ok(())
    }
}

/// Keep `$42-$7E` and `$E0-$FE`, even values only; anything else becomes 0.
fn valid_sid_address(address: u8) -> u8 {
    let valid = address & 0x01 == 0 && matches!(address, 0x42..=0x7f | 0xe0..=0xff);
    if valid { address } else { 0 }
}

fn sid_io_address(address: u8) -> Option<u16> {
    (address != 0).then(|| 0xd000 + u16::from(address) * 16)
}

// ---------------------------------------------------------------------------
// Byte readers
// ---------------------------------------------------------------------------

fn read_slice(bytes: &[u8], off: usize, len: usize) -> Result<&[u8], PsidError> {
    bytes
        .get(off..off + len)
        .ok_or(PsidError::OffsetOutOfRange {
            offset: off,
            needed: len,
            available: bytes.len(),
        })
}

fn read_u8_at(bytes: &[u8], off: usize) -> Result<u8, PsidError> {
    read_slice(bytes, off, 1).map(|b| b[0])
}

fn read_u16_be_at(bytes: &[u8], off: usize) -> Result<u16, PsidError> {
    let mut tmp = [0; 2];
    tmp.copy_from_slice(read_slice(bytes, off, 2)?);
    Ok(u16::from_be_bytes(tmp))
}

fn read_u16_le_at(bytes: &[u8], off: usize) -> Result<u16, PsidError> {
    let mut tmp = [0; 2];
    tmp.copy_from_slice(read_slice(bytes, off, 2)?);
    Ok(u16::from_le_bytes(tmp))
}

fn read_u32_be_at(bytes: &[u8], off: usize) -> Result<u32, PsidError> {
    let mut tmp = [0; 4];
    tmp.copy_from_slice(read_slice(bytes, off, 4)?);
    Ok(u32::from_be_bytes(tmp))
}

/// 32-byte text field, NUL padded, in Latin-1.
fn read_text(bytes: &[u8], off: usize) -> Result<String, PsidError> {
    let raw = read_slice(bytes, off, TEXT_LEN)?;
    let end = raw.iter().position(|&b| b == 0).unwrap_or(TEXT_LEN);
    Ok(raw[..end].iter().map(|&b| char::from(b)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(magic: &[u8; 4], version: u16, load: u16) -> Vec<u8> {
        let size = if version < 2 {
            HEADER_V1_SIZE
        } else {
            HEADER_V2_SIZE
        };
        let mut bytes = vec![0u8; size];
        bytes[MAGIC..MAGIC + 4].copy_from_slice(magic);
        bytes[VERSION..VERSION + 2].copy_from_slice(&version.to_be_bytes());
        bytes[DATA_OFFSET..DATA_OFFSET + 2].copy_from_slice(&(size as u16).to_be_bytes());
        bytes[LOAD_ADDRESS..LOAD_ADDRESS + 2].copy_from_slice(&load.to_be_bytes());
        bytes[INIT_ADDRESS..INIT_ADDRESS + 2].copy_from_slice(&0x1000u16.to_be_bytes());
        bytes[PLAY_ADDRESS..PLAY_ADDRESS + 2].copy_from_slice(&0x1003u16.to_be_bytes());
        bytes[SONGS..SONGS + 2].copy_from_slice(&3u16.to_be_bytes());
        bytes[START_SONG..START_SONG + 2].copy_from_slice(&1u16.to_be_bytes());
        bytes[NAME..NAME + 8].copy_from_slice(b"Commando");
        bytes[AUTHOR..AUTHOR + 8].copy_from_slice(b"Rob Hubb");
        bytes[RELEASED..RELEASED + 4].copy_from_slice(b"1985");
        bytes
    }

    #[test]
    fn version_1_header() {
        let bytes = header(PSID_MAGIC, 1, 0x1000);
        let h = PsidHeader::parse(&bytes).unwrap();
        assert_eq!(h.format, SidFormat::Psid);
        assert_eq!(h.version, 1);
        assert_eq!(h.data_offset, 0x76);
        assert_eq!(h.init_address, 0x1000);
        assert_eq!(h.play_address, 0x1003);
        assert_eq!((h.songs, h.start_song), (3, 1));
        assert_eq!(h.name, "Commando");
        assert_eq!(h.author, "Rob Hubb");
        assert_eq!(h.released, "1985");
        assert_eq!(h.flags, 0);
        assert_eq!(h.second_sid_address(), None);
    }

    #[test]
    fn version_2_fields() {
        let mut bytes = header(RSID_MAGIC, 3, 0);
        bytes[FLAGS..FLAGS + 2].copy_from_slice(&0x0014u16.to_be_bytes());
        bytes[START_PAGE] = 0x04;
        bytes[PAGE_LENGTH] = 0x08;
        bytes[SECOND_SID] = 0x42;
        bytes[THIRD_SID] = 0x43;

        let h = PsidHeader::parse(&bytes).unwrap();
        assert_eq!(h.format, SidFormat::Rsid);
        assert_eq!(h.clock(), Clock::Pal);
        assert_eq!(h.sid_model(), SidModel::Mos6581);
        assert_eq!((h.start_page, h.page_length), (0x04, 0x08));
        assert_eq!(h.second_sid_address(), Some(0xd420));
        // Odd addresses are invalid.
        assert_eq!(h.third_sid_address(), None);
    }

    #[test]
    fn sid_address_ranges() {
        assert_eq!(valid_sid_address(0x40), 0);
        assert_eq!(valid_sid_address(0x42), 0x42);
        assert_eq!(valid_sid_address(0x7e), 0x7e);
        assert_eq!(valid_sid_address(0x80), 0);
        assert_eq!(valid_sid_address(0xde), 0);
        assert_eq!(valid_sid_address(0xe0), 0xe0);
        assert_eq!(valid_sid_address(0xfe), 0xfe);
    }

    #[test]
    fn load_range_from_header() {
        let mut bytes = header(PSID_MAGIC, 2, 0x1000);
        bytes.extend_from_slice(&[0xea; 0x100]);
        let h = PsidHeader::parse(&bytes).unwrap();
        assert_eq!(h.load_range(&bytes), Ok((0x1000, 0x10ff)));
    }

    #[test]
    fn load_range_from_data() {
        let mut bytes = header(PSID_MAGIC, 2, 0);
        bytes.extend_from_slice(&[0x00, 0x20]);
        bytes.extend_from_slice(&[0xea; 0x10]);
        let h = PsidHeader::parse(&bytes).unwrap();
        assert_eq!(h.load_range(&bytes), Ok((0x2000, 0x200f)));
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(
            PsidHeader::parse(b"MThd\0\x01"),
            Err(PsidError::InvalidMagic(*b"MThd"))
        );
        assert_eq!(
            PsidHeader::parse(&header(PSID_MAGIC, 9, 0)),
            Err(PsidError::UnsupportedVersion(9))
        );

        let mut short = header(PSID_MAGIC, 2, 0);
        short.truncate(0x77);
        assert!(matches!(
            PsidHeader::parse(&short),
            Err(PsidError::OffsetOutOfRange { needed: 0x7c, .. })
        ));
        assert!(PsidHeader::parse(b"PS").is_err());
    }
}
