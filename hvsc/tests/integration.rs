use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use hvsc::{BugEntry, Hvsc, HvscError, PsidFile, SidFormat};
use stil::{FieldKind, ParseOptions, PreambleFields, Timestamp};

const STIL: &str = "\
### Hubbard_Rob ###
/MUSICIANS/H/Hubbard_Rob/Commando.sid
COMMENT: One of the best known C64 tunes.
(#1)
  TITLE: Commando (0:00-3:30) [from Commando]
 ARTIST: Rob Hubbard
(#2)
  TITLE: High score

/MUSICIANS/H/Hubbard_Rob/Delta.sid
  TITLE: Delta loader (0:12)
";

const BUGS: &str = "\
/MUSICIANS/H/Hubbard_Rob/Commando.sid
(#2)
    BUG: Tune 2 plays at the wrong speed
         on NTSC machines. (Wilfred Bos)
";

const SONGLENGTHS: &str = "\
; Songlengths database
[Database]
; /MUSICIANS/H/Hubbard_Rob/Commando.sid
9c5b1e5ba8a3c4e4a3b9a5c0f3d7e2b1=3:30.500 0:16(G) 0:04
; /MUSICIANS/H/Hubbard_Rob/Delta.sid
; /MUSICIANS/H/Hubbard_Rob/Broken.sid
00000000000000000000000000000000=x:yy
";

fn collection() -> (TempDir, Hvsc) {
    let dir = tempfile::tempdir().expect("temp dir");
    let docs = dir.path().join("DOCUMENTS");
    fs::create_dir_all(&docs).unwrap();
    fs::write(docs.join("STIL.txt"), STIL).unwrap();
    fs::write(docs.join("BUGlist.txt"), BUGS).unwrap();
    fs::write(docs.join("Songlengths.md5"), SONGLENGTHS).unwrap();
    let hvsc = Hvsc::new(dir.path()).unwrap();
    (dir, hvsc)
}

fn sid(root: &Path, name: &str) -> std::path::PathBuf {
    root.join("MUSICIANS/H/Hubbard_Rob").join(name)
}

// ---------------------------------------------------------------------------
// STIL
// ---------------------------------------------------------------------------

#[test]
fn stil_lookup_by_absolute_path() {
    let (dir, hvsc) = collection();
    let doc = hvsc.stil(sid(dir.path(), "Commando.sid")).unwrap().unwrap();

    assert_eq!(doc.key(), "/MUSICIANS/H/Hubbard_Rob/Commando.sid");
    assert_eq!(doc.global_comment(), Some("One of the best known C64 tunes."));
    assert_eq!(doc.tunes().collect::<Vec<_>>(), vec![1, 2]);

    let title = &doc.get_tune(1).unwrap()[0];
    assert_eq!(title.kind, FieldKind::Title);
    assert_eq!(title.timestamp, Some(Timestamp::range(0, 210)));
    assert_eq!(title.album.as_deref(), Some("Commando"));
}

#[test]
fn stil_lookup_by_key() {
    let (_dir, hvsc) = collection();
    let doc = hvsc
        .stil("/MUSICIANS/H/Hubbard_Rob/Delta.sid")
        .unwrap()
        .unwrap();
    assert_eq!(doc.get_tune(1).unwrap()[0].timestamp, Some(Timestamp::at(12)));

    let legacy = ParseOptions {
        preamble_fields: PreambleFields::Drop,
    };
    let doc = hvsc
        .stil_with_options("/MUSICIANS/H/Hubbard_Rob/Delta.sid", legacy)
        .unwrap()
        .unwrap();
    assert_eq!(doc.get_tune(1), Some(&[][..]));
}

#[test]
fn stil_missing_entry_is_none() {
    let (dir, hvsc) = collection();
    assert!(hvsc.stil(sid(dir.path(), "Nope.sid")).unwrap().is_none());
    assert!(hvsc.stil_entry(sid(dir.path(), "Nope.sid")).unwrap().is_none());
}

#[test]
fn raw_entry_lines() {
    let (dir, hvsc) = collection();
    let entry = hvsc.stil_entry(sid(dir.path(), "Commando.sid")).unwrap().unwrap();
    assert_eq!(entry.len(), 6);
    assert_eq!(entry.lines()[0].text, "COMMENT: One of the best known C64 tunes.");
    assert_eq!(entry.lines()[0].number, 3);
}

#[test]
fn missing_stil_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let hvsc = Hvsc::new(dir.path()).unwrap();
    let err = hvsc.stil("/MUSICIANS/H/Hubbard_Rob/Commando.sid").unwrap_err();
    assert!(matches!(err, HvscError::Stil(stil::StilError::Open { .. })));
}

// ---------------------------------------------------------------------------
// BUGlist
// ---------------------------------------------------------------------------

#[test]
fn bug_report() {
    let (dir, hvsc) = collection();
    assert_eq!(
        hvsc.bug(sid(dir.path(), "Commando.sid")).unwrap(),
        Some(BugEntry {
            tune: 2,
            text: "Tune 2 plays at the wrong speed on NTSC machines.".to_owned(),
            user: Some("Wilfred Bos".to_owned()),
        })
    );
    assert_eq!(hvsc.bug(sid(dir.path(), "Delta.sid")).unwrap(), None);
}

// ---------------------------------------------------------------------------
// Songlengths
// ---------------------------------------------------------------------------

#[test]
fn song_lengths_by_key() {
    let (dir, hvsc) = collection();
    assert_eq!(
        hvsc.song_lengths(sid(dir.path(), "Commando.sid")).unwrap(),
        Some(vec![210, 16, 4])
    );
}

#[test]
fn key_without_lengths_is_none() {
    let (dir, hvsc) = collection();
    assert_eq!(hvsc.song_lengths(sid(dir.path(), "Delta.sid")).unwrap(), None);
    assert_eq!(hvsc.song_lengths(sid(dir.path(), "Nope.sid")).unwrap(), None);
}

#[test]
fn malformed_lengths_report_the_line() {
    let (dir, hvsc) = collection();
    let err = hvsc.song_lengths(sid(dir.path(), "Broken.sid")).unwrap_err();
    assert!(matches!(err, HvscError::InvalidSonglength { line: 7, .. }));
}

#[test]
fn song_lengths_follow_file_content_not_path() {
    let (dir, hvsc) = collection();
    fs::write(
        dir.path().join("DOCUMENTS/Songlengths.md5"),
        "[Database]\n; /MUSICIANS/X/Original.sid\n0d65cabd4edaed53c2c9cbf519c847b4=1:00 0:45.250\n",
    )
    .unwrap();
    let moved = dir.path().join("MUSICIANS/Y");
    fs::create_dir_all(&moved).unwrap();
    fs::write(moved.join("Renamed.sid"), "PSID tune bytes").unwrap();

    assert_eq!(
        hvsc.song_lengths(moved.join("Renamed.sid")).unwrap(),
        Some(vec![60, 45])
    );
    // Keys and root-relative paths reach the same file.
    assert_eq!(
        hvsc.song_lengths("/MUSICIANS/Y/Renamed.sid").unwrap(),
        Some(vec![60, 45])
    );
}

#[test]
fn unknown_content_falls_back_to_key() {
    let (dir, hvsc) = collection();
    let path = sid(dir.path(), "Commando.sid");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "bytes no database knows").unwrap();
    assert_eq!(hvsc.song_lengths(&path).unwrap(), Some(vec![210, 16, 4]));
}

#[test]
fn song_lengths_by_digest() {
    let (_dir, hvsc) = collection();
    let sldb = hvsc.songlengths();
    assert_eq!(
        sldb.lengths_for_digest("9C5B1E5BA8A3C4E4A3B9A5C0F3D7E2B1").unwrap(),
        Some(vec![210, 16, 4])
    );
    assert_eq!(
        sldb.lengths_for_digest("ffffffffffffffffffffffffffffffff").unwrap(),
        None
    );
    assert!(matches!(
        sldb.lengths_for_digest("not-a-digest"),
        Err(HvscError::InvalidDigest(_))
    ));
}

// ---------------------------------------------------------------------------
// PSID
// ---------------------------------------------------------------------------

#[test]
fn psid_file_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Tune.sid");

    let mut bytes = vec![0u8; 0x7c];
    bytes[0..4].copy_from_slice(b"PSID");
    bytes[4..6].copy_from_slice(&2u16.to_be_bytes());
    bytes[6..8].copy_from_slice(&0x7cu16.to_be_bytes());
    bytes[0x0e..0x10].copy_from_slice(&1u16.to_be_bytes());
    bytes[0x16..0x1a].copy_from_slice(b"Tune");
    bytes.extend_from_slice(&[0x00, 0x10, 0x60]);
    fs::write(&path, &bytes).unwrap();

    let file = PsidFile::open(&path).unwrap();
    assert_eq!(file.header.format, SidFormat::Psid);
    assert_eq!(file.header.name, "Tune");
    assert_eq!(file.load_range().unwrap(), (0x1000, 0x1000));

    let dump = file.to_string();
    assert!(dump.contains("load       : $1000-$1000\n"));
    assert!(dump.contains("second SID: none\n"));
}

#[test]
fn not_a_sid_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("readme.txt");
    fs::write(&path, "just some text that is long enough to have a header").unwrap();
    assert!(matches!(PsidFile::open(&path), Err(HvscError::Psid { .. })));
    assert!(matches!(
        PsidFile::open(dir.path().join("missing.sid")),
        Err(HvscError::Io { .. })
    ));
}
