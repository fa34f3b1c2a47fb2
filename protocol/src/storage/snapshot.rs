//! # Chain Snapshots
//!
//! A snapshot is the whole ordered record list written to a single file.
//!
//! ## File Layout
//!
//! | Offset | Size | Field                                              |
//! |--------|------|----------------------------------------------------|
//! | 0      | 4    | magic `"PWCH"`                                     |
//! | 4      | 2    | layout version, little-endian u16 (currently `1`)  |
//! | 6      | ..   | `bincode(Vec<Record>)`                             |
//!
//! bincode writes the record list as a u64 length followed by each record's
//! fields in declaration order: `index` (u64), `payload` (length-prefixed
//! UTF-8), `previous_hash` (length-prefixed UTF-8), `nonce` (u64),
//! `timestamp` (f64). All integers are little-endian. Bytes left over
//! after the last record make the snapshot corrupt.
//!
//! ## Atomicity
//!
//! Writes go to `<path>.tmp` first and are renamed over the target, so a
//! crash mid-write leaves the previous snapshot intact. A failed rename
//! removes the staging file.
//!
//! Decoding checks the header and the shape of every `previous_hash`, but
//! not proof-of-work or linkage: a tampered chain must still load so it
//! can be inspected and repaired.

use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use bincode::Options;
use tracing::debug;

use crate::config::{SNAPSHOT_EXTENSION, SNAPSHOT_MAGIC, SNAPSHOT_VERSION};
use crate::error::{LedgerError, Result};
use crate::ledger::Record;

const HEADER_LEN: usize = SNAPSHOT_MAGIC.len() + 2;

/// Fixed-width little-endian integers, and nothing may follow the record
/// list.
fn codec() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
        .reject_trailing_bytes()
}

/// Resolve a chain name to its snapshot file: `<name>.dat`.
///
/// The extension is appended, never substituted, so `ledger.v2` maps to
/// `ledger.v2.dat`.
pub fn snapshot_path(name: impl AsRef<Path>) -> PathBuf {
    let mut path: OsString = name.as_ref().as_os_str().to_owned();
    path.push(".");
    path.push(SNAPSHOT_EXTENSION);
    PathBuf::from(path)
}

/// Serialize records into the versioned snapshot format.
pub fn encode(records: &[Record]) -> Result<Vec<u8>> {
    let body = codec()
        .serialize(records)
        .map_err(|e| LedgerError::CorruptSnapshot(e.to_string()))?;
    let mut bytes = Vec::with_capacity(HEADER_LEN + body.len());
    bytes.extend_from_slice(&SNAPSHOT_MAGIC);
    bytes.extend_from_slice(&SNAPSHOT_VERSION.to_le_bytes());
    bytes.extend_from_slice(&body);
    Ok(bytes)
}

/// Parse a snapshot produced by [`encode`].
pub fn decode(bytes: &[u8]) -> Result<Vec<Record>> {
    if bytes.len() < HEADER_LEN {
        return Err(LedgerError::CorruptSnapshot(format!(
            "truncated header: {} bytes",
            bytes.len()
        )));
    }
    let (header, body) = bytes.split_at(HEADER_LEN);
    if header[..SNAPSHOT_MAGIC.len()] != SNAPSHOT_MAGIC {
        return Err(LedgerError::CorruptSnapshot("bad magic bytes".to_string()));
    }
    let version = u16::from_le_bytes([header[4], header[5]]);
    if version != SNAPSHOT_VERSION {
        return Err(LedgerError::UnsupportedSnapshotVersion {
            found: version,
            expected: SNAPSHOT_VERSION,
        });
    }

    let records: Vec<Record> = codec()
        .deserialize(body)
        .map_err(|e| LedgerError::CorruptSnapshot(e.to_string()))?;
    for record in &records {
        record.check_shape()?;
    }
    Ok(records)
}

/// Write a snapshot to `path`, creating parent directories as needed.
pub fn write(path: &Path, records: &[Record]) -> Result<()> {
    let bytes = encode(records)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| LedgerError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, &bytes).map_err(|source| LedgerError::Io {
        path: tmp.clone(),
        source,
    })?;
    if let Err(source) = fs::rename(&tmp, path) {
        // The target is untouched; only the staging file needs to go.
        let _ = fs::remove_file(&tmp);
        return Err(LedgerError::Io {
            path: path.to_path_buf(),
            source,
        });
    }

    debug!(path = %path.display(), bytes = bytes.len(), "snapshot written");
    Ok(())
}

/// Read and decode the snapshot at `path`.
pub fn read(path: &Path) -> Result<Vec<Record>> {
    let bytes = fs::read(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => LedgerError::SnapshotNotFound {
            path: path.to_path_buf(),
        },
        _ => LedgerError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;
    debug!(path = %path.display(), bytes = bytes.len(), "snapshot read");
    decode(&bytes)
}
