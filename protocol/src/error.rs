//! Error types for the ledger.
//!
//! Every fallible operation returns a [`LedgerError`]. Whole-chain
//! verification has its own [`IntegrityError`] because a broken chain is
//! a finding about the data, not a failure of the operation.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by record construction, mining, and snapshot I/O.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A previous-hash reference is not a 64-character hex digest.
    #[error("invalid previous hash {value:?}: {reason}")]
    InvalidPreviousHash {
        /// The rejected value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Mining hit the configured attempt ceiling without finding a proof.
    #[error("no proof of work found after {attempts} attempts")]
    MiningExhausted {
        /// Candidate nonces tried before giving up.
        attempts: u64,
    },

    /// Miner configuration can never produce a valid record.
    #[error("invalid miner configuration: {0}")]
    InvalidConfig(String),

    /// No record exists at the requested position.
    #[error("no record at index {index} (chain length {len})")]
    IndexOutOfRange {
        /// Requested position.
        index: usize,
        /// Current chain length.
        len: usize,
    },

    /// The named snapshot file does not exist.
    #[error("snapshot not found: {}", path.display())]
    SnapshotNotFound {
        /// Resolved snapshot path.
        path: PathBuf,
    },

    /// The snapshot bytes could not be decoded.
    #[error("corrupt snapshot: {0}")]
    CorruptSnapshot(String),

    /// The snapshot was written by an incompatible layout version.
    #[error("unsupported snapshot version {found} (expected {expected})")]
    UnsupportedSnapshotVersion {
        /// Version found in the file header.
        found: u16,
        /// Version this build writes.
        expected: u16,
    },

    /// Underlying filesystem failure.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File being read or written.
        path: PathBuf,
        /// The OS error.
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, LedgerError>;

/// A structural defect found while verifying a chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityError {
    /// The first record is not a well-formed genesis record.
    #[error("malformed genesis record: {0}")]
    MalformedGenesis(String),

    /// A record's index does not match its position.
    #[error("record at position {position} has index {index}")]
    IndexMismatch {
        /// Position in the chain.
        position: usize,
        /// Index stored in the record.
        index: u64,
    },

    /// A record's previous hash does not match its predecessor's hash.
    #[error("broken link at index {index}: expected {expected}, found {found}")]
    BrokenLink {
        /// Index of the record with the stale reference.
        index: u64,
        /// The predecessor's actual hash.
        expected: String,
        /// The stored reference.
        found: String,
    },

    /// A record's hash no longer satisfies the proof target.
    #[error("invalid proof of work at index {index}: hash {hash}")]
    InvalidProof {
        /// Index of the offending record.
        index: u64,
        /// Its current hash.
        hash: String,
    },
}
