//! # Record Structure
//!
//! A record is the atomic unit of the ledger: an index, an opaque payload,
//! a reference to the predecessor's hash, and the proof-of-work nonce that
//! made the record acceptable.
//!
//! ## Record Layout
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Record                                     │
//! │  ├── index: u64            (0 = genesis)    │
//! │  ├── payload: String                        │
//! │  ├── previous_hash: String (64 hex chars)   │
//! │  ├── nonce: u64            (found by mining)│
//! │  └── timestamp: f64        (secs, mined at) │
//! ├─────────────────────────────────────────────┤
//! │  hash  = SHA-256(index‖payload‖prev‖nonce)  │
//! │  valid = hash starts with "6666"            │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Hash Computation
//!
//! The hash is never stored. It is recomputed from the current fields on
//! every access, so overwriting `previous_hash` changes the hash without
//! re-mining. That is how chain repair works, and it is also why a
//! repaired record whose payload was tampered with stops being valid.

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::miner::{record_hash, Miner};
use crate::config::{ProofTarget, GENESIS_PAYLOAD, GENESIS_PREVIOUS_HASH, HASH_HEX_LENGTH};
use crate::crypto::{is_digest_char, is_hex_digest};
use crate::error::{LedgerError, Result};

/// A mined ledger entry.
///
/// Every field except `previous_hash` is write-once. Construction runs the
/// proof-of-work search to completion, so a partially mined record is
/// never observable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Record {
    index: u64,
    payload: String,
    previous_hash: String,
    nonce: u64,
    timestamp: f64,
}

impl Record {
    /// Mine a new record with the default single-threaded, unbounded miner.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidPreviousHash`] if `previous_hash` is not
    /// a 64-character lowercase hex digest.
    pub fn new(
        index: u64,
        payload: impl Into<String>,
        previous_hash: impl Into<String>,
    ) -> Result<Self> {
        Self::mine_with(&Miner::default(), index, payload, previous_hash)
    }

    /// Mine a new record using the given miner.
    pub fn mine_with(
        miner: &Miner,
        index: u64,
        payload: impl Into<String>,
        previous_hash: impl Into<String>,
    ) -> Result<Self> {
        let payload = payload.into();
        let previous_hash = previous_hash.into();
        check_previous_hash(&previous_hash)?;

        let outcome = miner.mine(index, &payload, &previous_hash)?;

        Ok(Self {
            index,
            payload,
            previous_hash,
            nonce: outcome.nonce,
            timestamp: now_seconds(),
        })
    }

    /// Mine the genesis record: index 0, the genesis payload, and the
    /// all-zero predecessor.
    pub fn genesis(miner: &Miner) -> Result<Self> {
        Self::mine_with(miner, 0, GENESIS_PAYLOAD, GENESIS_PREVIOUS_HASH)
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn previous_hash(&self) -> &str {
        &self.previous_hash
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    /// Wall-clock time the proof was found, in seconds since the Unix epoch.
    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    /// Hex digest of the record's current fields.
    pub fn hash(&self) -> String {
        record_hash(self.index, &self.payload, &self.previous_hash, self.nonce)
    }

    /// True if the current hash still satisfies the proof target.
    ///
    /// Checked against the fields as they are now, not as they were at
    /// mining time.
    pub fn is_valid(&self) -> bool {
        ProofTarget::default().is_met_by(&self.hash())
    }

    /// Overwrite the predecessor reference.
    ///
    /// This is an escape hatch for tamper testing; chains repair their own
    /// links through [`Chain::refresh`](super::Chain::refresh).
    pub fn set_previous_hash(&mut self, previous_hash: impl Into<String>) -> Result<()> {
        let previous_hash = previous_hash.into();
        check_previous_hash(&previous_hash)?;
        self.previous_hash = previous_hash;
        Ok(())
    }

    /// Link repair. The value always comes from a freshly computed digest.
    pub(crate) fn relink(&mut self, previous_hash: String) {
        self.previous_hash = previous_hash;
    }

    /// Re-check invariants that deserialization cannot enforce.
    pub(crate) fn check_shape(&self) -> Result<()> {
        check_previous_hash(&self.previous_hash)
    }

    #[cfg(test)]
    pub(crate) fn set_payload(&mut self, payload: impl Into<String>) {
        self.payload = payload.into();
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Index: {}", self.index)?;
        writeln!(f, "Previous Hash: {}", self.previous_hash)?;
        writeln!(f, "Payload: {}", self.payload)?;
        writeln!(f, "Nonce: {}", self.nonce)?;
        writeln!(f, "Hash: {}", self.hash())?;
        writeln!(f, "Timestamp: {}", self.timestamp)
    }
}

/// Validate a predecessor reference: exactly 64 lowercase hex digits.
pub(crate) fn check_previous_hash(value: &str) -> Result<()> {
    if is_hex_digest(value) {
        return Ok(());
    }
    let reason = match value.chars().find(|c| !is_digest_char(*c)) {
        Some(bad) => format!("{bad:?} is not a lowercase hex digit"),
        None => format!("expected {HASH_HEX_LENGTH} characters, got {}", value.len()),
    };
    Err(LedgerError::InvalidPreviousHash {
        value: value.to_string(),
        reason,
    })
}

fn now_seconds() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
