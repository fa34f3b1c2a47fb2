//! # Ledger Configuration & Constants
//!
//! Every magic number in powchain lives here. If you're hardcoding a
//! constant somewhere else, you're doing it wrong.
//!
//! The proof-of-work constants define which records the ledger accepts.
//! Changing them invalidates every snapshot ever written with the old
//! values, so treat them as part of the on-disk format.

use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

// ---------------------------------------------------------------------------
// Proof-of-Work
// ---------------------------------------------------------------------------

/// The hex character a record hash must start with.
pub const PROOF_CHAR: char = '6';

/// How many copies of [`PROOF_CHAR`] must prefix the hash.
/// Four hex digits = 16 bits of work, ~65k SHA-256 evaluations on average.
pub const DIFFICULTY: usize = 4;

/// Mining always starts from this nonce. Zero is never tried.
pub const FIRST_NONCE: u64 = 1;

// ---------------------------------------------------------------------------
// Digests
// ---------------------------------------------------------------------------

/// SHA-256 output length in bytes.
pub const HASH_OUTPUT_LENGTH: usize = 32;

/// Length of a hex-encoded digest. Every `previous_hash` must be exactly this long.
pub const HASH_HEX_LENGTH: usize = HASH_OUTPUT_LENGTH * 2;

// ---------------------------------------------------------------------------
// Genesis
// ---------------------------------------------------------------------------

/// Payload carried by the genesis record.
pub const GENESIS_PAYLOAD: &str = "Genesis Block";

/// The genesis record has no predecessor, so it points at the all-zero digest.
pub const GENESIS_PREVIOUS_HASH: &str =
    "0000000000000000000000000000000000000000000000000000000000000000";

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// File extension appended to a chain name when saving or loading.
pub const SNAPSHOT_EXTENSION: &str = "dat";

/// First four bytes of every snapshot file.
pub const SNAPSHOT_MAGIC: [u8; 4] = *b"PWCH";

/// Current snapshot layout version. Bump when the record encoding changes.
pub const SNAPSHOT_VERSION: u16 = 1;

// ---------------------------------------------------------------------------
// Mining
// ---------------------------------------------------------------------------

/// Default number of mining threads. One thread reproduces the reference
/// search exactly; more threads find the same nonce faster.
pub const DEFAULT_MINING_WORKERS: usize = 1;

/// Upper bound on mining threads. Past this the coordination overhead
/// dominates a 16-bit search.
pub const MAX_MINING_WORKERS: usize = 256;

/// The structural condition a record hash must satisfy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofTarget {
    /// Required leading hex character.
    pub character: char,
    /// Number of leading characters that must match.
    pub difficulty: usize,
}

impl ProofTarget {
    /// True if `hash` starts with `difficulty` copies of `character`.
    ///
    /// Hashes shorter than the difficulty never meet the target.
    pub fn is_met_by(&self, hash: &str) -> bool {
        let mut chars = hash.chars();
        (0..self.difficulty).all(|_| chars.next() == Some(self.character))
    }
}

impl Default for ProofTarget {
    fn default() -> Self {
        Self {
            character: PROOF_CHAR,
            difficulty: DIFFICULTY,
        }
    }
}

/// Runtime knobs for the proof-of-work search.
///
/// The proof target itself is not configurable: a record's validity is
/// judged against [`ProofTarget::default`] wherever it is checked.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinerConfig {
    /// Number of threads racing over the nonce space.
    pub workers: usize,
    /// Give up after this many candidate nonces. `None` searches forever.
    pub max_attempts: Option<u64>,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_MINING_WORKERS,
            max_attempts: None,
        }
    }
}

impl MinerConfig {
    /// Builder-style override for the worker count.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Builder-style override for the attempt ceiling.
    pub fn with_max_attempts(mut self, max_attempts: Option<u64>) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Reject configurations that could never produce a valid record.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.workers == 0 || self.workers > MAX_MINING_WORKERS {
            return Err(LedgerError::InvalidConfig(format!(
                "workers must be between 1 and {MAX_MINING_WORKERS}, got {}",
                self.workers
            )));
        }
        if self.max_attempts == Some(0) {
            return Err(LedgerError::InvalidConfig(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genesis_previous_hash_shape() {
        assert_eq!(GENESIS_PREVIOUS_HASH.len(), HASH_HEX_LENGTH);
        assert!(GENESIS_PREVIOUS_HASH.chars().all(|c| c == '0'));
    }

    #[test]
    fn test_default_target() {
        let target = ProofTarget::default();
        assert_eq!(target.character, '6');
        assert_eq!(target.difficulty, 4);
    }

    #[test]
    fn test_target_matching() {
        let target = ProofTarget::default();
        assert!(target.is_met_by("6666abcdef"));
        assert!(!target.is_met_by("666abcdef"));
        assert!(!target.is_met_by("a6666"));
        assert!(!target.is_met_by("666"));
    }

    #[test]
    fn test_snapshot_magic_is_ascii() {
        assert!(SNAPSHOT_MAGIC.iter().all(|b| b.is_ascii_uppercase()));
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(MinerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_proof_constants_sanity() {
        assert!(PROOF_CHAR.is_ascii_hexdigit());
        assert!(!PROOF_CHAR.is_ascii_uppercase());
        assert!(DIFFICULTY > 0 && DIFFICULTY <= HASH_HEX_LENGTH);
    }

    #[test]
    fn test_invalid_configs_rejected() {
        let no_workers = MinerConfig::default().with_workers(0);
        assert!(no_workers.validate().is_err());

        let too_many = MinerConfig::default().with_workers(MAX_MINING_WORKERS + 1);
        assert!(too_many.validate().is_err());

        let no_attempts = MinerConfig::default().with_max_attempts(Some(0));
        assert!(no_attempts.validate().is_err());
    }
}
