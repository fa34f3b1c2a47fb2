//! # Hashing Utilities
//!
//! SHA-256 is the only hash function the ledger uses. Digests are carried
//! as lowercase hex strings, and the proof target is expressed in that
//! alphabet: "the first four hex digits are `6`".

use sha2::{Digest, Sha256};

use crate::config::HASH_HEX_LENGTH;

/// Compute the SHA-256 hash of several parts fed in sequence, returned as
/// lowercase hex.
///
/// Feeding parts one by one gives the same digest as hashing their
/// concatenation.
///
/// # Example
///
/// ```
/// use powchain::crypto::sha256_hex;
///
/// let hash = sha256_hex(&[b"pow", b"chain"]);
/// assert_eq!(hash, sha256_hex(&[b"powchain"]));
/// assert_eq!(hash.len(), 64);
/// ```
pub fn sha256_hex(parts: &[&[u8]]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hex::encode(hasher.finalize())
}

/// True if `c` is a digit of the lowercase hex alphabet.
pub fn is_digest_char(c: char) -> bool {
    matches!(c, '0'..='9' | 'a'..='f')
}

/// True if `s` is a digest as [`sha256_hex`] writes it: exactly 64
/// lowercase hex digits.
pub fn is_hex_digest(s: &str) -> bool {
    s.len() == HASH_HEX_LENGTH && s.chars().all(is_digest_char)
}
