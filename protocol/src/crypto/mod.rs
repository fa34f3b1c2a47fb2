//! # Cryptographic Primitives
//!
//! A thin wrapper over `sha2`. We don't roll our own hashing; this module
//! only fixes the encoding (lowercase hex) the rest of the ledger speaks.

pub mod hash;

pub use hash::{is_digest_char, is_hex_digest, sha256_hex};
