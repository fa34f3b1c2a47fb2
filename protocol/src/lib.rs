// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # powchain: Core Library
//!
//! A tamper-evident, append-only ledger. Every record carries a SHA-256
//! hash pointer to its predecessor and a proof-of-work nonce that makes its
//! own hash start with `"6666"`. Change a byte anywhere and either a link or
//! a proof stops checking out.
//!
//! This is a single-process, single-writer integrity structure, not a
//! distributed ledger: no peers, no consensus, no transactions.
//!
//! ## Architecture
//!
//! - **config**: Proof-of-work constants, genesis constants, miner settings.
//! - **crypto**: SHA-256 helpers speaking lowercase hex.
//! - **ledger**: Records, the miner, and the chain that links them.
//! - **storage**: Versioned whole-chain snapshots on disk.
//! - **error**: Typed failures and integrity findings.
//!
//! ## Example
//!
//! ```
//! use powchain::Chain;
//!
//! let mut chain = Chain::new();
//! chain.append("A").unwrap();
//! chain.append("B").unwrap();
//!
//! assert_eq!(chain.len(), 3); // genesis + 2
//! assert_eq!(chain[2].previous_hash(), chain[1].hash());
//! assert!(chain.verify().is_ok());
//! ```

pub mod config;
pub mod crypto;
pub mod error;
pub mod ledger;
pub mod storage;

pub use config::{MinerConfig, ProofTarget};
pub use error::{IntegrityError, LedgerError, Result};
pub use ledger::{Chain, Miner, MiningOutcome, Record};
