//! # Ledger Module
//!
//! The two cooperating abstractions that make up the ledger.
//!
//! ## Architecture
//!
//! ```text
//! miner.rs  : Pure proof-of-work search (sequential or parallel)
//! record.rs : A single mined record: fields, derived hash, validity
//! chain.rs  : Ordered records: genesis, append, refresh, verify, save/load
//! ```
//!
//! ## Data Flow
//!
//! ```text
//! Chain::append ─► Record::mine_with ─► Miner::mine
//!       │                                   │
//!       └──────── link to tail ◄── nonce ───┘
//! ```
//!
//! A record is mined to completion before the chain ever sees it. The
//! chain owns ordering and linkage; each record owns its own proof.

pub mod chain;
pub mod miner;
pub mod record;

pub use chain::Chain;
pub use miner::{record_hash, Miner, MiningOutcome};
pub use record::Record;
