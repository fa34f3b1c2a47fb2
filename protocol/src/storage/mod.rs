//! # Storage Module
//!
//! Persistence for the ledger. A chain is saved and restored as one
//! snapshot file; there is no incremental log and no database.
//!
//! ## Design Decisions
//!
//! 1. **Bincode on disk.** JSON is only used by the CLI's `show --json`.
//!
//! 2. **Explicit header.** Magic bytes plus a version number up front, so a
//!    future layout change is detected instead of misparsed.

pub mod snapshot;

pub use snapshot::snapshot_path;
