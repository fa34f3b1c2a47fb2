//! # Proof-of-Work Search
//!
//! Mining is a pure function: `(index, payload, previous_hash) → nonce`.
//! There is no hidden state, so the same search can run on one thread or
//! on many without changing the answer.
//!
//! ## Parallel search
//!
//! With `W` workers, worker `w` owns the residue class
//! `FIRST_NONCE + w, FIRST_NONCE + w + W, …`. Winners are published through
//! a single `AtomicU64` holding the lowest winning nonce seen so far, and a
//! worker stops as soon as its next candidate exceeds that value. The
//! worker owning the globally smallest winner can never be stopped before
//! reaching it, so the elected nonce is exactly the one a sequential scan
//! finds.

use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Instant;

use tracing::debug;

use crate::config::{MinerConfig, ProofTarget, FIRST_NONCE};
use crate::crypto::sha256_hex;
use crate::error::{LedgerError, Result};

/// The result of a successful search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MiningOutcome {
    /// The winning nonce.
    pub nonce: u64,
    /// Hex digest produced by the winning nonce.
    pub hash: String,
    /// Candidate nonces evaluated across all workers.
    pub attempts: u64,
}

/// Hash the canonical preimage of a record:
/// `decimal(index) ‖ payload ‖ previous_hash ‖ decimal(nonce)`.
pub fn record_hash(index: u64, payload: &str, previous_hash: &str, nonce: u64) -> String {
    sha256_hex(&[
        index.to_string().as_bytes(),
        payload.as_bytes(),
        previous_hash.as_bytes(),
        nonce.to_string().as_bytes(),
    ])
}

fn candidate_hash(preimage: &str, nonce: u64) -> String {
    sha256_hex(&[preimage.as_bytes(), nonce.to_string().as_bytes()])
}

/// Brute-force nonce searcher.
#[derive(Clone, Debug, Default)]
pub struct Miner {
    config: MinerConfig,
    target: ProofTarget,
}

impl Miner {
    /// Build a miner, rejecting configurations that can never succeed.
    pub fn new(config: MinerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            target: ProofTarget::default(),
        })
    }

    pub fn config(&self) -> &MinerConfig {
        &self.config
    }

    /// Search for the smallest nonce ≥ [`FIRST_NONCE`] whose record hash
    /// meets the proof target.
    ///
    /// Blocks until a nonce is found. With `max_attempts` set, fails with
    /// [`LedgerError::MiningExhausted`] once that many nonces have been
    /// ruled out.
    pub fn mine(&self, index: u64, payload: &str, previous_hash: &str) -> Result<MiningOutcome> {
        let started = Instant::now();
        let preimage = format!("{index}{payload}{previous_hash}");
        let last_nonce = match self.config.max_attempts {
            Some(n) => FIRST_NONCE.saturating_add(n.saturating_sub(1)),
            None => u64::MAX,
        };

        let found = if self.config.workers <= 1 {
            self.search_sequential(&preimage, last_nonce)
        } else {
            self.search_parallel(&preimage, last_nonce)
        };

        match found {
            Some(outcome) => {
                debug!(
                    index,
                    nonce = outcome.nonce,
                    attempts = outcome.attempts,
                    workers = self.config.workers,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "proof of work found"
                );
                Ok(outcome)
            }
            None => Err(LedgerError::MiningExhausted {
                attempts: last_nonce - FIRST_NONCE + 1,
            }),
        }
    }

    fn search_sequential(&self, preimage: &str, last_nonce: u64) -> Option<MiningOutcome> {
        let mut nonce = FIRST_NONCE;
        loop {
            let hash = candidate_hash(preimage, nonce);
            if self.target.is_met_by(&hash) {
                return Some(MiningOutcome {
                    nonce,
                    hash,
                    attempts: nonce - FIRST_NONCE + 1,
                });
            }
            if nonce >= last_nonce {
                return None;
            }
            nonce += 1;
        }
    }

    fn search_parallel(&self, preimage: &str, last_nonce: u64) -> Option<MiningOutcome> {
        let workers = self.config.workers as u64;
        let target = self.target;
        let best = AtomicU64::new(u64::MAX);
        let attempts = AtomicU64::new(0);

        thread::scope(|scope| {
            for worker in 0..workers {
                let best = &best;
                let attempts = &attempts;
                scope.spawn(move || {
                    let mut nonce = FIRST_NONCE + worker;
                    let mut tried = 0u64;
                    while nonce <= last_nonce && nonce < best.load(Ordering::Acquire) {
                        tried += 1;
                        if target.is_met_by(&candidate_hash(preimage, nonce)) {
                            best.fetch_min(nonce, Ordering::AcqRel);
                            break;
                        }
                        nonce = match nonce.checked_add(workers) {
                            Some(next) => next,
                            None => break,
                        };
                    }
                    attempts.fetch_add(tried, Ordering::Relaxed);
                });
            }
        });

        let nonce = best.into_inner();
        if nonce == u64::MAX {
            return None;
        }
        Some(MiningOutcome {
            nonce,
            hash: candidate_hash(preimage, nonce),
            attempts: attempts.into_inner(),
        })
    }
}
