//! In-memory chain management: genesis synthesis, append-with-link, link
//! repair, whole-chain verification, and the snapshot boundary.

use std::ops::Index;
use std::path::{Path, PathBuf};
use std::slice;

use tracing::{info, warn};

use super::miner::Miner;
use super::record::{check_previous_hash, Record};
use crate::config::{MinerConfig, GENESIS_PAYLOAD, GENESIS_PREVIOUS_HASH};
use crate::error::{IntegrityError, LedgerError, Result};
use crate::storage::snapshot;

/// Ordered, append-only sequence of mined records.
///
/// The chain is single-writer: every mutating operation takes `&mut self`.
#[derive(Debug, Clone, Default)]
pub struct Chain {
    records: Vec<Record>,
    miner: Miner,
}

impl Chain {
    /// An empty chain with the default single-threaded miner.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty chain that mines with the given configuration.
    pub fn with_miner(config: MinerConfig) -> Result<Self> {
        Ok(Self {
            records: Vec::new(),
            miner: Miner::new(config)?,
        })
    }

    /// Wrap already-mined records, e.g. from a snapshot. No integrity check
    /// is performed; call [`Chain::verify`] for that.
    pub fn from_records(records: Vec<Record>) -> Self {
        Self {
            records,
            miner: Miner::default(),
        }
    }

    pub fn miner_config(&self) -> &MinerConfig {
        self.miner.config()
    }

    /// Mine a record carrying `payload` and link it to the tail.
    ///
    /// On an empty chain the genesis record is mined first. Both records are
    /// pushed only once mining has succeeded, so a failed append leaves the
    /// chain untouched.
    pub fn append(&mut self, payload: impl Into<String>) -> Result<&Record> {
        let (genesis, index, previous_hash) = match self.records.last() {
            Some(tail) => (None, tail.index() + 1, tail.hash()),
            None => {
                let genesis = Record::genesis(&self.miner)?;
                let (index, hash) = (genesis.index() + 1, genesis.hash());
                (Some(genesis), index, hash)
            }
        };

        let record = Record::mine_with(&self.miner, index, payload, previous_hash)?;

        if let Some(genesis) = genesis {
            info!(hash = %genesis.hash(), nonce = genesis.nonce(), "genesis record mined");
            self.records.push(genesis);
        }
        info!(index, nonce = record.nonce(), "record appended");
        self.records.push(record);

        Ok(&self.records[self.records.len() - 1])
    }

    /// Recompute every `previous_hash` from the actual hash of the record
    /// before it, starting from the all-zero digest.
    ///
    /// Repairs linkage only. Nothing is re-mined, so a record whose content
    /// changed (and every record after it, whose reference now changes)
    /// keeps a consistent link but fails its proof-of-work check.
    pub fn refresh(&mut self) {
        let mut expected = GENESIS_PREVIOUS_HASH.to_string();
        let mut relinked = 0usize;
        for record in &mut self.records {
            if record.previous_hash() != expected {
                relinked += 1;
            }
            record.relink(expected);
            expected = record.hash();
        }
        info!(len = self.records.len(), relinked, "chain refreshed");
    }

    /// Overwrite the predecessor reference of the record at `index`.
    ///
    /// Exists for tamper testing; normal operation only ever changes links
    /// through [`Chain::refresh`].
    pub fn set_previous_hash(&mut self, index: usize, previous_hash: &str) -> Result<()> {
        check_previous_hash(previous_hash)?;
        let len = self.records.len();
        let record = self
            .records
            .get_mut(index)
            .ok_or(LedgerError::IndexOutOfRange { index, len })?;
        record.relink(previous_hash.to_string());
        Ok(())
    }

    /// Check genesis shape, index sequence, every link, and every proof.
    ///
    /// Reports the first defect found, walking front to back. An empty
    /// chain is trivially intact.
    pub fn verify(&self) -> std::result::Result<(), IntegrityError> {
        let result = self.find_defect();
        if let Err(defect) = &result {
            warn!(%defect, "chain verification failed");
        }
        result
    }

    /// Boolean form of [`Chain::verify`].
    pub fn is_valid(&self) -> bool {
        self.find_defect().is_ok()
    }

    fn find_defect(&self) -> std::result::Result<(), IntegrityError> {
        let Some(genesis) = self.records.first() else {
            return Ok(());
        };
        if genesis.previous_hash() != GENESIS_PREVIOUS_HASH {
            return Err(IntegrityError::MalformedGenesis(format!(
                "previous hash is {}",
                genesis.previous_hash()
            )));
        }
        if genesis.payload() != GENESIS_PAYLOAD {
            return Err(IntegrityError::MalformedGenesis(format!(
                "payload is {:?}",
                genesis.payload()
            )));
        }

        let mut expected_link: Option<String> = None;
        for (position, record) in self.records.iter().enumerate() {
            if record.index() != position as u64 {
                return Err(IntegrityError::IndexMismatch {
                    position,
                    index: record.index(),
                });
            }
            let hash = record.hash();
            if let Some(expected) = expected_link.take() {
                if record.previous_hash() != expected {
                    return Err(IntegrityError::BrokenLink {
                        index: record.index(),
                        expected,
                        found: record.previous_hash().to_string(),
                    });
                }
            }
            if !record.is_valid() {
                return Err(IntegrityError::InvalidProof {
                    index: record.index(),
                    hash,
                });
            }
            expected_link = Some(hash);
        }
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Front-to-back iterator over the records.
    pub fn iter(&self) -> slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn genesis(&self) -> Option<&Record> {
        self.records.first()
    }

    /// The most recently appended record.
    pub fn tip(&self) -> Option<&Record> {
        self.records.last()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    // -- Persistence ---------------------------------------------------------

    /// Write a full snapshot to `<name>.dat` and return the path written.
    pub fn save(&self, name: impl AsRef<Path>) -> Result<PathBuf> {
        let path = snapshot::snapshot_path(name);
        snapshot::write(&path, &self.records)?;
        info!(path = %path.display(), len = self.records.len(), "chain saved");
        Ok(path)
    }

    /// Replace the in-memory records with the snapshot at `<name>.dat`.
    ///
    /// The miner configuration is kept. On error the chain is unchanged.
    pub fn load(&mut self, name: impl AsRef<Path>) -> Result<()> {
        let path = snapshot::snapshot_path(name);
        self.records = snapshot::read(&path)?;
        info!(path = %path.display(), len = self.records.len(), "chain loaded");
        Ok(())
    }
}

impl Index<usize> for Chain {
    type Output = Record;

    fn index(&self, index: usize) -> &Record {
        &self.records[index]
    }
}

impl<'a> IntoIterator for &'a Chain {
    type Item = &'a Record;
    type IntoIter = slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn chain_of(payloads: &[&str]) -> Chain {
        let mut chain = Chain::new();
        for payload in payloads {
            chain.append(*payload).unwrap();
        }
        chain
    }

    fn links_are_consistent(chain: &Chain) -> bool {
        chain.genesis().map(|g| g.previous_hash()) == Some(GENESIS_PREVIOUS_HASH)
            && chain
                .records()
                .windows(2)
                .all(|pair| pair[1].previous_hash() == pair[0].hash())
    }

    #[test]
    fn empty_chain() {
        let chain = Chain::new();
        assert!(chain.is_empty());
        assert_eq!(chain.len(), 0);
        assert!(chain.tip().is_none());
        assert!(chain.verify().is_ok());
    }

    #[test]
    fn first_append_synthesizes_genesis() {
        let chain = chain_of(&["first"]);
        assert_eq!(chain.len(), 2);

        let genesis = &chain[0];
        assert_eq!(genesis.index(), 0);
        assert_eq!(genesis.payload(), GENESIS_PAYLOAD);
        assert_eq!(genesis.previous_hash(), "0".repeat(64));

        let first = &chain[1];
        assert_eq!(first.index(), 1);
        assert_eq!(first.payload(), "first");
        assert_eq!(first.previous_hash(), genesis.hash());
    }

    #[test]
    fn append_returns_new_tip() {
        let mut chain = Chain::new();
        let index = chain.append("tip").unwrap().index();
        assert_eq!(index, 1);
        assert_eq!(chain.tip().unwrap().payload(), "tip");
    }

    #[test]
    fn abc_scenario() {
        let chain = chain_of(&["A", "B", "C"]);
        assert_eq!(chain.len(), 4);
        assert_eq!(chain[1].payload(), "A");
        assert_eq!(chain[3].index(), 3);
        assert_eq!(chain[3].previous_hash(), chain[2].hash());
        assert!(chain.iter().all(Record::is_valid));
        assert!(chain.verify().is_ok());
    }

    #[test]
    fn indices_have_no_gaps() {
        let chain = chain_of(&["1", "2", "3", "4", "5"]);
        assert_eq!(chain.len(), 6);
        let indices: Vec<u64> = chain.iter().map(Record::index).collect();
        assert_eq!(indices, (0..=5).collect::<Vec<u64>>());
    }

    #[test]
    fn iteration_is_front_to_back() {
        let chain = chain_of(&["x", "y"]);
        let payloads: Vec<&str> = (&chain).into_iter().map(Record::payload).collect();
        assert_eq!(payloads, vec![GENESIS_PAYLOAD, "x", "y"]);
    }

    #[test]
    fn refresh_is_idempotent() {
        let mut chain = chain_of(&["a", "b"]);
        chain.refresh();
        let first: Vec<String> = chain.iter().map(|r| r.previous_hash().to_string()).collect();
        chain.refresh();
        let second: Vec<String> = chain.iter().map(|r| r.previous_hash().to_string()).collect();
        assert_eq!(first, second);
        assert!(chain.verify().is_ok());
    }

    #[test]
    fn refresh_repairs_corrupted_link() {
        let mut chain = chain_of(&["a", "b", "c"]);
        let original = chain[2].previous_hash().to_string();
        chain.set_previous_hash(2, &"f".repeat(64)).unwrap();
        assert!(!links_are_consistent(&chain));

        chain.refresh();
        assert!(links_are_consistent(&chain));
        assert_eq!(chain[2].previous_hash(), original);
        assert!(chain.verify().is_ok());
    }

    #[test]
    fn tampered_payload_breaks_proof_after_refresh() {
        let mut chain = chain_of(&["a", "b", "c"]);
        chain.records[2].set_payload("tampered");
        assert!(matches!(
            chain.verify(),
            Err(IntegrityError::InvalidProof { index: 2, .. })
        ));

        chain.refresh();
        assert!(links_are_consistent(&chain));
        assert!(chain[0].is_valid());
        assert!(chain[1].is_valid());
        assert!(!chain[2].is_valid());
        // Re-linking changes every downstream hash, so the damage propagates.
        assert!(!chain[3].is_valid());
    }

    #[test]
    fn tampered_tail_only_invalidates_tail() {
        let mut chain = chain_of(&["a", "b", "c"]);
        chain.records[3].set_payload("tampered");
        chain.refresh();
        assert!(links_are_consistent(&chain));
        let validity: Vec<bool> = chain.iter().map(Record::is_valid).collect();
        assert_eq!(validity, vec![true, true, true, false]);
    }

    #[test]
    fn verify_reports_broken_link() {
        let mut chain = chain_of(&["a", "b"]);
        chain.set_previous_hash(1, &"1".repeat(64)).unwrap();
        match chain.verify() {
            Err(IntegrityError::BrokenLink { index, found, .. }) => {
                assert_eq!(index, 1);
                assert_eq!(found, "1".repeat(64));
            }
            other => panic!("expected broken link, got {other:?}"),
        }
        assert!(!chain.is_valid());
    }

    #[test]
    fn verify_reports_malformed_genesis() {
        let mut chain = chain_of(&["a"]);
        chain.set_previous_hash(0, &"1".repeat(64)).unwrap();
        assert!(matches!(
            chain.verify(),
            Err(IntegrityError::MalformedGenesis(_))
        ));
    }

    #[test]
    fn set_previous_hash_rejects_bad_input() {
        let mut chain = chain_of(&["a"]);
        assert!(matches!(
            chain.set_previous_hash(1, "short"),
            Err(LedgerError::InvalidPreviousHash { .. })
        ));
        assert!(matches!(
            chain.set_previous_hash(9, &"0".repeat(64)),
            Err(LedgerError::IndexOutOfRange { index: 9, len: 2 })
        ));
    }

    #[test]
    fn failed_append_leaves_chain_untouched() {
        let genesis_nonce = Record::genesis(&Miner::default()).unwrap().nonce();
        // Enough attempts for genesis, not enough for the record after it.
        let config = MinerConfig::default().with_max_attempts(Some(genesis_nonce));
        let mut chain = Chain::with_miner(config).unwrap();

        let err = chain.append("doomed").unwrap_err();
        assert!(matches!(err, LedgerError::MiningExhausted { .. }));
        assert!(chain.is_empty());
    }

    #[test]
    fn parallel_chain_matches_sequential_chain() {
        let sequential = chain_of(&["p", "q"]);
        let mut parallel = Chain::with_miner(MinerConfig::default().with_workers(4)).unwrap();
        parallel.append("p").unwrap();
        parallel.append("q").unwrap();

        let nonces = |c: &Chain| c.iter().map(Record::nonce).collect::<Vec<_>>();
        assert_eq!(nonces(&sequential), nonces(&parallel));
        assert_eq!(sequential.tip().unwrap().hash(), parallel.tip().unwrap().hash());
    }

    #[test]
    fn from_records_adopts_existing_history() {
        let source = chain_of(&["a", "b"]);
        let mut adopted = Chain::from_records(source.records().to_vec());
        assert!(adopted.verify().is_ok());

        adopted.append("c").unwrap();
        assert_eq!(adopted.len(), 4);
        assert_eq!(adopted[3].previous_hash(), source[2].hash());
        assert!(links_are_consistent(&adopted));
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let name = dir.path().join("ledger");
        let chain = chain_of(&["persist", "me"]);

        let path = chain.save(&name).unwrap();
        assert_eq!(path, dir.path().join("ledger.dat"));

        let mut restored = Chain::new();
        restored.load(&name).unwrap();
        assert_eq!(restored.len(), chain.len());
        for (a, b) in chain.iter().zip(restored.iter()) {
            assert_eq!(a, b);
            assert_eq!(a.hash(), b.hash());
            assert_eq!(a.timestamp(), b.timestamp());
        }
    }

    #[test]
    fn load_missing_snapshot_keeps_chain() {
        let dir = tempfile::tempdir().unwrap();
        let mut chain = chain_of(&["keep"]);
        let err = chain.load(dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, LedgerError::SnapshotNotFound { .. }));
        assert_eq!(chain.len(), 2);
    }
}
