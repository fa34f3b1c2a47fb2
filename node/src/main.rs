// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # powchain Node
//!
//! Entry point for the `powchain-node` binary. Parses CLI arguments,
//! initializes logging, and drives a [`Chain`] stored as a snapshot file
//! under the data directory.
//!
//! The binary supports six subcommands:
//!
//! - `demo`:    mine a sample chain in memory and print it
//! - `append`:  mine new records onto a stored chain
//! - `show`:    print a stored chain as text or JSON
//! - `verify`:  check a stored chain, exiting non-zero on any defect
//! - `refresh`: relink a stored chain and save it back
//! - `version`: print build version information

mod cli;
mod logging;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use std::path::{Path, PathBuf};

use powchain::{Chain, LedgerError, MinerConfig, Record};

use cli::{Commands, GlobalArgs, PowchainCli};
use logging::LogFormat;

/// Payloads cycled through by `demo`.
const DEMO_PAYLOADS: [&str; 4] = [
    "The first record in my test chain",
    "This is the second record",
    "This is the third record",
    "Number 4",
];

fn main() -> Result<()> {
    let cli = PowchainCli::parse();

    if let Commands::Version = cli.command {
        print_version();
        return Ok(());
    }

    logging::init_logging(
        logging::DEFAULT_FILTER,
        LogFormat::from_str_lossy(&cli.global.log_format),
    );

    let config = miner_config(&cli.global);
    match cli.command {
        Commands::Demo(args) => run_demo(&cli.global, config, args),
        Commands::Append(args) => append_records(&cli.global, config, args),
        Commands::Show(args) => show_chain(&cli.global, config, args),
        Commands::Verify(args) => verify_chain(&cli.global, config, args),
        Commands::Refresh(args) => refresh_chain(&cli.global, config, args),
        Commands::Version => Ok(()),
    }
}

fn miner_config(global: &GlobalArgs) -> MinerConfig {
    MinerConfig::default()
        .with_workers(global.workers)
        .with_max_attempts(global.max_attempts)
}

/// Snapshot name for `chain` inside the data directory (without `.dat`).
fn chain_name(global: &GlobalArgs, chain: &str) -> PathBuf {
    global.data_dir.join(chain)
}

/// Opens the chain stored under `name`, or an empty one if no snapshot
/// exists yet. Any other load failure is an error.
fn open_or_create(name: &Path, config: MinerConfig) -> Result<Chain> {
    let mut chain = Chain::with_miner(config).context("invalid miner configuration")?;
    match chain.load(name) {
        Ok(()) => {}
        Err(LedgerError::SnapshotNotFound { path }) => {
            tracing::info!(path = %path.display(), "no snapshot yet, starting a new chain");
        }
        Err(e) => {
            return Err(e).with_context(|| format!("failed to load chain {}", name.display()));
        }
    }
    Ok(chain)
}

/// Opens the chain stored under `name`. The snapshot must exist.
fn open_existing(name: &Path, config: MinerConfig) -> Result<Chain> {
    let mut chain = Chain::with_miner(config).context("invalid miner configuration")?;
    chain
        .load(name)
        .with_context(|| format!("failed to load chain {}", name.display()))?;
    Ok(chain)
}

/// Mines a sample chain and prints every record.
fn run_demo(global: &GlobalArgs, config: MinerConfig, args: cli::DemoArgs) -> Result<()> {
    let mut chain = Chain::with_miner(config).context("invalid miner configuration")?;

    for i in 0..args.records {
        let payload = match DEMO_PAYLOADS.get(i) {
            Some(payload) => payload.to_string(),
            None => format!("Record {}", i + 1),
        };
        chain
            .append(payload)
            .with_context(|| format!("failed to mine demo record {}", i + 1))?;
    }

    for record in &chain {
        println!("{record}");
    }

    if let Some(name) = args.save {
        let path = chain
            .save(chain_name(global, &name))
            .context("failed to save demo chain")?;
        println!("Saved {} records to {}", chain.len(), path.display());
    }
    Ok(())
}

/// Appends each payload in order and saves the chain once all are mined.
fn append_records(global: &GlobalArgs, config: MinerConfig, args: cli::AppendArgs) -> Result<()> {
    let name = chain_name(global, &args.chain);
    let mut chain = open_or_create(&name, config)?;

    for payload in args.payloads {
        let record = chain.append(payload).context("failed to mine record")?;
        println!("{record}");
    }

    let path = chain.save(&name).context("failed to save chain")?;
    println!("Saved {} records to {}", chain.len(), path.display());
    Ok(())
}

/// JSON view of a record, including the derived hash and validity.
#[derive(Debug, Serialize)]
struct RecordView<'a> {
    index: u64,
    payload: &'a str,
    previous_hash: &'a str,
    nonce: u64,
    hash: String,
    timestamp: f64,
    valid: bool,
}

impl<'a> From<&'a Record> for RecordView<'a> {
    fn from(record: &'a Record) -> Self {
        Self {
            index: record.index(),
            payload: record.payload(),
            previous_hash: record.previous_hash(),
            nonce: record.nonce(),
            hash: record.hash(),
            timestamp: record.timestamp(),
            valid: record.is_valid(),
        }
    }
}

fn show_chain(global: &GlobalArgs, config: MinerConfig, args: cli::ShowArgs) -> Result<()> {
    let chain = open_existing(&chain_name(global, &args.chain), config)?;

    if args.json {
        let views: Vec<RecordView<'_>> = chain.iter().map(RecordView::from).collect();
        let json = serde_json::to_string_pretty(&views).context("failed to encode chain")?;
        println!("{json}");
    } else {
        for record in &chain {
            println!("{record}");
        }
    }
    Ok(())
}

fn verify_chain(global: &GlobalArgs, config: MinerConfig, args: cli::ChainArgs) -> Result<()> {
    let chain = open_existing(&chain_name(global, &args.chain), config)?;

    match chain.verify() {
        Ok(()) => {
            println!("Chain '{}' is intact ({} records)", args.chain, chain.len());
            Ok(())
        }
        Err(defect) => bail!("chain '{}' failed verification: {defect}", args.chain),
    }
}

fn refresh_chain(global: &GlobalArgs, config: MinerConfig, args: cli::ChainArgs) -> Result<()> {
    let name = chain_name(global, &args.chain);
    let mut chain = open_existing(&name, config)?;

    chain.refresh();
    let path = chain.save(&name).context("failed to save chain")?;

    let invalid = chain.iter().filter(|record| !record.is_valid()).count();
    println!(
        "Relinked {} records in {} ({} failing proof-of-work)",
        chain.len(),
        path.display(),
        invalid
    );
    Ok(())
}

/// Prints version information to stdout.
fn print_version() {
    println!("powchain-node {}", env!("CARGO_PKG_VERSION"));
    println!("snapshot      v{}", powchain::config::SNAPSHOT_VERSION);
    println!("rustc         {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}
