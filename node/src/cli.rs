//! # CLI Interface
//!
//! Defines the command-line argument structure for `powchain-node` using
//! `clap` derive. Subcommands: `demo`, `append`, `show`, `verify`,
//! `refresh`, and `version`.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use powchain::config::DEFAULT_MINING_WORKERS;

/// powchain ledger driver.
///
/// Builds, inspects, verifies, and repairs proof-of-work chains stored as
/// snapshot files in a data directory.
#[derive(Parser, Debug)]
#[command(
    name = "powchain-node",
    about = "powchain ledger driver",
    version,
    propagate_version = true
)]
pub struct PowchainCli {
    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Options accepted before or after any subcommand.
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Directory holding chain snapshots (`<chain>.dat`).
    #[arg(long, short = 'd', env = "POWCHAIN_DATA_DIR", default_value = ".", global = true)]
    pub data_dir: PathBuf,

    /// Number of mining threads. The elected nonce does not depend on it.
    #[arg(long, env = "POWCHAIN_WORKERS", default_value_t = DEFAULT_MINING_WORKERS, global = true)]
    pub workers: usize,

    /// Give up mining a record after this many nonces. Unbounded when omitted.
    #[arg(long, env = "POWCHAIN_MAX_ATTEMPTS", global = true)]
    pub max_attempts: Option<u64>,

    /// Log output format: `pretty` or `json`.
    #[arg(long, env = "POWCHAIN_LOG_FORMAT", default_value = "pretty", global = true)]
    pub log_format: String,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Mine a throwaway chain of sample records and print it.
    Demo(DemoArgs),
    /// Append records to a chain, creating it if needed.
    Append(AppendArgs),
    /// Print every record of a chain.
    Show(ShowArgs),
    /// Check genesis, links, and proofs. Exits non-zero on any defect.
    Verify(ChainArgs),
    /// Recompute every link and save the repaired chain.
    Refresh(ChainArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `demo` subcommand.
#[derive(Parser, Debug)]
pub struct DemoArgs {
    /// How many records to append after genesis.
    #[arg(long, short = 'n', default_value_t = 4)]
    pub records: usize,

    /// Also save the demo chain under this name.
    #[arg(long)]
    pub save: Option<String>,
}

/// Arguments for the `append` subcommand.
#[derive(Parser, Debug)]
pub struct AppendArgs {
    /// Chain name; the snapshot lives at `<data-dir>/<chain>.dat`.
    #[arg(long, short = 'c', default_value = "chain")]
    pub chain: String,

    /// Payloads to append, in order.
    #[arg(required = true)]
    pub payloads: Vec<String>,
}

/// Arguments for the `show` subcommand.
#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Chain name; the snapshot lives at `<data-dir>/<chain>.dat`.
    #[arg(long, short = 'c', default_value = "chain")]
    pub chain: String,

    /// Print records as a JSON array instead of text blocks.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for commands that only need a chain name.
#[derive(Parser, Debug)]
pub struct ChainArgs {
    /// Chain name; the snapshot lives at `<data-dir>/<chain>.dat`.
    #[arg(long, short = 'c', default_value = "chain")]
    pub chain: String,
}
