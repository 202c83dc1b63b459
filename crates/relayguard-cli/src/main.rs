//! # relayguard CLI
//!
//! Entry point for the `relayguard` binary.
//!
//! Subcommands:
//! - `relayguard check`: Print the limit addresses of a relay request
//! - `relayguard deployments`: List official Safe deployments for a chain

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use relayguard_core::{ChainId, ContractKind};
use tracing_subscriber::EnvFilter;

mod commands;

/// relayguard: decides which addresses a sponsored Safe transaction is limited by.
#[derive(Parser)]
#[command(name = "relayguard", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a relay request and print its limit addresses as JSON.
    Check {
        /// Chain ID the transaction targets.
        #[arg(long)]
        chain_id: String,

        /// Declared Safe version (e.g. "1.3.0").
        #[arg(long)]
        version: String,

        /// Target contract address (0x...).
        #[arg(long)]
        to: String,

        /// Hex-encoded calldata (with or without 0x prefix).
        #[arg(long, default_value = "0x")]
        data: String,

        /// Path to config.yaml (default: ~/.relayguard/config.yaml).
        #[arg(long, short)]
        config: Option<PathBuf>,
    },

    /// List the official Safe deployments known for a chain.
    Deployments {
        /// Chain ID to list.
        #[arg(long)]
        chain_id: ChainId,

        /// Only list one contract kind (e.g. "multi-send").
        #[arg(long)]
        kind: Option<ContractKind>,

        /// Path to config.yaml (default: ~/.relayguard/config.yaml).
        #[arg(long, short)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check {
            chain_id,
            version,
            to,
            data,
            config,
        } => commands::check::run(chain_id, version, to, data, config).await,
        Commands::Deployments {
            chain_id,
            kind,
            config,
        } => commands::deployments::run(chain_id, kind, config),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
