//! `relayguard check`: classify one relay request.
//!
//! Safe lookups go through the RPC endpoints in the config. Proxy creations
//! need no lookup, so they can be checked without any endpoint.

use std::path::PathBuf;
use std::sync::Arc;

use relayguard_core::RelayRequest;
use relayguard_evm::{Address, LimitAddressesMapper, RpcSafeLookup};

/// Run the `check` subcommand.
pub async fn run(
    chain_id: String,
    version: String,
    to: String,
    data: String,
    config_path: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (config, registry) = super::load(config_path)?;
    let registry = Arc::new(registry);

    let lookup = RpcSafeLookup::from_config(&config, Arc::clone(&registry))?;
    let mapper = LimitAddressesMapper::with_config(registry, lookup, &config);

    let request = RelayRequest::new(chain_id, version, to, data);
    let addresses = mapper.get_limit_addresses(&request).await?;

    println!("{}", render(&addresses)?);
    Ok(())
}

/// JSON array of EIP-55 checksummed addresses.
fn render(addresses: &[Address]) -> Result<String, serde_json::Error> {
    let checksummed: Vec<String> = addresses
        .iter()
        .map(|address| address.to_checksum(None))
        .collect();
    serde_json::to_string_pretty(&checksummed)
}
