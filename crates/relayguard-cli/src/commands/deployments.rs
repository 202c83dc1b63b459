//! `relayguard deployments`: list official Safe deployments.

use std::path::PathBuf;

use relayguard_core::{ChainId, ContractKind};
use relayguard_evm::DeploymentRegistry;

/// Run the `deployments` subcommand.
pub fn run(
    chain_id: ChainId,
    kind: Option<ContractKind>,
    config_path: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (_config, registry) = super::load(config_path)?;

    let lines = listing(&registry, chain_id, kind);
    if lines.is_empty() {
        return Err(format!("no official deployments known for chain {chain_id}").into());
    }
    for line in lines {
        println!("{line}");
    }
    Ok(())
}

/// One `version  kind  address` line per official address, oldest version first.
fn listing(
    registry: &DeploymentRegistry,
    chain_id: ChainId,
    kind: Option<ContractKind>,
) -> Vec<String> {
    registry
        .deployments(chain_id)
        .into_iter()
        .filter(|(_, k, _)| kind.is_none_or(|wanted| wanted == *k))
        .flat_map(|(version, k, addresses)| {
            let version = version.to_string();
            addresses.iter().map(move |address| {
                format!("{version:<8} {:<18} {}", k.name(), address.to_checksum(None))
            })
        })
        .collect()
}
