//! Official Safe deployment registry.
//!
//! An immutable table of `(chain, version, contract kind) → addresses`, built
//! once from a JSON dataset and shared read-only afterwards. The default
//! dataset is embedded in the crate.

use alloy::primitives::Address;
use relayguard_core::{ChainId, ContractKind};
use semver::{BuildMetadata, Version};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Dataset shipped with the crate.
const EMBEDDED_DATASET: &str = include_str!("../deployments/safe-deployments.json");

/// Errors from loading a deployment dataset.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to parse deployment dataset: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid version {version:?} for {kind}")]
    InvalidVersion { kind: ContractKind, version: String },
    #[error("invalid chain id {chain_id:?} for {kind} v{version}")]
    InvalidChainId {
        kind: ContractKind,
        version: String,
        chain_id: String,
    },
    #[error("invalid address {address:?} for {kind} v{version} on chain {chain_id}")]
    InvalidAddress {
        kind: ContractKind,
        version: String,
        chain_id: ChainId,
        address: String,
    },
}

/// Result alias for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

#[derive(Debug, Deserialize)]
struct Dataset {
    deployments: Vec<DatasetEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DatasetEntry {
    contract_name: ContractKind,
    version: String,
    network_addresses: BTreeMap<String, Vec<String>>,
}

/// Which version the target contract is checked against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedVersion {
    /// The declared version is deployed on the chain.
    Declared(Version),
    /// The declared version is unknown; the chain's latest version is used.
    Fallback { declared: String, latest: Version },
}

impl ResolvedVersion {
    /// The version whose addresses are consulted.
    pub fn version(&self) -> &Version {
        match self {
            Self::Declared(version) => version,
            Self::Fallback { latest, .. } => latest,
        }
    }

    /// Whether the declared version was replaced.
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

type KindAddresses = HashMap<ContractKind, Vec<Address>>;

/// Official deployments, indexed by chain then version.
#[derive(Debug, Clone, Default)]
pub struct DeploymentRegistry {
    chains: HashMap<ChainId, BTreeMap<Version, KindAddresses>>,
}

/// Parse a Safe version string: optional `v` prefix, build metadata (`+L2`) dropped.
pub fn parse_version(version: &str) -> Option<Version> {
    let trimmed = version.trim();
    let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
    let mut parsed = Version::parse(trimmed).ok()?;
    parsed.build = BuildMetadata::EMPTY;
    Some(parsed)
}

impl DeploymentRegistry {
    /// Load the dataset embedded in the crate.
    pub fn embedded() -> Result<Self> {
        Self::from_json(EMBEDDED_DATASET)
    }

    /// Load a dataset from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Parse a dataset from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let dataset: Dataset = serde_json::from_str(json)?;
        let mut registry = Self::default();

        for entry in dataset.deployments {
            let kind = entry.contract_name;
            let version =
                parse_version(&entry.version).ok_or_else(|| RegistryError::InvalidVersion {
                    kind,
                    version: entry.version.clone(),
                })?;

            for (chain, addresses) in entry.network_addresses {
                let chain_id =
                    ChainId::from_str(&chain).map_err(|_| RegistryError::InvalidChainId {
                        kind,
                        version: entry.version.clone(),
                        chain_id: chain.clone(),
                    })?;

                let parsed = addresses
                    .iter()
                    .map(|address| {
                        Address::from_str(address).map_err(|_| RegistryError::InvalidAddress {
                            kind,
                            version: entry.version.clone(),
                            chain_id,
                            address: address.clone(),
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;

                let slot = registry
                    .chains
                    .entry(chain_id)
                    .or_default()
                    .entry(version.clone())
                    .or_default()
                    .entry(kind)
                    .or_default();
                for address in parsed {
                    if !slot.contains(&address) {
                        slot.push(address);
                    }
                }
            }
        }

        Ok(registry)
    }

    /// Chains with at least one deployment, in ascending order.
    pub fn chains(&self) -> Vec<ChainId> {
        let mut chains: Vec<_> = self.chains.keys().copied().collect();
        chains.sort();
        chains
    }

    /// Versions deployed on `chain_id`, oldest first.
    pub fn versions(&self, chain_id: ChainId) -> impl Iterator<Item = &Version> {
        self.chains
            .get(&chain_id)
            .into_iter()
            .flat_map(|versions| versions.keys())
    }

    /// Newest version deployed on `chain_id`.
    pub fn latest_version(&self, chain_id: ChainId) -> Option<&Version> {
        self.chains
            .get(&chain_id)
            .and_then(|versions| versions.keys().next_back())
    }

    /// Official addresses of `kind` at `version` on `chain_id`.
    ///
    /// `None` is the ordinary "no such deployment" outcome.
    pub fn resolve_deployment(
        &self,
        kind: ContractKind,
        version: &Version,
        chain_id: ChainId,
    ) -> Option<&[Address]> {
        self.chains
            .get(&chain_id)?
            .get(version)?
            .get(&kind)
            .map(Vec::as_slice)
    }

    /// Whether `address` is an official `kind` deployment at exactly `version`.
    pub fn is_official_for_version(
        &self,
        kind: ContractKind,
        address: Address,
        version: &Version,
        chain_id: ChainId,
    ) -> bool {
        self.resolve_deployment(kind, version, chain_id)
            .is_some_and(|addresses| addresses.contains(&address))
    }

    /// Scan every version on `chain_id` for an official `kind` at `address`.
    ///
    /// Returns the newest matching version.
    pub fn is_official_deployment(
        &self,
        kind: ContractKind,
        address: Address,
        chain_id: ChainId,
    ) -> Option<&Version> {
        self.chains.get(&chain_id)?.iter().rev().find_map(|(version, kinds)| {
            kinds
                .get(&kind)
                .is_some_and(|addresses| addresses.contains(&address))
                .then_some(version)
        })
    }

    /// Pick the version the target contract is checked against.
    ///
    /// `None` when the chain has no deployments at all.
    pub fn resolve_version(&self, declared: &str, chain_id: ChainId) -> Option<ResolvedVersion> {
        let versions = self.chains.get(&chain_id)?;
        if let Some(version) = parse_version(declared) {
            if versions.contains_key(&version) {
                return Some(ResolvedVersion::Declared(version));
            }
        }
        let latest = versions.keys().next_back()?.clone();
        Some(ResolvedVersion::Fallback {
            declared: declared.to_string(),
            latest,
        })
    }

    /// Every deployment on `chain_id` as `(version, kind, addresses)`, oldest version first.
    pub fn deployments(
        &self,
        chain_id: ChainId,
    ) -> Vec<(&Version, ContractKind, &[Address])> {
        let Some(versions) = self.chains.get(&chain_id) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for (version, kinds) in versions {
            for kind in ContractKind::ALL {
                if let Some(addresses) = kinds.get(&kind) {
                    out.push((version, kind, addresses.as_slice()));
                }
            }
        }
        out
    }
}
