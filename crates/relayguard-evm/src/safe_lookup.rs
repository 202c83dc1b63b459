//! Safe lookup: resolves a claimed Safe address to its on-chain record.
//!
//! A lookup only succeeds for proxies whose mastercopy is an official Safe or
//! SafeL2 deployment, so a successful lookup doubles as the mastercopy check.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::Address;
use relayguard_core::{ChainId, ContractKind, GuardConfig};
use thiserror::Error;
use tracing::debug;

use crate::adapter::{EvmAdapter, EvmAdapterError};
use crate::deployments::DeploymentRegistry;

/// A Safe as seen on chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeRecord {
    pub address: Address,
    pub owners: Vec<Address>,
    pub threshold: u32,
    pub nonce: u64,
    pub version: Option<String>,
    pub mastercopy: Address,
}

/// Errors from Safe lookups.
#[derive(Debug, Error)]
pub enum SafeLookupError {
    #[error("no Safe found at {address} on chain {chain_id}")]
    NotFound { chain_id: ChainId, address: Address },
    #[error("{address} on chain {chain_id} uses unofficial mastercopy {mastercopy}")]
    UnofficialMastercopy {
        chain_id: ChainId,
        address: Address,
        mastercopy: Address,
    },
    #[error("no RPC endpoint configured for chain {0}")]
    UnsupportedChain(ChainId),
    #[error("Safe lookup timed out after {0:?}")]
    Timeout(Duration),
    #[error("adapter error: {0}")]
    Adapter(#[from] EvmAdapterError),
}

/// Resolves Safe addresses to their records.
pub trait SafeLookup: Send + Sync {
    /// Fetch the Safe at `address`, failing unless it is an official Safe.
    fn get_safe(
        &self,
        chain_id: ChainId,
        address: Address,
    ) -> impl Future<Output = Result<SafeRecord, SafeLookupError>> + Send;
}

impl<T: SafeLookup> SafeLookup for Arc<T> {
    fn get_safe(
        &self,
        chain_id: ChainId,
        address: Address,
    ) -> impl Future<Output = Result<SafeRecord, SafeLookupError>> + Send {
        (**self).get_safe(chain_id, address)
    }
}

/// Fixed set of Safe records, for offline use and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemorySafeLookup {
    safes: HashMap<(ChainId, Address), SafeRecord>,
}

impl InMemorySafeLookup {
    /// Creates an empty lookup; every query fails with `NotFound`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `record` on `chain_id`.
    pub fn with_safe(mut self, chain_id: ChainId, record: SafeRecord) -> Self {
        self.insert(chain_id, record);
        self
    }

    /// Registers `record` on `chain_id`, replacing any previous record.
    pub fn insert(&mut self, chain_id: ChainId, record: SafeRecord) {
        self.safes.insert((chain_id, record.address), record);
    }
}

impl SafeLookup for InMemorySafeLookup {
    async fn get_safe(
        &self,
        chain_id: ChainId,
        address: Address,
    ) -> Result<SafeRecord, SafeLookupError> {
        self.safes
            .get(&(chain_id, address))
            .cloned()
            .ok_or(SafeLookupError::NotFound { chain_id, address })
    }
}

/// Safe lookup backed by JSON-RPC endpoints.
#[derive(Debug)]
pub struct RpcSafeLookup {
    adapters: HashMap<ChainId, EvmAdapter>,
    registry: Arc<DeploymentRegistry>,
    timeout: Duration,
}

impl RpcSafeLookup {
    /// Creates a lookup over prebuilt adapters.
    pub fn new(
        adapters: HashMap<ChainId, EvmAdapter>,
        registry: Arc<DeploymentRegistry>,
        timeout: Duration,
    ) -> Self {
        Self {
            adapters,
            registry,
            timeout,
        }
    }

    /// Builds an adapter for each configured chain.
    pub fn from_config(
        config: &GuardConfig,
        registry: Arc<DeploymentRegistry>,
    ) -> Result<Self, SafeLookupError> {
        let mut adapters = HashMap::new();
        for (chain_id, rpc_url) in &config.chain_rpc_urls {
            adapters.insert(ChainId::new(*chain_id), EvmAdapter::new(rpc_url)?);
        }
        Ok(Self::new(adapters, registry, config.lookup_timeout()))
    }

    async fn fetch(
        &self,
        adapter: &EvmAdapter,
        chain_id: ChainId,
        address: Address,
    ) -> Result<SafeRecord, SafeLookupError> {
        let mastercopy = adapter.get_mastercopy(address).await?;
        let official = ContractKind::SINGLETONS.iter().any(|kind| {
            self.registry
                .is_official_deployment(*kind, mastercopy, chain_id)
                .is_some()
        });
        if !official {
            return Err(if mastercopy.is_zero() {
                SafeLookupError::NotFound { chain_id, address }
            } else {
                SafeLookupError::UnofficialMastercopy {
                    chain_id,
                    address,
                    mastercopy,
                }
            });
        }

        let owners = adapter.get_owners(address).await?;
        let threshold = adapter.get_threshold(address).await?;
        let nonce = adapter.get_nonce(address).await?;
        // Not every singleton exposes a parseable VERSION.
        let version = adapter.get_version(address).await.ok();

        debug!(%address, %chain_id, %mastercopy, owners = owners.len(), "fetched Safe");
        Ok(SafeRecord {
            address,
            owners,
            threshold,
            nonce,
            version,
            mastercopy,
        })
    }
}

impl SafeLookup for RpcSafeLookup {
    async fn get_safe(
        &self,
        chain_id: ChainId,
        address: Address,
    ) -> Result<SafeRecord, SafeLookupError> {
        let adapter = self
            .adapters
            .get(&chain_id)
            .ok_or(SafeLookupError::UnsupportedChain(chain_id))?;

        tokio::time::timeout(self.timeout, self.fetch(adapter, chain_id, address))
            .await
            .map_err(|_| SafeLookupError::Timeout(self.timeout))?
    }
}
