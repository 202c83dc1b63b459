//! Limit-address classification.
//!
//! Works out which shape a relay request has (a Safe `execTransaction`, a
//! MultiSend batch of them, or a proxy-factory deployment), validates it, and
//! returns the addresses the relay should apply its quotas to. Anything that
//! cannot be proven to be one of those shapes is rejected.

use std::str::FromStr;
use std::sync::Arc;

use alloy::primitives::{Address, Bytes};
use alloy::sol_types::SolCall;
use relayguard_core::config::DEFAULT_MAX_NESTING_DEPTH;
use relayguard_core::{ChainId, ContractKind, GuardConfig, RelayRequest, VersionPolicy};
use semver::Version;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::abi::IMultiSend;
use crate::call::{DecodedCall, ExecTransactionCall};
use crate::deployments::{DeploymentRegistry, ResolvedVersion};
use crate::safe_lookup::{SafeLookup, SafeRecord};
use crate::{multisend, proxy_factory, safe};

/// Reasons a relay request is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LimitAddressError {
    #[error("invalid target address {0:?}")]
    InvalidTo(String),
    #[error("invalid calldata: {0}")]
    InvalidData(String),
    #[error("unsupported chain {0:?}")]
    UnsupportedChain(String),
    #[error("unsupported Safe version {version:?} on chain {chain_id}")]
    UnsupportedVersion { version: String, chain_id: ChainId },
    #[error("{address} is not a Safe with an official mastercopy on chain {chain_id}")]
    UnofficialMastercopy { address: Address, chain_id: ChainId },
    #[error("{0} is not an official MultiSend deployment")]
    UnofficialMultiSend(Address),
    #[error("{0} is not an official Safe singleton")]
    UnofficialSingleton(Address),
    #[error("invalid transfer: {0}")]
    InvalidTransfer(String),
    #[error("invalid MultiSend batch: {0}")]
    InvalidMultiSendBatch(String),
}

/// Result alias for classification.
pub type Result<T> = std::result::Result<T, LimitAddressError>;

/// Maps relay requests to the addresses they should be rate-limited by.
#[derive(Debug)]
pub struct LimitAddressesMapper<L> {
    registry: Arc<DeploymentRegistry>,
    safe_lookup: L,
    max_nesting_depth: usize,
    version_policy: VersionPolicy,
}

impl<L: SafeLookup> LimitAddressesMapper<L> {
    /// Creates a mapper with the default nesting bound and version policy.
    pub fn new(registry: Arc<DeploymentRegistry>, safe_lookup: L) -> Self {
        Self {
            registry,
            safe_lookup,
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            version_policy: VersionPolicy::default(),
        }
    }

    /// Creates a mapper using the limits from `config`.
    pub fn with_config(
        registry: Arc<DeploymentRegistry>,
        safe_lookup: L,
        config: &GuardConfig,
    ) -> Self {
        Self {
            registry,
            safe_lookup,
            max_nesting_depth: config.max_nesting_depth,
            version_policy: config.version_policy,
        }
    }

    /// Returns the limit addresses for `request`, never an empty list.
    ///
    /// Performs at most one Safe lookup.
    pub async fn get_limit_addresses(&self, request: &RelayRequest) -> Result<Vec<Address>> {
        let result = self.classify(request).await;
        match &result {
            Ok(addresses) => debug!(
                chain_id = %request.chain_id,
                to = %request.to,
                limit_addresses = addresses.len(),
                "relay request accepted"
            ),
            Err(err) => warn!(
                chain_id = %request.chain_id,
                to = %request.to,
                %err,
                "relay request rejected"
            ),
        }
        result
    }

    async fn classify(&self, request: &RelayRequest) -> Result<Vec<Address>> {
        let to = Address::from_str(request.to.trim())
            .map_err(|_| LimitAddressError::InvalidTo(request.to.clone()))?;
        let data = Bytes::from_str(request.data.trim())
            .map_err(|err| LimitAddressError::InvalidData(err.to_string()))?;
        let chain_id = ChainId::from_str(&request.chain_id)
            .map_err(|_| LimitAddressError::UnsupportedChain(request.chain_id.clone()))?;

        let resolved = self.resolve_version(&request.version, chain_id)?;
        let version = resolved.version();

        if self.is_official_target(&ContractKind::MULTI_SEND, to, version, chain_id) {
            debug!(%to, %version, "target is an official MultiSend");
            return self.validate_multi_send(chain_id, &data).await;
        }
        if self.is_official_target(&[ContractKind::ProxyFactory], to, version, chain_id) {
            debug!(%to, %version, "target is an official proxy factory");
            return self.validate_proxy_creation(chain_id, &data);
        }
        if data.get(..4) == Some(&IMultiSend::multiSendCall::SELECTOR[..]) {
            return Err(LimitAddressError::UnofficialMultiSend(to));
        }

        debug!(%to, "treating target as a Safe");
        self.validate_wallet_call(chain_id, to, &data).await
    }

    fn resolve_version(&self, declared: &str, chain_id: ChainId) -> Result<ResolvedVersion> {
        let resolved = self
            .registry
            .resolve_version(declared, chain_id)
            .ok_or_else(|| LimitAddressError::UnsupportedChain(chain_id.to_string()))?;

        if let ResolvedVersion::Fallback { declared, latest } = &resolved {
            if self.version_policy == VersionPolicy::Strict {
                return Err(LimitAddressError::UnsupportedVersion {
                    version: declared.clone(),
                    chain_id,
                });
            }
            info!(%chain_id, declared = %declared, %latest, "unknown Safe version, using latest");
        }
        Ok(resolved)
    }

    fn is_official_target(
        &self,
        kinds: &[ContractKind],
        to: Address,
        version: &Version,
        chain_id: ChainId,
    ) -> bool {
        kinds
            .iter()
            .any(|kind| self.registry.is_official_for_version(*kind, to, version, chain_id))
    }

    async fn lookup_safe(&self, chain_id: ChainId, address: Address) -> Result<SafeRecord> {
        self.safe_lookup
            .get_safe(chain_id, address)
            .await
            .map_err(|err| {
                warn!(%address, %chain_id, %err, "Safe lookup failed");
                LimitAddressError::UnofficialMastercopy { address, chain_id }
            })
    }

    async fn validate_wallet_call(
        &self,
        chain_id: ChainId,
        wallet: Address,
        data: &[u8],
    ) -> Result<Vec<Address>> {
        self.lookup_safe(chain_id, wallet).await?;

        let exec = safe::decode_exec_transaction(data).map_err(|err| {
            LimitAddressError::InvalidTransfer(format!("expected execTransaction: {err}"))
        })?;
        self.validate_exec_transaction(wallet, &exec, 1)
            .map_err(LimitAddressError::InvalidTransfer)?;

        Ok(vec![wallet])
    }

    async fn validate_multi_send(&self, chain_id: ChainId, data: &[u8]) -> Result<Vec<Address>> {
        let entries = match multisend::decode(data) {
            Ok(DecodedCall::MultiSendBatch { calls }) => calls,
            Ok(other) => {
                return Err(LimitAddressError::InvalidMultiSendBatch(format!(
                    "expected multiSend, got {}",
                    other.name()
                )))
            }
            Err(err) => return Err(LimitAddressError::InvalidMultiSendBatch(err.to_string())),
        };

        let wallet = match entries.first() {
            Some(entry) => entry.to,
            None => {
                return Err(LimitAddressError::InvalidMultiSendBatch(
                    "batch is empty".into(),
                ))
            }
        };
        if let Some((index, entry)) = entries
            .iter()
            .enumerate()
            .find(|(_, entry)| entry.to != wallet)
        {
            return Err(LimitAddressError::InvalidMultiSendBatch(format!(
                "entry {index} targets {} but entry 0 targets {wallet}",
                entry.to
            )));
        }

        let execs = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                safe::decode_exec_transaction(&entry.data).map_err(|err| {
                    LimitAddressError::InvalidMultiSendBatch(format!(
                        "entry {index} is not an execTransaction: {err}"
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        self.lookup_safe(chain_id, wallet).await?;

        for (index, exec) in execs.iter().enumerate() {
            self.validate_exec_transaction(wallet, exec, 1)
                .map_err(|reason| {
                    LimitAddressError::InvalidMultiSendBatch(format!("entry {index}: {reason}"))
                })?;
        }

        Ok(vec![wallet])
    }

    fn validate_proxy_creation(&self, chain_id: ChainId, data: &[u8]) -> Result<Vec<Address>> {
        let (singleton, initializer) = match proxy_factory::decode(data) {
            Ok(DecodedCall::ProxyCreation {
                singleton,
                initializer,
                ..
            }) => (singleton, initializer),
            Ok(other) => {
                return Err(LimitAddressError::InvalidTransfer(format!(
                    "expected createProxyWithNonce, got {}",
                    other.name()
                )))
            }
            Err(err) => {
                return Err(LimitAddressError::InvalidTransfer(format!(
                    "expected createProxyWithNonce: {err}"
                )))
            }
        };

        // Any known version is accepted for the singleton.
        let version = ContractKind::SINGLETONS.iter().find_map(|kind| {
            self.registry
                .is_official_deployment(*kind, singleton, chain_id)
        });
        let Some(version) = version else {
            return Err(LimitAddressError::UnofficialSingleton(singleton));
        };
        debug!(%singleton, %version, "official singleton");

        let owners = safe::decode_setup_owners(&initializer).map_err(|err| {
            LimitAddressError::InvalidTransfer(format!("initializer is not a Safe setup: {err}"))
        })?;
        if owners.is_empty() {
            return Err(LimitAddressError::InvalidTransfer(
                "setup lists no owners".into(),
            ));
        }
        Ok(owners)
    }

    /// Checks one `execTransaction` executed by `wallet`.
    ///
    /// Returns the rejection reason; callers wrap it in the error for their shape.
    fn validate_exec_transaction(
        &self,
        wallet: Address,
        exec: &ExecTransactionCall,
        depth: usize,
    ) -> std::result::Result<(), String> {
        if depth > self.max_nesting_depth {
            return Err(format!(
                "execTransaction nested deeper than {} levels",
                self.max_nesting_depth
            ));
        }

        // delegatecall runs the target's code in the wallet's storage
        if exec.operation != 0 {
            return Err(format!(
                "operation {} to {} is not a plain call",
                exec.operation, exec.to
            ));
        }

        let inner = exec
            .inner_call()
            .map_err(|err| format!("unsupported call to {}: {err}", exec.to))?;

        if exec.to == wallet {
            return match inner {
                DecodedCall::NestedExecTransaction(nested) => {
                    self.validate_exec_transaction(wallet, &nested, depth + 1)
                }
                DecodedCall::SafeAdminCall { kind } => {
                    debug!(%wallet, %kind, "Safe admin call");
                    Ok(())
                }
                DecodedCall::NativeTransfer { .. } if exec.is_cancellation() => Ok(()),
                DecodedCall::NativeTransfer { value, .. } => {
                    Err(format!("{wallet} sends {value} wei to itself"))
                }
                other => Err(format!("{wallet} calls {} on itself", other.name())),
            };
        }

        match inner {
            DecodedCall::NativeTransfer { .. } | DecodedCall::Erc20Approve { .. } => Ok(()),
            DecodedCall::Erc20Transfer { to } if to == wallet => {
                Err(format!("token transfer back to {wallet}"))
            }
            DecodedCall::Erc20Transfer { .. } => Ok(()),
            DecodedCall::Erc20TransferFrom { recipient, .. } if recipient == wallet => {
                Err(format!("transferFrom into {wallet}"))
            }
            DecodedCall::Erc20TransferFrom { sender, recipient } if sender == recipient => {
                Err(format!("transferFrom with sender equal to recipient {sender}"))
            }
            DecodedCall::Erc20TransferFrom { .. } => Ok(()),
            other => Err(format!("unsupported call {} to {}", other.name(), exec.to)),
        }
    }
}
