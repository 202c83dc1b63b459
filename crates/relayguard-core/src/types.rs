//! Common types shared across relayguard crates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A transaction the relay has been asked to sponsor.
///
/// Fields are kept as the caller sent them; parsing happens inside the
/// limit-address pipeline so malformed input maps to a typed rejection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayRequest {
    /// Decimal chain id (e.g. `"1"`).
    pub chain_id: String,
    /// Declared Safe version (e.g. `"1.3.0"`); may be unknown to the registry.
    pub version: String,
    /// Target contract of the relayed transaction (hex, 0x-prefixed).
    pub to: String,
    /// Calldata of the relayed transaction (hex, 0x-prefixed).
    pub data: String,
}

impl RelayRequest {
    /// Builds a request from its four parts.
    pub fn new(
        chain_id: impl Into<String>,
        version: impl Into<String>,
        to: impl Into<String>,
        data: impl Into<String>,
    ) -> Self {
        Self {
            chain_id: chain_id.into(),
            version: version.into(),
            to: to.into(),
            data: data.into(),
        }
    }
}

/// Contract kinds published by the Safe deployment registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ContractKind {
    /// Safe singleton (mastercopy) without event emission.
    Safe,
    /// Safe singleton emitting L2 events.
    SafeL2,
    /// MultiSend batch contract (allows delegate calls).
    MultiSend,
    /// MultiSend batch contract restricted to calls.
    MultiSendCallOnly,
    /// Safe proxy factory.
    ProxyFactory,
}

impl ContractKind {
    /// Every kind, in registry order.
    pub const ALL: [ContractKind; 5] = [
        Self::Safe,
        Self::SafeL2,
        Self::MultiSend,
        Self::MultiSendCallOnly,
        Self::ProxyFactory,
    ];

    /// Singleton kinds a Safe proxy may point at.
    pub const SINGLETONS: [ContractKind; 2] = [Self::Safe, Self::SafeL2];

    /// Batch-call kinds.
    pub const MULTI_SEND: [ContractKind; 2] = [Self::MultiSend, Self::MultiSendCallOnly];

    /// Name as it appears in the deployment dataset.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Safe => "Safe",
            Self::SafeL2 => "SafeL2",
            Self::MultiSend => "MultiSend",
            Self::MultiSendCallOnly => "MultiSendCallOnly",
            Self::ProxyFactory => "ProxyFactory",
        }
    }
}

impl fmt::Display for ContractKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error for an unrecognised contract kind name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown contract kind {0:?}; expected one of safe, safe-l2, multi-send, multi-send-call-only, proxy-factory")]
pub struct UnknownContractKindError(pub String);

impl FromStr for ContractKind {
    type Err = UnknownContractKindError;

    /// Accepts the dataset name (`SafeL2`) or its kebab-case form (`safe-l2`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "safe" => Ok(Self::Safe),
            "safel2" => Ok(Self::SafeL2),
            "multisend" => Ok(Self::MultiSend),
            "multisendcallonly" => Ok(Self::MultiSendCallOnly),
            "proxyfactory" => Ok(Self::ProxyFactory),
            _ => Err(UnknownContractKindError(s.to_string())),
        }
    }
}
