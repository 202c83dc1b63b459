//! Chain identifiers.
//!
//! Relay requests carry the chain id as a decimal string; it is parsed once
//! into a [`ChainId`] and used as the key into the deployment registry.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// An EIP-155 chain id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "u64", into = "u64")]
pub struct ChainId(u64);

impl ChainId {
    /// Ethereum mainnet.
    pub const MAINNET: ChainId = ChainId(1);
    /// Gnosis Chain.
    pub const GNOSIS: ChainId = ChainId(100);
    /// Polygon PoS.
    pub const POLYGON: ChainId = ChainId(137);
    /// Base.
    pub const BASE: ChainId = ChainId(8453);

    /// Wraps a numeric chain id.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the numeric chain id.
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(chain: ChainId) -> u64 {
        chain.as_u64()
    }
}

impl FromStr for ChainId {
    type Err = InvalidChainIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        // u64::from_str accepts a leading '+', which is not a valid chain id
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidChainIdError(s.to_string()));
        }
        trimmed
            .parse::<u64>()
            .map(Self)
            .map_err(|_| InvalidChainIdError(s.to_string()))
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error when a chain id string is not a decimal number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid chain id {0:?}: expected a decimal number")]
pub struct InvalidChainIdError(pub String);
