//! # relayguard-evm
//!
//! Safe calldata decoding and relay-abuse classification.
//!
//! - [`erc20`], [`safe`], [`multisend`], [`proxy_factory`]: selector-based decoders
//! - [`deployments`]: official Safe deployment registry
//! - [`safe_lookup`]: resolves Safe proxies, over RPC via [`adapter`] or in memory
//! - [`limit_addresses`]: maps a relay request to its limit addresses

pub mod abi;
pub mod adapter;
pub mod call;
pub mod deployments;
pub mod erc20;
pub mod limit_addresses;
pub mod multisend;
pub mod proxy_factory;
pub mod safe;
pub mod safe_lookup;

pub use adapter::{EvmAdapter, EvmAdapterError};
pub use call::{DecodeError, DecodedCall, ExecTransactionCall, MultiSendEntry, Operation};
pub use deployments::{DeploymentRegistry, RegistryError, ResolvedVersion};
pub use limit_addresses::{LimitAddressError, LimitAddressesMapper};
pub use safe_lookup::{InMemorySafeLookup, RpcSafeLookup, SafeLookup, SafeLookupError, SafeRecord};

pub use alloy::primitives::{Address, Bytes, U256};
