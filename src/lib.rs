//! # relayguard
//!
//! Relay-abuse guard for sponsored Safe transactions.
//!
//! Given a relay request (chain, declared Safe version, target, calldata), the
//! guard returns the addresses the relay should apply its quotas to, or
//! rejects the request when its shape cannot be proven safe.
//!
//! ```no_run
//! use std::sync::Arc;
//! use relayguard::{DeploymentRegistry, InMemorySafeLookup, LimitAddressesMapper, RelayRequest};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = Arc::new(DeploymentRegistry::embedded()?);
//! let mapper = LimitAddressesMapper::new(registry, InMemorySafeLookup::new());
//! let request = RelayRequest::new("1", "1.3.0", "0xa6B71E26C5e0845f74c812102Ca7114b6a896AB2", "0x");
//! let limits = mapper.get_limit_addresses(&request).await;
//! # let _ = limits;
//! # Ok(())
//! # }
//! ```

pub use relayguard_core::{
    ChainId, ConfigError, ContractKind, GuardConfig, RelayRequest, VersionPolicy,
};
pub use relayguard_evm::{
    Address, DeploymentRegistry, InMemorySafeLookup, LimitAddressError, LimitAddressesMapper,
    RpcSafeLookup, SafeLookup, SafeLookupError, SafeRecord,
};

/// Returns the library version string.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
