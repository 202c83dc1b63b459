//! # relayguard-core
//!
//! Chain ids, relay request types, and configuration shared by the
//! relayguard crates.

pub mod chain;
pub mod config;
pub mod types;

pub use chain::{ChainId, InvalidChainIdError};
pub use config::{ConfigError, GuardConfig, VersionPolicy};
pub use types::{ContractKind, RelayRequest};
