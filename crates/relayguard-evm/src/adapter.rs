//! Chain adapter implementation.
//!
//! Connects to an EVM-compatible JSON-RPC endpoint and reads the state of a
//! Safe proxy: its mastercopy and the values exposed by its getters.

use alloy::network::Ethereum;
use alloy::primitives::{Address, Bytes, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::SolCall;
use thiserror::Error;

use crate::abi::ISafe;

/// Errors from EVM adapter operations.
#[derive(Debug, Error)]
pub enum EvmAdapterError {
    #[error("RPC error: {0}")]
    Rpc(String),
    #[error("URL parse error: {0}")]
    UrlParse(String),
    #[error("ABI decode error: {0}")]
    AbiDecode(String),
    #[error("value out of range: {0}")]
    OutOfRange(String),
}

/// Result alias for adapter operations.
pub type Result<T> = std::result::Result<T, EvmAdapterError>;

/// An EVM chain adapter connected to a specific RPC endpoint.
pub struct EvmAdapter {
    provider: DynProvider<Ethereum>,
    rpc_url: String,
}

impl std::fmt::Debug for EvmAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvmAdapter")
            .field("rpc_url", &self.rpc_url)
            .finish()
    }
}

impl EvmAdapter {
    /// Creates a new adapter for the given RPC URL.
    pub fn new(rpc_url: &str) -> Result<Self> {
        let url: alloy::transports::http::reqwest::Url = rpc_url
            .parse()
            .map_err(|e| EvmAdapterError::UrlParse(format!("{e}")))?;

        let provider = ProviderBuilder::new().connect_http(url).erased();

        Ok(Self {
            provider,
            rpc_url: rpc_url.to_string(),
        })
    }

    /// Returns the RPC URL.
    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    /// Reads the singleton a Safe proxy delegates to (storage slot 0).
    pub async fn get_mastercopy(&self, safe: Address) -> Result<Address> {
        let slot = self
            .provider
            .get_storage_at(safe, U256::ZERO)
            .await
            .map_err(|e| EvmAdapterError::Rpc(e.to_string()))?;
        let word = slot.to_be_bytes::<32>();
        Ok(Address::from_slice(&word[12..]))
    }

    /// Calls `getOwners()`.
    pub async fn get_owners(&self, safe: Address) -> Result<Vec<Address>> {
        let result = self.eth_call(safe, ISafe::getOwnersCall {}.abi_encode()).await?;
        <ISafe::getOwnersCall as SolCall>::abi_decode_returns(&result)
            .map_err(|e| EvmAdapterError::AbiDecode(e.to_string()))
    }

    /// Calls `getThreshold()`.
    pub async fn get_threshold(&self, safe: Address) -> Result<u32> {
        let result = self
            .eth_call(safe, ISafe::getThresholdCall {}.abi_encode())
            .await?;
        let threshold = <ISafe::getThresholdCall as SolCall>::abi_decode_returns(&result)
            .map_err(|e| EvmAdapterError::AbiDecode(e.to_string()))?;
        u32::try_from(threshold)
            .map_err(|_| EvmAdapterError::OutOfRange(format!("threshold {threshold}")))
    }

    /// Calls `nonce()`.
    pub async fn get_nonce(&self, safe: Address) -> Result<u64> {
        let result = self.eth_call(safe, ISafe::nonceCall {}.abi_encode()).await?;
        let nonce = <ISafe::nonceCall as SolCall>::abi_decode_returns(&result)
            .map_err(|e| EvmAdapterError::AbiDecode(e.to_string()))?;
        u64::try_from(nonce).map_err(|_| EvmAdapterError::OutOfRange(format!("nonce {nonce}")))
    }

    /// Calls `VERSION()`.
    pub async fn get_version(&self, safe: Address) -> Result<String> {
        let result = self.eth_call(safe, ISafe::VERSIONCall {}.abi_encode()).await?;
        <ISafe::VERSIONCall as SolCall>::abi_decode_returns(&result)
            .map_err(|e| EvmAdapterError::AbiDecode(e.to_string()))
    }

    async fn eth_call(&self, to: Address, data: Vec<u8>) -> Result<Bytes> {
        self.provider
            .call(TransactionRequest::default().to(to).input(data.into()))
            .await
            .map_err(|e| EvmAdapterError::Rpc(e.to_string()))
    }
}
