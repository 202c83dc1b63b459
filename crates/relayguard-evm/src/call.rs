//! Decoded calldata shapes shared by every decoder.

use alloy::primitives::{Address, Bytes, Selector, U256};
use std::fmt;
use thiserror::Error;

/// Errors from calldata decoding.
///
/// These never leave the crate's public pipeline as-is: the limit-address
/// classifier maps each one to a domain rejection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The calldata is missing or too short to contain a function selector.
    #[error("calldata too short to contain a function selector")]
    NoSelector,
    /// The selector is not one this decoder recognises.
    #[error("unknown function selector {selector}")]
    UnknownSelector { selector: Selector },
    /// The selector matches but ABI decoding failed.
    #[error("malformed arguments for {name}: {reason}")]
    MalformedArgs { name: &'static str, reason: String },
    /// The packed MultiSend encoding is inconsistent.
    #[error("malformed MultiSend batch at byte {offset}: {reason}")]
    MalformedBatch { offset: usize, reason: String },
}

/// Result alias for decoder operations.
pub type Result<T> = std::result::Result<T, DecodeError>;

/// Extracts the 4-byte selector from calldata.
pub fn selector(data: &[u8]) -> Result<Selector> {
    match data.get(..4) {
        Some(bytes) => Ok(Selector::from_slice(bytes)),
        None => Err(DecodeError::NoSelector),
    }
}

/// Owner, threshold and module management calls a Safe may make on itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SafeAdminKind {
    AddOwnerWithThreshold,
    ChangeThreshold,
    EnableModule,
    DisableModule,
    RemoveOwner,
    SetFallbackHandler,
    SetGuard,
    SwapOwner,
}

impl SafeAdminKind {
    /// Solidity function name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::AddOwnerWithThreshold => "addOwnerWithThreshold",
            Self::ChangeThreshold => "changeThreshold",
            Self::EnableModule => "enableModule",
            Self::DisableModule => "disableModule",
            Self::RemoveOwner => "removeOwner",
            Self::SetFallbackHandler => "setFallbackHandler",
            Self::SetGuard => "setGuard",
            Self::SwapOwner => "swapOwner",
        }
    }
}

impl fmt::Display for SafeAdminKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Safe operation type carried by `execTransaction` and MultiSend entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Call,
    DelegateCall,
}

impl TryFrom<u8> for Operation {
    type Error = u8;

    fn try_from(value: u8) -> std::result::Result<Self, u8> {
        match value {
            0 => Ok(Self::Call),
            1 => Ok(Self::DelegateCall),
            other => Err(other),
        }
    }
}

/// Arguments of a Safe `execTransaction` call.
///
/// Gas and signature fields are decoded but play no part in classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecTransactionCall {
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
    pub operation: u8,
    pub safe_tx_gas: U256,
    pub base_gas: U256,
    pub gas_price: U256,
    pub gas_token: Address,
    pub refund_receiver: Address,
    pub signatures: Bytes,
}

/// One packed record of a MultiSend batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiSendEntry {
    pub operation: Operation,
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
}

/// Every calldata shape the guard understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedCall {
    /// Empty calldata: plain native-currency transfer.
    NativeTransfer { to: Address, value: U256 },
    /// ERC-20 `transfer`.
    Erc20Transfer { to: Address },
    /// ERC-20 `transferFrom`.
    Erc20TransferFrom { sender: Address, recipient: Address },
    /// ERC-20 `approve`.
    Erc20Approve { spender: Address },
    /// Safe owner/module/guard management.
    SafeAdminCall { kind: SafeAdminKind },
    /// Safe `execTransaction`.
    NestedExecTransaction(Box<ExecTransactionCall>),
    /// Safe `setup`, as passed to the proxy factory.
    SafeSetup { owners: Vec<Address>, threshold: U256 },
    /// MultiSend `multiSend` with its unpacked records.
    MultiSendBatch { calls: Vec<MultiSendEntry> },
    /// Proxy factory `createProxyWithNonce`.
    ProxyCreation {
        singleton: Address,
        initializer: Bytes,
        salt_nonce: U256,
    },
    /// A selector the contract's ABI declares but which is never authorized
    /// (read-only getters and the like).
    Unrecognized { selector: Selector },
}

impl DecodedCall {
    /// Short label used in rejection messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::NativeTransfer { .. } => "native transfer",
            Self::Erc20Transfer { .. } => "transfer",
            Self::Erc20TransferFrom { .. } => "transferFrom",
            Self::Erc20Approve { .. } => "approve",
            Self::SafeAdminCall { kind } => kind.name(),
            Self::NestedExecTransaction(_) => "execTransaction",
            Self::SafeSetup { .. } => "setup",
            Self::MultiSendBatch { .. } => "multiSend",
            Self::ProxyCreation { .. } => "createProxyWithNonce",
            Self::Unrecognized { .. } => "unrecognized call",
        }
    }
}
