//! Safe (multisig wallet) calldata decoder.
//!
//! Recognises `execTransaction`, the owner/module/guard management calls and
//! `setup`. The view functions declared in [`ISafe`] decode to
//! [`DecodedCall::Unrecognized`]; they are never authorized.

use alloy::primitives::{Address, Bytes};
use alloy::sol_types::SolInterface;

use crate::abi::ISafe;
use crate::call::{
    selector, DecodeError, DecodedCall, ExecTransactionCall, Result, SafeAdminKind,
};
use crate::erc20;

/// Try to identify a known Safe function name from a 4-byte selector.
///
/// Selectors:
/// - execTransaction:       0x6a761202
/// - addOwnerWithThreshold: 0x0d582f13
/// - changeThreshold:       0x694e80c3
/// - enableModule:          0x610b5925
/// - disableModule:         0xe009cfde
/// - removeOwner:           0xf8dc5dd9
/// - setFallbackHandler:    0xf08a0323
/// - setGuard:              0xe19a9dd9
/// - swapOwner:             0xe318b52b
/// - setup:                 0xb63e800d
fn selector_name(selector: [u8; 4]) -> Option<&'static str> {
    match selector {
        [0x6a, 0x76, 0x12, 0x02] => Some("execTransaction"),
        [0x0d, 0x58, 0x2f, 0x13] => Some("addOwnerWithThreshold"),
        [0x69, 0x4e, 0x80, 0xc3] => Some("changeThreshold"),
        [0x61, 0x0b, 0x59, 0x25] => Some("enableModule"),
        [0xe0, 0x09, 0xcf, 0xde] => Some("disableModule"),
        [0xf8, 0xdc, 0x5d, 0xd9] => Some("removeOwner"),
        [0xf0, 0x8a, 0x03, 0x23] => Some("setFallbackHandler"),
        [0xe1, 0x9a, 0x9d, 0xd9] => Some("setGuard"),
        [0xe3, 0x18, 0xb5, 0x2b] => Some("swapOwner"),
        [0xb6, 0x3e, 0x80, 0x0d] => Some("setup"),
        _ => None,
    }
}

/// Decode Safe calldata.
pub fn decode(data: &[u8]) -> Result<DecodedCall> {
    let selector = selector(data)?;

    let call = match ISafe::ISafeCalls::abi_decode(data) {
        Ok(call) => call,
        Err(err) => {
            return Err(match selector_name(selector.0) {
                Some(name) => DecodeError::MalformedArgs {
                    name,
                    reason: err.to_string(),
                },
                None => DecodeError::UnknownSelector { selector },
            });
        }
    };

    let admin = |kind: SafeAdminKind| -> Result<DecodedCall> {
        Ok(DecodedCall::SafeAdminCall { kind })
    };
    match call {
        ISafe::ISafeCalls::execTransaction(c) => Ok(DecodedCall::NestedExecTransaction(Box::new(
            ExecTransactionCall {
                to: c.to,
                value: c.value,
                data: c.data,
                operation: c.operation,
                safe_tx_gas: c.safeTxGas,
                base_gas: c.baseGas,
                gas_price: c.gasPrice,
                gas_token: c.gasToken,
                refund_receiver: c.refundReceiver,
                signatures: c.signatures,
            },
        ))),
        ISafe::ISafeCalls::addOwnerWithThreshold(_) => admin(SafeAdminKind::AddOwnerWithThreshold),
        ISafe::ISafeCalls::changeThreshold(_) => admin(SafeAdminKind::ChangeThreshold),
        ISafe::ISafeCalls::enableModule(_) => admin(SafeAdminKind::EnableModule),
        ISafe::ISafeCalls::disableModule(_) => admin(SafeAdminKind::DisableModule),
        ISafe::ISafeCalls::removeOwner(_) => admin(SafeAdminKind::RemoveOwner),
        ISafe::ISafeCalls::setFallbackHandler(_) => admin(SafeAdminKind::SetFallbackHandler),
        ISafe::ISafeCalls::setGuard(_) => admin(SafeAdminKind::SetGuard),
        ISafe::ISafeCalls::swapOwner(_) => admin(SafeAdminKind::SwapOwner),
        ISafe::ISafeCalls::setup(c) => Ok(DecodedCall::SafeSetup {
            owners: c.owners,
            threshold: c.threshold,
        }),
        // Getters are valid ABI but never a relayable action.
        _ => Ok(DecodedCall::Unrecognized { selector }),
    }
}

/// Decode calldata that must be an `execTransaction` call.
pub fn decode_exec_transaction(data: &[u8]) -> Result<ExecTransactionCall> {
    match decode(data)? {
        DecodedCall::NestedExecTransaction(call) => Ok(*call),
        _ => Err(DecodeError::UnknownSelector {
            selector: selector(data)?,
        }),
    }
}

/// Decode calldata that must be a `setup` call, returning its owners in order.
pub fn decode_setup_owners(data: &[u8]) -> Result<Vec<Address>> {
    match decode(data)? {
        DecodedCall::SafeSetup { owners, .. } => Ok(owners),
        _ => Err(DecodeError::UnknownSelector {
            selector: selector(data)?,
        }),
    }
}

impl ExecTransactionCall {
    /// Decode the call the Safe would make.
    ///
    /// Empty data is a native transfer; otherwise the data must be an ERC-20
    /// or Safe call.
    pub fn inner_call(&self) -> Result<DecodedCall> {
        if self.data.is_empty() {
            return Ok(DecodedCall::NativeTransfer {
                to: self.to,
                value: self.value,
            });
        }
        decode_inner_data(&self.data)
    }

    /// Whether this is a cancellation: a zero-value, empty-data call.
    pub fn is_cancellation(&self) -> bool {
        self.data.is_empty() && self.value.is_zero()
    }
}

fn decode_inner_data(data: &Bytes) -> Result<DecodedCall> {
    match erc20::decode(data) {
        Err(DecodeError::UnknownSelector { .. }) => decode(data),
        result => result,
    }
}
