//! ERC-20 calldata decoder.

use alloy::sol_types::SolInterface;

use crate::abi::IERC20;
use crate::call::{selector, DecodeError, DecodedCall, Result};

/// Try to identify a known ERC-20 function name from a 4-byte selector.
///
/// Selectors:
/// - transfer:     0xa9059cbb
/// - transferFrom: 0x23b872dd
/// - approve:      0x095ea7b3
fn selector_name(selector: [u8; 4]) -> Option<&'static str> {
    match selector {
        [0xa9, 0x05, 0x9c, 0xbb] => Some("transfer"),
        [0x23, 0xb8, 0x72, 0xdd] => Some("transferFrom"),
        [0x09, 0x5e, 0xa7, 0xb3] => Some("approve"),
        _ => None,
    }
}

/// Decode ERC-20 `transfer`, `transferFrom` or `approve` calldata.
pub fn decode(data: &[u8]) -> Result<DecodedCall> {
    let selector = selector(data)?;

    match IERC20::IERC20Calls::abi_decode(data) {
        Ok(IERC20::IERC20Calls::transfer(c)) => Ok(DecodedCall::Erc20Transfer { to: c.to }),
        Ok(IERC20::IERC20Calls::transferFrom(c)) => Ok(DecodedCall::Erc20TransferFrom {
            sender: c.sender,
            recipient: c.recipient,
        }),
        Ok(IERC20::IERC20Calls::approve(c)) => Ok(DecodedCall::Erc20Approve { spender: c.spender }),
        Err(err) => Err(match selector_name(selector.0) {
            Some(name) => DecodeError::MalformedArgs {
                name,
                reason: err.to_string(),
            },
            None => DecodeError::UnknownSelector { selector },
        }),
    }
}
