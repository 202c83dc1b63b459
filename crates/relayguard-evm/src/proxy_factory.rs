//! Safe proxy factory calldata decoder.

use alloy::sol_types::SolCall;

use crate::abi::IProxyFactory;
use crate::call::{selector, DecodeError, DecodedCall, Result};

/// Decode `createProxyWithNonce(singleton, initializer, saltNonce)` calldata.
pub fn decode(data: &[u8]) -> Result<DecodedCall> {
    let selector = selector(data)?;
    if selector.0 != IProxyFactory::createProxyWithNonceCall::SELECTOR {
        return Err(DecodeError::UnknownSelector { selector });
    }

    let call = IProxyFactory::createProxyWithNonceCall::abi_decode(data).map_err(|err| {
        DecodeError::MalformedArgs {
            name: "createProxyWithNonce",
            reason: err.to_string(),
        }
    })?;

    Ok(DecodedCall::ProxyCreation {
        singleton: call.singleton,
        initializer: call.initializer,
        salt_nonce: call.saltNonce,
    })
}
