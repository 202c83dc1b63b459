//! MultiSend calldata decoder.
//!
//! `multiSend(bytes transactions)` wraps a packed, unpadded sequence of records:
//!
//! `operation(1) | to(20) | value(32) | dataLength(32) | data(dataLength)`

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolCall;

use crate::abi::IMultiSend;
use crate::call::{selector, DecodeError, DecodedCall, MultiSendEntry, Operation, Result};

const OPERATION_LEN: usize = 1;
const ADDRESS_LEN: usize = 20;
const WORD_LEN: usize = 32;
/// Fixed-size prefix of every record.
const HEADER_LEN: usize = OPERATION_LEN + ADDRESS_LEN + WORD_LEN + WORD_LEN;

/// Decode `multiSend` calldata into its records.
pub fn decode(data: &[u8]) -> Result<DecodedCall> {
    let selector = selector(data)?;
    if selector.0 != IMultiSend::multiSendCall::SELECTOR {
        return Err(DecodeError::UnknownSelector { selector });
    }

    let call = IMultiSend::multiSendCall::abi_decode(data).map_err(|err| {
        DecodeError::MalformedArgs {
            name: "multiSend",
            reason: err.to_string(),
        }
    })?;

    Ok(DecodedCall::MultiSendBatch {
        calls: decode_transactions(&call.transactions)?,
    })
}

/// Unpack the packed `transactions` blob.
///
/// Any record that overruns the buffer, or an unknown operation byte, fails
/// the whole batch.
pub fn decode_transactions(packed: &[u8]) -> Result<Vec<MultiSendEntry>> {
    let mut entries = Vec::new();
    let mut offset = 0;

    while offset < packed.len() {
        let header = packed
            .get(offset..offset + HEADER_LEN)
            .ok_or_else(|| DecodeError::MalformedBatch {
                offset,
                reason: format!(
                    "truncated record header: {} bytes left, expected {HEADER_LEN}",
                    packed.len() - offset
                ),
            })?;

        let operation =
            Operation::try_from(header[0]).map_err(|op| DecodeError::MalformedBatch {
                offset,
                reason: format!("unknown operation {op}"),
            })?;
        let to = Address::from_slice(&header[OPERATION_LEN..OPERATION_LEN + ADDRESS_LEN]);
        let value_start = OPERATION_LEN + ADDRESS_LEN;
        let value = U256::from_be_slice(&header[value_start..value_start + WORD_LEN]);
        let data_len = U256::from_be_slice(&header[value_start + WORD_LEN..HEADER_LEN]);

        let data_start = offset + HEADER_LEN;
        let data_end = usize::try_from(data_len)
            .ok()
            .and_then(|len| data_start.checked_add(len))
            .filter(|end| *end <= packed.len())
            .ok_or_else(|| DecodeError::MalformedBatch {
                offset,
                reason: format!(
                    "data length {data_len} exceeds the {} remaining bytes",
                    packed.len() - data_start
                ),
            })?;

        entries.push(MultiSendEntry {
            operation,
            to,
            value,
            data: Bytes::copy_from_slice(&packed[data_start..data_end]),
        });
        offset = data_end;
    }

    Ok(entries)
}
