//! Contract ABI definitions using alloy's `sol!` macro.
//!
//! Only the functions the guard decodes or queries are declared; every other
//! selector is unknown to the decoders by construction.

use alloy::sol;

sol! {
    /// ERC-20 value-moving functions.
    interface IERC20 {
        function transfer(address to, uint256 amount) external returns (bool);
        function transferFrom(address sender, address recipient, uint256 amount) external returns (bool);
        function approve(address spender, uint256 amount) external returns (bool);
    }
}

sol! {
    /// Safe singleton: execution, owner/module management, setup and views.
    ///
    /// Reference: <https://github.com/safe-global/safe-smart-account/blob/v1.4.1/contracts/Safe.sol>
    interface ISafe {
        function execTransaction(
            address to,
            uint256 value,
            bytes data,
            uint8 operation,
            uint256 safeTxGas,
            uint256 baseGas,
            uint256 gasPrice,
            address gasToken,
            address refundReceiver,
            bytes signatures
        ) external payable returns (bool success);

        function addOwnerWithThreshold(address owner, uint256 threshold) external;
        function changeThreshold(uint256 threshold) external;
        function enableModule(address module) external;
        function disableModule(address prevModule, address module) external;
        function removeOwner(address prevOwner, address owner, uint256 threshold) external;
        function setFallbackHandler(address handler) external;
        function setGuard(address guard) external;
        function swapOwner(address prevOwner, address oldOwner, address newOwner) external;

        function setup(
            address[] owners,
            uint256 threshold,
            address to,
            bytes data,
            address fallbackHandler,
            address paymentToken,
            uint256 payment,
            address paymentReceiver
        ) external;

        function getOwners() external view returns (address[] memory);
        function getThreshold() external view returns (uint256);
        function nonce() external view returns (uint256);
        function VERSION() external view returns (string memory);
    }
}

sol! {
    /// Batch-call contract (MultiSend and MultiSendCallOnly share the ABI).
    interface IMultiSend {
        function multiSend(bytes transactions) external payable;
    }
}

sol! {
    /// Safe proxy factory.
    interface IProxyFactory {
        function createProxyWithNonce(address singleton, bytes initializer, uint256 saltNonce)
            external
            returns (address proxy);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{Address, Bytes, U256};
    use alloy::sol_types::SolCall;

    #[test]
    fn erc20_selectors() {
        // transfer(address,uint256)
        assert_eq!(IERC20::transferCall::SELECTOR, [0xa9, 0x05, 0x9c, 0xbb]);
        // transferFrom(address,address,uint256)
        assert_eq!(IERC20::transferFromCall::SELECTOR, [0x23, 0xb8, 0x72, 0xdd]);
        // approve(address,uint256)
        assert_eq!(IERC20::approveCall::SELECTOR, [0x09, 0x5e, 0xa7, 0xb3]);
    }

    #[test]
    fn safe_selectors() {
        assert_eq!(ISafe::execTransactionCall::SELECTOR, [0x6a, 0x76, 0x12, 0x02]);
        assert_eq!(ISafe::addOwnerWithThresholdCall::SELECTOR, [0x0d, 0x58, 0x2f, 0x13]);
        assert_eq!(ISafe::changeThresholdCall::SELECTOR, [0x69, 0x4e, 0x80, 0xc3]);
        assert_eq!(ISafe::enableModuleCall::SELECTOR, [0x61, 0x0b, 0x59, 0x25]);
        assert_eq!(ISafe::disableModuleCall::SELECTOR, [0xe0, 0x09, 0xcf, 0xde]);
        assert_eq!(ISafe::removeOwnerCall::SELECTOR, [0xf8, 0xdc, 0x5d, 0xd9]);
        assert_eq!(ISafe::setFallbackHandlerCall::SELECTOR, [0xf0, 0x8a, 0x03, 0x23]);
        assert_eq!(ISafe::setGuardCall::SELECTOR, [0xe1, 0x9a, 0x9d, 0xd9]);
        assert_eq!(ISafe::swapOwnerCall::SELECTOR, [0xe3, 0x18, 0xb5, 0x2b]);
        assert_eq!(ISafe::setupCall::SELECTOR, [0xb6, 0x3e, 0x80, 0x0d]);
        assert_eq!(ISafe::getOwnersCall::SELECTOR, [0xa0, 0xe6, 0x7e, 0x2b]);
    }

    #[test]
    fn multi_send_and_factory_selectors() {
        assert_eq!(IMultiSend::multiSendCall::SELECTOR, [0x8d, 0x80, 0xff, 0x0a]);
        assert_eq!(
            IProxyFactory::createProxyWithNonceCall::SELECTOR,
            [0x16, 0x88, 0xf0, 0xb9]
        );
    }

    #[test]
    fn encode_change_threshold() {
        let encoded = ISafe::changeThresholdCall {
            threshold: U256::from(2u64),
        }
        .abi_encode();
        // 4 bytes selector + 32 bytes uint256
        assert_eq!(encoded.len(), 36);
        assert_eq!(encoded[35], 2);
    }

    #[test]
    fn encode_exec_transaction_is_dynamic() {
        let encoded = ISafe::execTransactionCall {
            to: Address::ZERO,
            value: U256::ZERO,
            data: Bytes::new(),
            operation: 0,
            safeTxGas: U256::ZERO,
            baseGas: U256::ZERO,
            gasPrice: U256::ZERO,
            gasToken: Address::ZERO,
            refundReceiver: Address::ZERO,
            signatures: Bytes::new(),
        }
        .abi_encode();
        // selector + 10 head words + 2 length words for the empty byte arrays
        assert_eq!(encoded.len(), 4 + 32 * 12);
    }

    #[test]
    fn decode_get_owners_return() {
        let owner = Address::repeat_byte(0x11);
        let mut data = vec![0u8; 96];
        data[31] = 0x20; // offset
        data[63] = 0x01; // length
        data[76..96].copy_from_slice(owner.as_slice());
        let decoded: Vec<Address> =
            <ISafe::getOwnersCall as SolCall>::abi_decode_returns(&data).unwrap();
        assert_eq!(decoded, vec![owner]);
    }
}
