//! Limit-address classification against the embedded deployment dataset.
//!
//! Safes are served from an in-memory lookup; every request targets mainnet
//! unless stated otherwise.

use std::sync::Arc;

use alloy::primitives::{address, hex, Address, Bytes, U256};
use alloy::sol_types::SolCall;
use relayguard_core::{ChainId, GuardConfig, RelayRequest, VersionPolicy};
use relayguard_evm::abi::{IMultiSend, IProxyFactory, ISafe, IERC20};
use relayguard_evm::{
    DeploymentRegistry, InMemorySafeLookup, LimitAddressError, LimitAddressesMapper, SafeRecord,
};

const MULTI_SEND_130: Address = address!("A238CBeb142c10Ef7Ad8442C6D1f9E89e07e7761");
const MULTI_SEND_CALL_ONLY_130: Address = address!("40A2aCCbd92BCA938b02010E17A5b8929b49130D");
const MULTI_SEND_141: Address = address!("38869bf66a61cF6bDB996A6aE40D5853Fd43B526");
const PROXY_FACTORY_130: Address = address!("a6B71E26C5e0845f74c812102Ca7114b6a896AB2");
const SAFE_L2_130: Address = address!("3E5c63644E683549055b9Be8653de26E0B4CD36E");
const SAFE_141: Address = address!("41675C099F32341bf84BFc5382aF534df5C7461a");

const WALLET: Address = address!("1111111111111111111111111111111111111111");
const OTHER_WALLET: Address = address!("2222222222222222222222222222222222222222");
const ALICE: Address = address!("00000000000000000000000000000000000A11CE");
const BOB: Address = address!("0000000000000000000000000000000000000B0B");
const TOKEN: Address = address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");

// ---- calldata builders ----

fn exec(to: Address, value: u64, data: Vec<u8>) -> Vec<u8> {
    exec_with_operation(to, value, data, 0)
}

fn exec_with_operation(to: Address, value: u64, data: Vec<u8>, operation: u8) -> Vec<u8> {
    ISafe::execTransactionCall {
        to,
        value: U256::from(value),
        data: data.into(),
        operation,
        safeTxGas: U256::ZERO,
        baseGas: U256::ZERO,
        gasPrice: U256::ZERO,
        gasToken: Address::ZERO,
        refundReceiver: Address::ZERO,
        signatures: Bytes::from(vec![0u8; 65]),
    }
    .abi_encode()
}

fn transfer(to: Address) -> Vec<u8> {
    IERC20::transferCall {
        to,
        amount: U256::from(1_000_000u64),
    }
    .abi_encode()
}

fn transfer_from(sender: Address, recipient: Address) -> Vec<u8> {
    IERC20::transferFromCall {
        sender,
        recipient,
        amount: U256::from(1u64),
    }
    .abi_encode()
}

fn add_owner(owner: Address) -> Vec<u8> {
    ISafe::addOwnerWithThresholdCall {
        owner,
        threshold: U256::from(1u64),
    }
    .abi_encode()
}

fn change_threshold(threshold: u64) -> Vec<u8> {
    ISafe::changeThresholdCall {
        threshold: U256::from(threshold),
    }
    .abi_encode()
}

fn multi_send(entries: &[(Address, Vec<u8>)]) -> Vec<u8> {
    let mut packed = Vec::new();
    for (to, data) in entries {
        packed.push(0u8);
        packed.extend_from_slice(to.as_slice());
        packed.extend_from_slice(&U256::ZERO.to_be_bytes::<32>());
        packed.extend_from_slice(&U256::from(data.len()).to_be_bytes::<32>());
        packed.extend_from_slice(data);
    }
    IMultiSend::multiSendCall {
        transactions: packed.into(),
    }
    .abi_encode()
}

fn setup(owners: Vec<Address>) -> Vec<u8> {
    ISafe::setupCall {
        owners,
        threshold: U256::from(1u64),
        to: Address::ZERO,
        data: Bytes::new(),
        fallbackHandler: Address::ZERO,
        paymentToken: Address::ZERO,
        payment: U256::ZERO,
        paymentReceiver: Address::ZERO,
    }
    .abi_encode()
}

fn create_proxy(singleton: Address, initializer: Vec<u8>) -> Vec<u8> {
    IProxyFactory::createProxyWithNonceCall {
        singleton,
        initializer: initializer.into(),
        saltNonce: U256::from(7u64),
    }
    .abi_encode()
}

/// `levels` execTransaction calls, each run by `WALLET` on itself, around a
/// native transfer to Alice.
fn nested_exec(levels: usize) -> Vec<u8> {
    let mut data = exec(ALICE, 1, vec![]);
    for _ in 1..levels {
        data = exec(WALLET, 0, data);
    }
    data
}

// ---- harness ----

fn safe_record(address: Address) -> SafeRecord {
    SafeRecord {
        address,
        owners: vec![ALICE, BOB],
        threshold: 2,
        nonce: 4,
        version: Some("1.3.0".into()),
        mastercopy: SAFE_L2_130,
    }
}

fn lookup() -> InMemorySafeLookup {
    InMemorySafeLookup::new()
        .with_safe(ChainId::MAINNET, safe_record(WALLET))
        .with_safe(ChainId::MAINNET, safe_record(OTHER_WALLET))
}

fn mapper_with(config: GuardConfig) -> LimitAddressesMapper<InMemorySafeLookup> {
    let registry = Arc::new(DeploymentRegistry::embedded().unwrap());
    LimitAddressesMapper::with_config(registry, lookup(), &config)
}

fn mapper() -> LimitAddressesMapper<InMemorySafeLookup> {
    mapper_with(GuardConfig::default())
}

fn request(to: Address, data: &[u8]) -> RelayRequest {
    versioned_request("1.3.0", to, data)
}

fn versioned_request(version: &str, to: Address, data: &[u8]) -> RelayRequest {
    RelayRequest::new("1", version, to.to_string(), hex::encode_prefixed(data))
}

async fn limit_addresses(to: Address, data: Vec<u8>) -> Result<Vec<Address>, LimitAddressError> {
    mapper().get_limit_addresses(&request(to, &data)).await
}

fn assert_invalid_transfer(result: Result<Vec<Address>, LimitAddressError>) {
    match result {
        Err(LimitAddressError::InvalidTransfer(_)) => {}
        other => panic!("expected InvalidTransfer, got {other:?}"),
    }
}

fn assert_invalid_batch(result: Result<Vec<Address>, LimitAddressError>) {
    match result {
        Err(LimitAddressError::InvalidMultiSendBatch(_)) => {}
        other => panic!("expected InvalidMultiSendBatch, got {other:?}"),
    }
}

// ---- wallet calls ----

#[tokio::test]
async fn native_transfer_to_third_party() {
    let result = limit_addresses(WALLET, exec(ALICE, 1, vec![])).await;
    assert_eq!(result.unwrap(), vec![WALLET]);
}

#[tokio::test]
async fn native_self_transfer_rejected() {
    assert_invalid_transfer(limit_addresses(WALLET, exec(WALLET, 1, vec![])).await);
}

#[tokio::test]
async fn token_transfer_to_third_party() {
    let result = limit_addresses(WALLET, exec(TOKEN, 0, transfer(ALICE))).await;
    assert_eq!(result.unwrap(), vec![WALLET]);
}

#[tokio::test]
async fn token_self_transfer_rejected() {
    assert_invalid_transfer(limit_addresses(WALLET, exec(TOKEN, 0, transfer(WALLET))).await);
}

#[tokio::test]
async fn transfer_from_rules() {
    let ok = limit_addresses(WALLET, exec(TOKEN, 0, transfer_from(ALICE, BOB))).await;
    assert_eq!(ok.unwrap(), vec![WALLET]);

    assert_invalid_transfer(
        limit_addresses(WALLET, exec(TOKEN, 0, transfer_from(ALICE, WALLET))).await,
    );
    assert_invalid_transfer(
        limit_addresses(WALLET, exec(TOKEN, 0, transfer_from(ALICE, ALICE))).await,
    );
}

#[tokio::test]
async fn approve_allowed() {
    let data = IERC20::approveCall {
        spender: ALICE,
        amount: U256::MAX,
    }
    .abi_encode();
    let result = limit_addresses(WALLET, exec(TOKEN, 0, data)).await;
    assert_eq!(result.unwrap(), vec![WALLET]);
}

#[tokio::test]
async fn admin_self_calls_allowed() {
    for data in [
        add_owner(ALICE),
        change_threshold(1),
        ISafe::setGuardCall { guard: Address::ZERO }.abi_encode(),
        ISafe::enableModuleCall { module: BOB }.abi_encode(),
    ] {
        let result = limit_addresses(WALLET, exec(WALLET, 0, data)).await;
        assert_eq!(result.unwrap(), vec![WALLET]);
    }
}

#[tokio::test]
async fn cancellation_allowed() {
    let result = limit_addresses(WALLET, exec(WALLET, 0, vec![])).await;
    assert_eq!(result.unwrap(), vec![WALLET]);
}

#[tokio::test]
async fn admin_call_on_another_safe_rejected() {
    assert_invalid_transfer(limit_addresses(WALLET, exec(OTHER_WALLET, 0, add_owner(ALICE))).await);
}

#[tokio::test]
async fn unrecognized_calls_rejected() {
    // a getter is valid Safe ABI but never a relayable action
    let getter = ISafe::getOwnersCall {}.abi_encode();
    assert_invalid_transfer(limit_addresses(WALLET, exec(WALLET, 0, getter)).await);
    // token call on itself
    assert_invalid_transfer(limit_addresses(WALLET, exec(WALLET, 0, transfer(ALICE))).await);
    // arbitrary contract call
    assert_invalid_transfer(
        limit_addresses(WALLET, exec(TOKEN, 0, vec![0xde, 0xad, 0xbe, 0xef])).await,
    );
    // setup is not an inner call
    assert_invalid_transfer(limit_addresses(WALLET, exec(TOKEN, 0, setup(vec![ALICE]))).await);
}

#[tokio::test]
async fn wallet_data_must_be_exec_transaction() {
    assert_invalid_transfer(limit_addresses(WALLET, vec![]).await);
    assert_invalid_transfer(limit_addresses(WALLET, change_threshold(1)).await);
    assert_invalid_transfer(limit_addresses(WALLET, transfer(ALICE)).await);
}

#[tokio::test]
async fn nested_exec_within_depth() {
    let result = limit_addresses(WALLET, nested_exec(3)).await;
    assert_eq!(result.unwrap(), vec![WALLET]);
}

#[tokio::test]
async fn nested_exec_beyond_depth_rejected() {
    assert_invalid_transfer(limit_addresses(WALLET, nested_exec(4)).await);
    assert_invalid_transfer(limit_addresses(WALLET, nested_exec(64)).await);
}

#[tokio::test]
async fn nesting_bound_is_configurable() {
    let config = GuardConfig {
        max_nesting_depth: 1,
        ..GuardConfig::default()
    };
    let mapper = mapper_with(config);
    let flat = mapper.get_limit_addresses(&request(WALLET, &nested_exec(1))).await;
    assert_eq!(flat.unwrap(), vec![WALLET]);
    assert_invalid_transfer(
        mapper
            .get_limit_addresses(&request(WALLET, &nested_exec(2)))
            .await,
    );
}

#[tokio::test]
async fn nested_exec_into_other_contract_rejected() {
    // another official Safe is still not the subject wallet
    let inner = exec(ALICE, 1, vec![]);
    assert_invalid_transfer(limit_addresses(WALLET, exec(OTHER_WALLET, 0, inner.clone())).await);

    // a contract that merely exposes the execTransaction selector
    let unverified = address!("eeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee");
    assert_invalid_transfer(limit_addresses(WALLET, exec(unverified, 0, inner)).await);
}

#[tokio::test]
async fn nested_exec_into_other_contract_rejected_in_batch() {
    let data = multi_send(&[(WALLET, exec(OTHER_WALLET, 0, exec(ALICE, 1, vec![])))]);
    assert_invalid_batch(limit_addresses(MULTI_SEND_130, data).await);
}

// ---- operation byte ----

#[tokio::test]
async fn delegatecall_rejected() {
    let target = address!("eeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee");
    assert_invalid_transfer(
        limit_addresses(WALLET, exec_with_operation(target, 0, vec![], 1)).await,
    );
    assert_invalid_transfer(
        limit_addresses(WALLET, exec_with_operation(target, 0, transfer(ALICE), 1)).await,
    );
    let approve = IERC20::approveCall {
        spender: ALICE,
        amount: U256::MAX,
    }
    .abi_encode();
    assert_invalid_transfer(limit_addresses(WALLET, exec_with_operation(target, 0, approve, 1)).await);
}

#[tokio::test]
async fn delegatecall_rejected_when_nested() {
    let inner = exec_with_operation(ALICE, 0, vec![], 1);
    assert_invalid_transfer(limit_addresses(WALLET, exec(WALLET, 0, inner)).await);
}

#[tokio::test]
async fn delegatecall_fails_batch() {
    let data = multi_send(&[
        (WALLET, exec(ALICE, 1, vec![])),
        (WALLET, exec_with_operation(TOKEN, 0, transfer(ALICE), 1)),
    ]);
    assert_invalid_batch(limit_addresses(MULTI_SEND_130, data).await);
}

#[tokio::test]
async fn unknown_operation_rejected() {
    assert_invalid_transfer(
        limit_addresses(WALLET, exec_with_operation(ALICE, 1, vec![], 2)).await,
    );
}

// ---- official-mastercopy gate ----

#[tokio::test]
async fn unknown_target_rejected() {
    let stranger = address!("9999999999999999999999999999999999999999");
    let err = limit_addresses(stranger, exec(ALICE, 1, vec![]))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        LimitAddressError::UnofficialMastercopy {
            address: stranger,
            chain_id: ChainId::MAINNET,
        }
    );
}

#[tokio::test]
async fn singleton_is_not_a_wallet() {
    let err = limit_addresses(SAFE_L2_130, exec(ALICE, 1, vec![]))
        .await
        .unwrap_err();
    assert!(matches!(err, LimitAddressError::UnofficialMastercopy { .. }));
}

#[tokio::test]
async fn lookup_is_per_chain() {
    let data = exec(ALICE, 1, vec![]);
    let req = RelayRequest::new("137", "1.3.0", WALLET.to_string(), hex::encode_prefixed(&data));
    let err = mapper().get_limit_addresses(&req).await.unwrap_err();
    assert_eq!(
        err,
        LimitAddressError::UnofficialMastercopy {
            address: WALLET,
            chain_id: ChainId::POLYGON,
        }
    );
}

// ---- MultiSend ----

#[tokio::test]
async fn admin_batch_to_one_wallet() {
    let data = multi_send(&[
        (WALLET, exec(WALLET, 0, add_owner(ALICE))),
        (WALLET, exec(WALLET, 0, change_threshold(2))),
    ]);
    let result = limit_addresses(MULTI_SEND_130, data).await;
    assert_eq!(result.unwrap(), vec![WALLET]);
}

#[tokio::test]
async fn call_only_variant_accepted() {
    let data = multi_send(&[(WALLET, exec(ALICE, 1, vec![]))]);
    let result = limit_addresses(MULTI_SEND_CALL_ONLY_130, data).await;
    assert_eq!(result.unwrap(), vec![WALLET]);
}

#[tokio::test]
async fn mixed_targets_rejected() {
    // each entry is valid on its own
    let data = multi_send(&[
        (WALLET, exec(ALICE, 1, vec![])),
        (OTHER_WALLET, exec(ALICE, 1, vec![])),
    ]);
    assert_invalid_batch(limit_addresses(MULTI_SEND_130, data).await);
}

#[tokio::test]
async fn empty_batch_rejected() {
    assert_invalid_batch(limit_addresses(MULTI_SEND_130, multi_send(&[])).await);
}

#[tokio::test]
async fn batch_entry_must_be_exec_transaction() {
    let data = multi_send(&[
        (WALLET, exec(ALICE, 1, vec![])),
        (WALLET, change_threshold(1)),
    ]);
    assert_invalid_batch(limit_addresses(MULTI_SEND_130, data).await);
}

#[tokio::test]
async fn invalid_entry_fails_batch() {
    let data = multi_send(&[
        (WALLET, exec(ALICE, 1, vec![])),
        (WALLET, exec(TOKEN, 0, transfer(WALLET))),
    ]);
    assert_invalid_batch(limit_addresses(MULTI_SEND_130, data).await);
}

#[tokio::test]
async fn malformed_batch_rejected() {
    let data = IMultiSend::multiSendCall {
        transactions: vec![0u8; 40].into(),
    }
    .abi_encode();
    assert_invalid_batch(limit_addresses(MULTI_SEND_130, data).await);
    assert_invalid_batch(limit_addresses(MULTI_SEND_130, transfer(ALICE)).await);
}

#[tokio::test]
async fn batch_to_unknown_wallet_rejected() {
    let stranger = address!("9999999999999999999999999999999999999999");
    let data = multi_send(&[(stranger, exec(ALICE, 1, vec![]))]);
    let err = limit_addresses(MULTI_SEND_130, data).await.unwrap_err();
    assert!(matches!(err, LimitAddressError::UnofficialMastercopy { address, .. } if address == stranger));
}

#[tokio::test]
async fn unofficial_multi_send_rejected() {
    let lookalike = address!("3333333333333333333333333333333333333333");
    let data = multi_send(&[(WALLET, exec(ALICE, 1, vec![]))]);
    let err = limit_addresses(lookalike, data).await.unwrap_err();
    assert_eq!(err, LimitAddressError::UnofficialMultiSend(lookalike));
}

#[tokio::test]
async fn multi_send_checked_against_declared_version() {
    let data = multi_send(&[(WALLET, exec(ALICE, 1, vec![]))]);
    let err = mapper()
        .get_limit_addresses(&versioned_request("1.4.1", MULTI_SEND_130, &data))
        .await
        .unwrap_err();
    assert_eq!(err, LimitAddressError::UnofficialMultiSend(MULTI_SEND_130));

    let result = mapper()
        .get_limit_addresses(&versioned_request("1.4.1", MULTI_SEND_141, &data))
        .await;
    assert_eq!(result.unwrap(), vec![WALLET]);
}

// ---- proxy creation ----

#[tokio::test]
async fn proxy_creation_returns_owners() {
    let data = create_proxy(SAFE_L2_130, setup(vec![ALICE, BOB]));
    let result = limit_addresses(PROXY_FACTORY_130, data).await;
    assert_eq!(result.unwrap(), vec![ALICE, BOB]);
}

#[tokio::test]
async fn owners_keep_order_and_duplicates() {
    let owners = vec![BOB, ALICE, BOB, WALLET];
    let data = create_proxy(SAFE_L2_130, setup(owners.clone()));
    let result = limit_addresses(PROXY_FACTORY_130, data).await;
    assert_eq!(result.unwrap(), owners);
}

#[tokio::test]
async fn singleton_from_any_version_accepted() {
    let data = create_proxy(SAFE_141, setup(vec![ALICE]));
    let result = limit_addresses(PROXY_FACTORY_130, data).await;
    assert_eq!(result.unwrap(), vec![ALICE]);
}

#[tokio::test]
async fn unofficial_singleton_rejected() {
    let data = create_proxy(WALLET, setup(vec![ALICE]));
    let err = limit_addresses(PROXY_FACTORY_130, data).await.unwrap_err();
    assert_eq!(err, LimitAddressError::UnofficialSingleton(WALLET));

    // the MultiSend is official, but not a singleton
    let data = create_proxy(MULTI_SEND_130, setup(vec![ALICE]));
    let err = limit_addresses(PROXY_FACTORY_130, data).await.unwrap_err();
    assert_eq!(err, LimitAddressError::UnofficialSingleton(MULTI_SEND_130));
}

#[tokio::test]
async fn bad_initializer_rejected() {
    assert_invalid_transfer(
        limit_addresses(PROXY_FACTORY_130, create_proxy(SAFE_L2_130, setup(vec![]))).await,
    );
    assert_invalid_transfer(
        limit_addresses(PROXY_FACTORY_130, create_proxy(SAFE_L2_130, transfer(ALICE))).await,
    );
    assert_invalid_transfer(
        limit_addresses(PROXY_FACTORY_130, create_proxy(SAFE_L2_130, vec![])).await,
    );
    assert_invalid_transfer(limit_addresses(PROXY_FACTORY_130, exec(ALICE, 1, vec![])).await);
}

// ---- versions and input forms ----

#[tokio::test]
async fn unknown_version_falls_back_to_latest() {
    let data = multi_send(&[(WALLET, exec(ALICE, 1, vec![]))]);
    let result = mapper()
        .get_limit_addresses(&versioned_request("9.9.9", MULTI_SEND_141, &data))
        .await;
    assert_eq!(result.unwrap(), vec![WALLET]);

    // the 1.3.0 MultiSend is not part of the fallback version
    let err = mapper()
        .get_limit_addresses(&versioned_request("9.9.9", MULTI_SEND_130, &data))
        .await
        .unwrap_err();
    assert_eq!(err, LimitAddressError::UnofficialMultiSend(MULTI_SEND_130));
}

#[tokio::test]
async fn strict_policy_rejects_unknown_version() {
    let config = GuardConfig {
        version_policy: VersionPolicy::Strict,
        ..GuardConfig::default()
    };
    let data = exec(ALICE, 1, vec![]);
    let err = mapper_with(config)
        .get_limit_addresses(&versioned_request("9.9.9", WALLET, &data))
        .await
        .unwrap_err();
    assert!(matches!(err, LimitAddressError::UnsupportedVersion { .. }));
}

#[tokio::test]
async fn address_casing_and_hex_prefix_ignored() {
    let data = exec(ALICE, 1, vec![]);
    let lower = RelayRequest::new(
        "1",
        "1.3.0",
        hex::encode(WALLET.as_slice()),
        hex::encode(&data),
    );
    let upper = RelayRequest::new(
        "1",
        "1.3.0",
        format!("0x{}", hex::encode_upper(WALLET.as_slice())),
        hex::encode_prefixed(&data),
    );
    let mapper = mapper();
    assert_eq!(mapper.get_limit_addresses(&lower).await.unwrap(), vec![WALLET]);
    assert_eq!(mapper.get_limit_addresses(&upper).await.unwrap(), vec![WALLET]);
}

#[tokio::test]
async fn repeated_requests_give_identical_results() {
    let mapper = mapper();
    let requests = [
        request(WALLET, &exec(ALICE, 1, vec![])),
        request(WALLET, &exec(WALLET, 1, vec![])),
        request(
            PROXY_FACTORY_130,
            &create_proxy(SAFE_L2_130, setup(vec![ALICE, BOB])),
        ),
    ];
    for req in &requests {
        let first = mapper.get_limit_addresses(req).await;
        let second = mapper.get_limit_addresses(req).await;
        assert_eq!(first, second);
    }
}
