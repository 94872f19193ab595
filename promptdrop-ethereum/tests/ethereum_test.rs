// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use assert_matches::assert_matches;
use promptdrop_ethereum::{
    client::{ContentAccessor, NftMinter as _, NftQueries as _},
    common::EthereumServiceError,
    provider::EthereumClient,
    test_utils::{test_address, MemoryNftContract, SEPOLIA_CHAIN_ID},
    Address,
};

#[tokio::test]
async fn test_memory_contract_mint_and_read() -> anyhow::Result<()> {
    let contract = MemoryNftContract::default();
    let alice = test_address(1);
    let bob = test_address(2);

    let first = contract.mint(alice, "first prompt").await?;
    let second = contract.mint(bob, "second prompt").await?;
    assert_eq!(first.token_id, Some(1));
    assert_eq!(second.token_id, Some(2));
    assert_ne!(first.transaction_hash, second.transaction_hash);

    assert_eq!(contract.chain_id().await?, SEPOLIA_CHAIN_ID);
    assert_eq!(contract.balance_of(alice).await?, 1);
    assert_eq!(contract.owner_of(2).await?, bob);
    assert_eq!(contract.content_of(1).await?, "first prompt");
    Ok(())
}

#[tokio::test]
async fn test_memory_contract_nonexistent_and_failing_tokens() -> anyhow::Result<()> {
    let contract = MemoryNftContract::default();
    contract.insert(5, test_address(1), "gap before me").await;
    contract.fail_reads_for(5).await;

    assert_matches!(
        contract.owner_of(4).await,
        Err(EthereumServiceError::NonexistentToken(4))
    );
    assert_matches!(
        contract.owner_of(5).await,
        Err(EthereumServiceError::RpcError(_))
    );
    assert_eq!(contract.owner_queries(), 2);

    // Minting continues after the highest inserted id.
    let receipt = contract.mint(test_address(2), "next").await?;
    assert_eq!(receipt.token_id, Some(6));
    Ok(())
}

#[test]
fn test_client_rejects_invalid_url() {
    let result = EthereumClient::new("not a url", Address::ZERO, ContentAccessor::GetPrompt);
    assert_matches!(result, Err(EthereumServiceError::UrlParseError(_)));
}

#[test]
fn test_client_keeps_configuration() {
    let contract_address: Address = "0xDFFDEC1349d326173d825877a1D19267dDBbbe99"
        .parse()
        .unwrap();
    let client = EthereumClient::new(
        "http://127.0.0.1:8545",
        contract_address,
        ContentAccessor::TokenUri,
    )
    .unwrap();
    assert_eq!(client.contract_address(), contract_address);
    assert_eq!(client.accessor(), ContentAccessor::TokenUri);
    assert_eq!(client.accessor().to_string(), "tokenURI");
    let debug = format!("{client:?}");
    assert!(debug.contains("TokenUri"));
    assert!(debug.contains("contract_address"));
}
