// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Reads through [`EthereumClient`] against a JSON-RPC node that serves a fixed set of
//! tokens.

use std::{
    collections::BTreeMap,
    future::IntoFuture as _,
    net::Ipv4Addr,
    sync::{Arc, Mutex},
};

use alloy::{
    primitives::{hex, Address, U256},
    sol_types::SolCall as _,
};
use axum::{extract::State, routing::post, Json, Router};
use promptdrop_ethereum::{
    client::{ContentAccessor, NftQueries as _},
    contract::PromptNft,
    provider::EthereumClient,
    test_utils::{test_address, SEPOLIA_CHAIN_ID},
};
use serde_json::{json, Value};
use test_case::test_case;
use tokio::net::TcpListener;

/// Tokens served by the node, and the contract functions called so far.
#[derive(Default)]
struct NodeState {
    contract: Address,
    tokens: BTreeMap<u64, (Address, String)>,
    calls: Mutex<Vec<&'static str>>,
}

impl NodeState {
    fn record(&self, function: &'static str) {
        self.calls.lock().unwrap().push(function);
    }

    fn content(&self, function: &'static str, token_id: U256) -> Result<Vec<u8>, &'static str> {
        self.record(function);
        let (_, descriptor) = self.token(token_id)?;
        Ok(PromptNft::getPromptCall::abi_encode_returns(descriptor))
    }

    fn token(&self, token_id: U256) -> Result<&(Address, String), &'static str> {
        self.tokens
            .get(&token_id.to::<u64>())
            .ok_or("execution reverted: nonexistent token")
    }

    /// Executes an `eth_call` against the served contract.
    fn call(&self, input: &[u8]) -> Result<Vec<u8>, &'static str> {
        let selector: [u8; 4] = input[..4].try_into().unwrap();
        match selector {
            PromptNft::balanceOfCall::SELECTOR => {
                self.record("balanceOf");
                let call = PromptNft::balanceOfCall::abi_decode(input).unwrap();
                let balance = self
                    .tokens
                    .values()
                    .filter(|(owner, _)| *owner == call.owner)
                    .count();
                Ok(PromptNft::balanceOfCall::abi_encode_returns(&U256::from(balance)))
            }
            PromptNft::ownerOfCall::SELECTOR => {
                self.record("ownerOf");
                let call = PromptNft::ownerOfCall::abi_decode(input).unwrap();
                let (owner, _) = self.token(call.tokenId)?;
                Ok(PromptNft::ownerOfCall::abi_encode_returns(owner))
            }
            PromptNft::getPromptCall::SELECTOR => {
                let call = PromptNft::getPromptCall::abi_decode(input).unwrap();
                self.content("getPrompt", call.tokenId)
            }
            PromptNft::tokenURICall::SELECTOR => {
                let call = PromptNft::tokenURICall::abi_decode(input).unwrap();
                self.content("tokenURI", call.tokenId)
            }
            PromptNft::promptsCall::SELECTOR => {
                let call = PromptNft::promptsCall::abi_decode(input).unwrap();
                self.content("prompts", call.tokenId)
            }
            _ => Err("execution reverted: unknown function"),
        }
    }
}

async fn json_rpc(State(node): State<Arc<NodeState>>, Json(request): Json<Value>) -> Json<Value> {
    let id = request["id"].clone();
    let result = match request["method"].as_str() {
        Some("eth_chainId") => Ok(json!(format!("{SEPOLIA_CHAIN_ID:#x}"))),
        Some("eth_call") => {
            let transaction = &request["params"][0];
            assert_eq!(
                transaction["to"].as_str().unwrap().parse::<Address>().unwrap(),
                node.contract
            );
            let input = transaction["input"]
                .as_str()
                .or_else(|| transaction["data"].as_str())
                .unwrap();
            node.call(&hex::decode(input).unwrap())
                .map(|output| json!(hex::encode_prefixed(output)))
        }
        _ => Err("method not supported"),
    };
    Json(match result {
        Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
        Err(message) => json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": { "code": 3, "message": message, "data": "0x" },
        }),
    })
}

/// Starts a JSON-RPC node serving the contract at `contract`.
async fn start_node(contract: Address) -> (String, Arc<NodeState>) {
    let mut node = NodeState {
        contract,
        ..NodeState::default()
    };
    node.tokens
        .insert(1, (test_address(1), "九尾火狐\n\n[图像URL: https://x.com/a.png]".into()));
    node.tokens.insert(2, (test_address(2), "harbor".into()));
    node.tokens.insert(3, (test_address(1), "plain prompt".into()));
    let node = Arc::new(node);

    let router = Router::new()
        .route("/", post(json_rpc))
        .with_state(node.clone());
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(axum::serve(listener, router).into_future());
    (format!("http://{address}"), node)
}

#[test_log::test(tokio::test)]
async fn test_client_reads_balance_and_owners() -> anyhow::Result<()> {
    let contract = test_address(0xaa);
    let (url, node) = start_node(contract).await;
    let client = EthereumClient::new(&url, contract, ContentAccessor::GetPrompt)?;

    assert_eq!(client.chain_id().await?, SEPOLIA_CHAIN_ID);
    assert_eq!(client.balance_of(test_address(1)).await?, 2);
    assert_eq!(client.balance_of(test_address(7)).await?, 0);
    assert_eq!(client.owner_of(2).await?, test_address(2));
    assert!(client.owner_of(4).await.is_err());
    assert_eq!(
        *node.calls.lock().unwrap(),
        ["balanceOf", "balanceOf", "ownerOf", "ownerOf"]
    );
    Ok(())
}

#[test_case(ContentAccessor::GetPrompt, "getPrompt"; "get prompt")]
#[test_case(ContentAccessor::TokenUri, "tokenURI"; "token uri")]
#[test_case(ContentAccessor::Prompts, "prompts"; "prompts mapping")]
#[test_log::test(tokio::test)]
async fn test_client_reads_content_through_accessor(
    accessor: ContentAccessor,
    function: &'static str,
) -> anyhow::Result<()> {
    let contract = test_address(0xaa);
    let (url, node) = start_node(contract).await;
    let client = EthereumClient::new(&url, contract, accessor)?;

    assert_eq!(
        client.content_of(1).await?,
        "九尾火狐\n\n[图像URL: https://x.com/a.png]"
    );
    assert_eq!(client.content_of(3).await?, "plain prompt");
    assert!(client.content_of(9).await.is_err());
    assert_eq!(*node.calls.lock().unwrap(), [function; 3]);
    Ok(())
}
