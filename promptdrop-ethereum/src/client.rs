// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::fmt::{self, Display, Formatter};

use alloy::primitives::{Address, B256};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The contract function that returns the descriptor of a token.
///
/// Deployed variants of the contract disagree on which accessor holds the text, so the
/// choice is part of the configuration.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "camelCase")]
pub enum ContentAccessor {
    /// `getPrompt(uint256)`
    #[default]
    GetPrompt,
    /// `tokenURI(uint256)`
    TokenUri,
    /// The public `prompts(uint256)` mapping.
    Prompts,
}

impl Display for ContentAccessor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContentAccessor::GetPrompt => "getPrompt",
            ContentAccessor::TokenUri => "tokenURI",
            ContentAccessor::Prompts => "prompts",
        };
        f.write_str(name)
    }
}

/// The outcome of a confirmed mint transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintReceipt {
    pub transaction_hash: B256,
    pub block_number: Option<u64>,
    /// The id of the minted token, when the receipt carries the `Transfer` event.
    pub token_id: Option<u64>,
}

/// Read-only queries against a PromptNFT contract.
#[async_trait]
pub trait NftQueries: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// The chain id of the network the client is connected to.
    async fn chain_id(&self) -> Result<u64, Self::Error>;

    /// The number of tokens held by `owner`.
    async fn balance_of(&self, owner: Address) -> Result<u64, Self::Error>;

    /// The current owner of `token_id`. Fails if the token does not exist.
    async fn owner_of(&self, token_id: u64) -> Result<Address, Self::Error>;

    /// The raw content stored for `token_id`, read with the configured accessor.
    async fn content_of(&self, token_id: u64) -> Result<String, Self::Error>;
}

/// Write access to a PromptNFT contract.
#[async_trait]
pub trait NftMinter: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Mints a token carrying `descriptor` to `to` and waits for the transaction to be
    /// included.
    async fn mint(&self, to: Address, descriptor: &str) -> Result<MintReceipt, Self::Error>;
}
