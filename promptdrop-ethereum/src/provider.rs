// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use alloy::{
    network::EthereumWallet,
    primitives::{Address, U256},
    providers::{DynProvider, Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
};
use async_trait::async_trait;
use tracing::{debug, info, instrument};
use url::Url;

use crate::{
    client::{ContentAccessor, MintReceipt, NftMinter, NftQueries},
    common::{u256_to_u64, EthereumServiceError},
    contract::PromptNft,
};

/// A JSON-RPC client bound to one deployed PromptNFT contract.
pub struct EthereumClient {
    provider: DynProvider,
    contract_address: Address,
    accessor: ContentAccessor,
    mint_value: U256,
}

impl EthereumClient {
    /// Connects to an Ethereum node for read-only access to the contract at
    /// `contract_address`.
    pub fn new(
        url: &str,
        contract_address: Address,
        accessor: ContentAccessor,
    ) -> Result<Self, EthereumServiceError> {
        let rpc_url = Url::parse(url)?;
        let provider = ProviderBuilder::new().connect_http(rpc_url).erased();
        Ok(Self {
            provider,
            contract_address,
            accessor,
            mint_value: U256::ZERO,
        })
    }

    /// Connects to an Ethereum node with a local signer, so that mint transactions are
    /// signed before being sent. Each mint attaches `mint_value` wei.
    pub fn with_signer(
        url: &str,
        contract_address: Address,
        accessor: ContentAccessor,
        signer: PrivateKeySigner,
        mint_value: U256,
    ) -> Result<Self, EthereumServiceError> {
        let rpc_url = Url::parse(url)?;
        info!(signer = %signer.address(), "Using local signer for mint transactions");
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(rpc_url)
            .erased();
        Ok(Self {
            provider,
            contract_address,
            accessor,
            mint_value,
        })
    }

    pub fn contract_address(&self) -> Address {
        self.contract_address
    }

    pub fn accessor(&self) -> ContentAccessor {
        self.accessor
    }
}

impl fmt::Debug for EthereumClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EthereumClient")
            .field("contract_address", &self.contract_address)
            .field("accessor", &self.accessor)
            .field("mint_value", &self.mint_value)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl NftQueries for EthereumClient {
    type Error = EthereumServiceError;

    async fn chain_id(&self) -> Result<u64, EthereumServiceError> {
        Ok(self.provider.get_chain_id().await?)
    }

    async fn balance_of(&self, owner: Address) -> Result<u64, EthereumServiceError> {
        let contract = PromptNft::new(self.contract_address, self.provider.clone());
        let balance = contract.balanceOf(owner).call().await?;
        u256_to_u64(balance)
    }

    async fn owner_of(&self, token_id: u64) -> Result<Address, EthereumServiceError> {
        let contract = PromptNft::new(self.contract_address, self.provider.clone());
        Ok(contract.ownerOf(U256::from(token_id)).call().await?)
    }

    async fn content_of(&self, token_id: u64) -> Result<String, EthereumServiceError> {
        let contract = PromptNft::new(self.contract_address, self.provider.clone());
        let token_id = U256::from(token_id);
        let content = match self.accessor {
            ContentAccessor::GetPrompt => contract.getPrompt(token_id).call().await?,
            ContentAccessor::TokenUri => contract.tokenURI(token_id).call().await?,
            ContentAccessor::Prompts => contract.prompts(token_id).call().await?,
        };
        Ok(content)
    }
}

#[async_trait]
impl NftMinter for EthereumClient {
    type Error = EthereumServiceError;

    #[instrument(skip(self, descriptor), fields(contract = %self.contract_address))]
    async fn mint(&self, to: Address, descriptor: &str) -> Result<MintReceipt, EthereumServiceError> {
        let contract = PromptNft::new(self.contract_address, self.provider.clone());
        let pending = contract
            .mint(to, descriptor.to_string())
            .value(self.mint_value)
            .send()
            .await?;
        let transaction_hash = *pending.tx_hash();
        info!(%transaction_hash, "Mint transaction sent, waiting for confirmation");

        let receipt = pending.get_receipt().await?;
        if !receipt.status() {
            return Err(EthereumServiceError::TransactionReverted(transaction_hash));
        }
        let token_id = receipt
            .inner
            .logs()
            .iter()
            .filter(|log| log.address() == self.contract_address)
            .find_map(|log| log.log_decode::<PromptNft::Transfer>().ok())
            .and_then(|event| u256_to_u64(event.inner.data.tokenId).ok());
        debug!(?token_id, block_number = ?receipt.block_number, "Mint transaction confirmed");

        Ok(MintReceipt {
            transaction_hash,
            block_number: receipt.block_number,
            token_id,
        })
    }
}
