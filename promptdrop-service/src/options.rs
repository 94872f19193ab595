// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

use alloy::signers::local::PrivateKeySigner;
use anyhow::Context as _;
use promptdrop_core::NetworkGuard;
use promptdrop_ethereum::{
    client::ContentAccessor, provider::EthereumClient, Address, U256,
};
use promptdrop_generation::{
    image::DEFAULT_IMAGE_API_URL, prompt::DEFAULT_LLM_API_URL, ImageGenerator, PromptGenerator,
};

/// The chain id of Sepolia.
pub const SEPOLIA_CHAIN_ID: u64 = 11_155_111;

/// The PromptNFT contract deployed on Sepolia.
pub const DEFAULT_CONTRACT_ADDRESS: &str = "0xDFFDEC1349d326173d825877a1D19267dDBbbe99";

/// Access to the PromptNFT contract.
#[derive(Debug, Clone, clap::Args)]
pub struct ChainOptions {
    /// The JSON-RPC endpoint of an Ethereum node.
    #[arg(long, env = "PROMPTDROP_RPC_URL")]
    pub rpc_url: String,

    /// The address of the PromptNFT contract.
    #[arg(long, default_value = DEFAULT_CONTRACT_ADDRESS, env = "PROMPTDROP_CONTRACT_ADDRESS")]
    pub contract_address: Address,

    /// The only chain id that mint transactions are sent to.
    #[arg(long, default_value_t = SEPOLIA_CHAIN_ID, env = "PROMPTDROP_EXPECTED_CHAIN_ID")]
    pub expected_chain_id: u64,

    /// The contract function returning the descriptor of a token.
    #[arg(long, value_enum, default_value_t, env = "PROMPTDROP_CONTENT_ACCESSOR")]
    pub content_accessor: ContentAccessor,
}

impl ChainOptions {
    pub fn client(&self) -> anyhow::Result<EthereumClient> {
        EthereumClient::new(&self.rpc_url, self.contract_address, self.content_accessor)
            .with_context(|| format!("invalid RPC URL {}", self.rpc_url))
    }

    pub fn signing_client(&self, signer: PrivateKeySigner, mint_value: U256) -> anyhow::Result<EthereumClient> {
        EthereumClient::with_signer(
            &self.rpc_url,
            self.contract_address,
            self.content_accessor,
            signer,
            mint_value,
        )
        .with_context(|| format!("invalid RPC URL {}", self.rpc_url))
    }

    pub fn network_guard(&self) -> NetworkGuard {
        NetworkGuard::new(self.expected_chain_id)
    }
}

/// The account signing mint transactions.
#[derive(Debug, Clone, clap::Args)]
pub struct SignerOptions {
    /// The hex-encoded private key of the minting account.
    #[arg(long, env = "PROMPTDROP_PRIVATE_KEY", hide_env_values = true)]
    pub private_key: String,

    /// The value in wei attached to each mint transaction.
    #[arg(long, default_value = "0", env = "PROMPTDROP_MINT_VALUE_WEI")]
    pub mint_value_wei: U256,
}

impl SignerOptions {
    pub fn signer(&self) -> anyhow::Result<PrivateKeySigner> {
        self.private_key
            .trim()
            .parse()
            .context("invalid private key")
    }
}

/// The prompt-generation and image-generation services.
#[derive(Debug, Clone, clap::Args)]
pub struct GenerationOptions {
    /// The base URL of the chat-completions API generating prompts.
    #[arg(long, default_value = DEFAULT_LLM_API_URL, env = "PROMPTDROP_LLM_API_URL")]
    pub llm_api_url: String,

    #[arg(long, env = "DEEPSEEK_API_KEY", hide_env_values = true)]
    pub llm_api_key: Option<String>,

    /// The URL of the image-generations API.
    #[arg(long, default_value = DEFAULT_IMAGE_API_URL, env = "PROMPTDROP_IMAGE_API_URL")]
    pub image_api_url: String,

    #[arg(long, env = "PROMPTDROP_IMAGE_API_KEY", hide_env_values = true)]
    pub image_api_key: Option<String>,

    /// The timeout of requests to either service.
    #[arg(long, default_value = "60", env = "PROMPTDROP_HTTP_TIMEOUT_SECS")]
    pub http_timeout_secs: u64,
}

impl GenerationOptions {
    fn timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn prompt_generator(&self) -> anyhow::Result<PromptGenerator> {
        PromptGenerator::new(&self.llm_api_url, self.llm_api_key.clone(), self.timeout())
            .context("failed to create the prompt-generation client")
    }

    pub fn image_generator(&self) -> anyhow::Result<ImageGenerator> {
        ImageGenerator::new(&self.image_api_url, self.image_api_key.clone(), self.timeout())
            .context("failed to create the image-generation client")
    }
}
