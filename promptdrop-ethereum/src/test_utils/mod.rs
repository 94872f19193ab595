// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::atomic::{AtomicUsize, Ordering},
};

use alloy::{
    primitives::{Address, B256},
    transports::TransportErrorKind,
};
use async_lock::Mutex;
use async_trait::async_trait;

use crate::{
    client::{MintReceipt, NftMinter, NftQueries},
    common::EthereumServiceError,
};

/// The chain id of Sepolia, used by default in tests.
pub const SEPOLIA_CHAIN_ID: u64 = 11_155_111;

/// Returns a deterministic test address.
pub fn test_address(index: u8) -> Address {
    Address::repeat_byte(index)
}

#[derive(Default)]
struct MemoryState {
    tokens: BTreeMap<u64, (Address, String)>,
    next_token_id: u64,
    block_number: u64,
}

/// An in-memory PromptNFT contract.
///
/// Token ids are assigned from 1 upwards by [`NftMinter::mint`], like the deployed
/// contract, but tokens can also be inserted with arbitrary ids to leave gaps. Reads of
/// selected tokens can be made to fail with a transport error.
pub struct MemoryNftContract {
    chain_id: u64,
    state: Mutex<MemoryState>,
    failing_reads: Mutex<BTreeSet<u64>>,
    owner_queries: AtomicUsize,
    content_queries: AtomicUsize,
}

impl Default for MemoryNftContract {
    fn default() -> Self {
        Self::new(SEPOLIA_CHAIN_ID)
    }
}

impl MemoryNftContract {
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            state: Mutex::new(MemoryState {
                next_token_id: 1,
                ..MemoryState::default()
            }),
            failing_reads: Mutex::new(BTreeSet::new()),
            owner_queries: AtomicUsize::new(0),
            content_queries: AtomicUsize::new(0),
        }
    }

    /// Stores a token with the given id, owner and descriptor.
    pub async fn insert(&self, token_id: u64, owner: Address, descriptor: impl Into<String>) {
        let mut state = self.state.lock().await;
        state.tokens.insert(token_id, (owner, descriptor.into()));
        state.next_token_id = state.next_token_id.max(token_id + 1);
    }

    /// Makes every read of `token_id` fail with a transport error.
    pub async fn fail_reads_for(&self, token_id: u64) {
        self.failing_reads.lock().await.insert(token_id);
    }

    /// The descriptor stored for `token_id`, if any.
    pub async fn descriptor(&self, token_id: u64) -> Option<String> {
        let state = self.state.lock().await;
        state.tokens.get(&token_id).map(|(_, descriptor)| descriptor.clone())
    }

    /// The number of `ownerOf` calls received so far.
    pub fn owner_queries(&self) -> usize {
        self.owner_queries.load(Ordering::SeqCst)
    }

    /// The number of content reads received so far.
    pub fn content_queries(&self) -> usize {
        self.content_queries.load(Ordering::SeqCst)
    }

    /// The number of mint transactions included so far.
    pub async fn block_number(&self) -> u64 {
        self.state.lock().await.block_number
    }

    async fn check_readable(&self, token_id: u64) -> Result<(), EthereumServiceError> {
        if self.failing_reads.lock().await.contains(&token_id) {
            return Err(TransportErrorKind::custom_str("connection reset").into());
        }
        Ok(())
    }
}

#[async_trait]
impl NftQueries for MemoryNftContract {
    type Error = EthereumServiceError;

    async fn chain_id(&self) -> Result<u64, EthereumServiceError> {
        Ok(self.chain_id)
    }

    async fn balance_of(&self, owner: Address) -> Result<u64, EthereumServiceError> {
        let state = self.state.lock().await;
        let balance = state
            .tokens
            .values()
            .filter(|(token_owner, _)| *token_owner == owner)
            .count();
        Ok(balance as u64)
    }

    async fn owner_of(&self, token_id: u64) -> Result<Address, EthereumServiceError> {
        self.owner_queries.fetch_add(1, Ordering::SeqCst);
        self.check_readable(token_id).await?;
        let state = self.state.lock().await;
        state
            .tokens
            .get(&token_id)
            .map(|(owner, _)| *owner)
            .ok_or(EthereumServiceError::NonexistentToken(token_id))
    }

    async fn content_of(&self, token_id: u64) -> Result<String, EthereumServiceError> {
        self.content_queries.fetch_add(1, Ordering::SeqCst);
        self.check_readable(token_id).await?;
        self.descriptor(token_id)
            .await
            .ok_or(EthereumServiceError::NonexistentToken(token_id))
    }
}

#[async_trait]
impl NftMinter for MemoryNftContract {
    type Error = EthereumServiceError;

    async fn mint(&self, to: Address, descriptor: &str) -> Result<MintReceipt, EthereumServiceError> {
        let mut state = self.state.lock().await;
        let token_id = state.next_token_id;
        state.next_token_id += 1;
        state.block_number += 1;
        state.tokens.insert(token_id, (to, descriptor.to_string()));
        Ok(MintReceipt {
            transaction_hash: B256::left_padding_from(&state.block_number.to_be_bytes()),
            block_number: Some(state.block_number),
            token_id: Some(token_id),
        })
    }
}
