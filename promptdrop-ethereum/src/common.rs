// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use alloy::{
    primitives::{B256, U256},
    transports::TransportError,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EthereumServiceError {
    /// A `uint256` returned by the contract does not fit in a token id or a balance.
    #[error("the value {0} does not fit in 64 bits")]
    ValueOutOfRange(U256),

    /// The token was never minted or has been burned.
    #[error("token {0} does not exist")]
    NonexistentToken(u64),

    /// The mint transaction was included but reverted.
    #[error("transaction {0} was reverted")]
    TransactionReverted(B256),

    /// Contract call error
    #[error(transparent)]
    ContractError(#[from] alloy::contract::Error),

    /// RPC error
    #[error(transparent)]
    RpcError(#[from] TransportError),

    /// Error while waiting for a transaction to be confirmed
    #[error(transparent)]
    PendingTransactionError(#[from] alloy::providers::PendingTransactionError),

    /// URL parsing error
    #[error(transparent)]
    UrlParseError(#[from] url::ParseError),
}

/// Converts a contract `uint256` into a `u64`, the representation used for token ids
/// and balances.
pub fn u256_to_u64(value: U256) -> Result<u64, EthereumServiceError> {
    if value > U256::from(u64::MAX) {
        return Err(EthereumServiceError::ValueOutOfRange(value));
    }
    Ok(value.to::<u64>())
}
