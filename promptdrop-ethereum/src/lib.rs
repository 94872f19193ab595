// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! This module provides functionalities for reading and minting PromptNFT tokens on an
//! Ethereum node.

pub mod client;
pub mod common;
pub mod contract;
pub mod provider;

/// Helper types for tests.
#[cfg(any(test, feature = "test"))]
pub mod test_utils;

pub use alloy::primitives::{Address, B256, U256};
