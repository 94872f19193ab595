// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The three-step mint flow: choose a prompt, optionally attach an image, then mint.

use chrono::{DateTime, Utc};
use promptdrop_ethereum::{
    client::{MintReceipt, NftMinter, NftQueries},
    Address,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::descriptor::{compose, ImageAttachment, TagLabels};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MintStep {
    #[default]
    Prompt,
    Image,
    Mint,
}

/// Where the prompt of a session comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PromptOrigin {
    Ai,
    Manual,
}

#[derive(Debug, Error)]
pub enum MintError {
    #[error("the prompt is empty")]
    EmptyPrompt,

    #[error("the mint session is at the {actual:?} step, not the {expected:?} step")]
    NotReady { expected: MintStep, actual: MintStep },

    #[error("wrong network: expected chain id {expected}, connected to chain id {actual}")]
    WrongNetwork { expected: u64, actual: u64 },

    #[error("failed to read the chain id of the connected network")]
    ChainId(#[source] BoxError),

    #[error("mint transaction failed")]
    Transaction(#[source] BoxError),
}

/// Refuses writes to any network other than the expected one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NetworkGuard {
    pub expected_chain_id: u64,
}

impl NetworkGuard {
    pub fn new(expected_chain_id: u64) -> Self {
        Self { expected_chain_id }
    }

    pub async fn check<Q: NftQueries>(&self, queries: &Q) -> Result<(), MintError> {
        let actual = queries
            .chain_id()
            .await
            .map_err(|error| MintError::ChainId(Box::new(error)))?;
        if actual != self.expected_chain_id {
            warn!(expected = self.expected_chain_id, actual, "Connected to the wrong network");
            return Err(MintError::WrongNetwork {
                expected: self.expected_chain_id,
                actual,
            });
        }
        Ok(())
    }
}

/// The state of one mint flow.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MintSession {
    step: MintStep,
    prompt: String,
    origin: Option<PromptOrigin>,
    image: Option<ImageAttachment>,
    labels: TagLabels,
}

impl Default for MintSession {
    fn default() -> Self {
        Self::new(TagLabels::CHINESE)
    }
}

impl MintSession {
    /// Creates a session writing descriptors with `labels`.
    pub fn new(labels: TagLabels) -> Self {
        Self {
            step: MintStep::Prompt,
            prompt: String::new(),
            origin: None,
            image: None,
            labels,
        }
    }

    pub fn step(&self) -> MintStep {
        self.step
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn origin(&self) -> Option<PromptOrigin> {
        self.origin
    }

    pub fn image(&self) -> Option<&ImageAttachment> {
        self.image.as_ref()
    }

    pub fn set_ai_prompt(&mut self, prompt: impl Into<String>) -> Result<(), MintError> {
        self.set_prompt(prompt.into(), PromptOrigin::Ai)
    }

    pub fn set_manual_prompt(&mut self, prompt: impl Into<String>) -> Result<(), MintError> {
        self.set_prompt(prompt.into(), PromptOrigin::Manual)
    }

    fn set_prompt(&mut self, prompt: String, origin: PromptOrigin) -> Result<(), MintError> {
        self.expect_step(MintStep::Prompt)?;
        self.prompt = prompt;
        self.origin = Some(origin);
        Ok(())
    }

    /// Moves on to the image step. The prompt must not be blank.
    pub fn confirm_prompt(&mut self) -> Result<(), MintError> {
        self.expect_step(MintStep::Prompt)?;
        if self.prompt.trim().is_empty() {
            return Err(MintError::EmptyPrompt);
        }
        self.step = MintStep::Image;
        Ok(())
    }

    pub fn attach_image(&mut self, image: ImageAttachment) -> Result<(), MintError> {
        self.expect_step(MintStep::Image)?;
        self.image = Some(image);
        self.step = MintStep::Mint;
        Ok(())
    }

    pub fn skip_image(&mut self) -> Result<(), MintError> {
        self.expect_step(MintStep::Image)?;
        self.image = None;
        self.step = MintStep::Mint;
        Ok(())
    }

    /// Returns to the previous step. The prompt and image are kept.
    pub fn go_back(&mut self) {
        self.step = match self.step {
            MintStep::Prompt | MintStep::Image => MintStep::Prompt,
            MintStep::Mint => MintStep::Image,
        };
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.labels);
    }

    /// The descriptor that minting now would store.
    pub fn descriptor(&self, generated_at: DateTime<Utc>) -> Result<String, MintError> {
        self.expect_step(MintStep::Mint)?;
        Ok(compose(
            self.prompt.trim(),
            self.image.as_ref(),
            &self.labels,
            generated_at,
        ))
    }

    /// Mints the session's descriptor to `to`, then resets the session.
    ///
    /// The network is checked first: nothing is sent unless `client` is connected to the
    /// chain expected by `guard`.
    #[instrument(skip(self, client))]
    pub async fn mint<C>(
        &mut self,
        client: &C,
        guard: &NetworkGuard,
        to: Address,
    ) -> Result<MintReceipt, MintError>
    where
        C: NftQueries + NftMinter,
    {
        let descriptor = self.descriptor(Utc::now())?;
        guard.check(client).await?;
        let receipt = client
            .mint(to, &descriptor)
            .await
            .map_err(|error| MintError::Transaction(Box::new(error)))?;
        info!(
            transaction_hash = %receipt.transaction_hash,
            token_id = ?receipt.token_id,
            "Minted prompt NFT"
        );
        self.reset();
        Ok(receipt)
    }

    fn expect_step(&self, expected: MintStep) -> Result<(), MintError> {
        if self.step != expected {
            return Err(MintError::NotReady {
                expected,
                actual: self.step,
            });
        }
        Ok(())
    }
}
