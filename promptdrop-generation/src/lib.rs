// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! HTTP clients of the services generating prompts and images.

mod client;
mod error;
pub mod image;
pub mod prompt;

pub use crate::{
    error::GenerationError,
    image::{GeneratedImage, ImageGenerator},
    prompt::{GeneratedPrompt, PromptGenerator},
};
