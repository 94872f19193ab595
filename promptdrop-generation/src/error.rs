// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("service responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("service response is missing `{0}`")]
    MissingField(&'static str),

    #[error("`{0}` must not be empty")]
    EmptyInput(&'static str),

    #[error("no API key is configured for {0}")]
    MissingApiKey(&'static str),
}

impl GenerationError {
    /// Whether the error was caused by the input rather than by the service.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, GenerationError::EmptyInput(_))
    }
}
