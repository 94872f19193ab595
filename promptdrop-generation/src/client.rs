// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::GenerationError;

const MAX_ERROR_BODY_LEN: usize = 500;

pub(crate) fn reqwest_client(timeout: Duration) -> Result<reqwest::Client, GenerationError> {
    Ok(reqwest::ClientBuilder::new().timeout(timeout).build()?)
}

/// Posts `body` as JSON to `url` and parses the JSON response.
pub(crate) async fn post_json<B, R>(
    client: &reqwest::Client,
    url: &str,
    api_key: &str,
    body: &B,
) -> Result<R, GenerationError>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    debug!(url, "Posting generation request");
    let response = client
        .post(url)
        .bearer_auth(api_key)
        .json(body)
        .send()
        .await?;
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|error| format!("Could not get response text: {error}"));
        return Err(GenerationError::Status {
            status: status.as_u16(),
            body: truncate(body),
        });
    }
    Ok(response.json().await?)
}

fn truncate(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY_LEN {
        let mut end = MAX_ERROR_BODY_LEN;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        body.truncate(end);
        body.push_str(" ...");
    }
    body
}
