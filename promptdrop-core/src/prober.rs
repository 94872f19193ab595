// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use promptdrop_ethereum::{client::NftQueries, Address};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::descriptor::descriptor_from_content;

/// The ownership of one token, as seen by one probe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnershipRecord {
    pub token_id: u64,
    pub owner: Address,
    pub is_owner: bool,
}

/// A successful probe: the ownership record and, for owned tokens, the descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Probe {
    pub record: OwnershipRecord,
    pub descriptor: Option<String>,
}

/// Determines whether an address owns a token through a read interface.
pub struct OwnershipProber<Q> {
    queries: Arc<Q>,
}

impl<Q> Clone for OwnershipProber<Q> {
    fn clone(&self) -> Self {
        Self {
            queries: self.queries.clone(),
        }
    }
}

impl<Q: NftQueries> OwnershipProber<Q> {
    pub fn new(queries: Arc<Q>) -> Self {
        Self { queries }
    }

    pub fn queries(&self) -> &Arc<Q> {
        &self.queries
    }

    /// Probes `token_id` for `user`.
    ///
    /// Returns `None` when the token cannot be read, which includes tokens that do not
    /// exist. The descriptor of an owned token is read as well, and an owned token whose
    /// content cannot be read is also absent.
    #[instrument(level = "debug", skip(self))]
    pub async fn probe(&self, token_id: u64, user: Address) -> Option<Probe> {
        let owner = match self.queries.owner_of(token_id).await {
            Ok(owner) => owner,
            Err(error) => {
                debug!(%error, "Token is not readable");
                return None;
            }
        };
        let record = OwnershipRecord {
            token_id,
            owner,
            is_owner: owner == user,
        };
        if !record.is_owner {
            return Some(Probe {
                record,
                descriptor: None,
            });
        }
        match self.queries.content_of(token_id).await {
            Ok(content) => Some(Probe {
                record,
                descriptor: Some(descriptor_from_content(&content)),
            }),
            Err(error) => {
                warn!(token_id, %error, "Failed to read the content of an owned token");
                None
            }
        }
    }
}
