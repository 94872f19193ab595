// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Discovery of the tokens owned by a user.
//!
//! The contract does not enumerate tokens per owner, so ids are probed one by one from 1
//! up to a configured bound. Probing stops as soon as the user's known balance is
//! accounted for.

use std::sync::Arc;

use futures::{future, stream, StreamExt as _};
use promptdrop_ethereum::{client::NftQueries, Address};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{
    config::GalleryConfig,
    extractor::{ContentExtractor, ExtractedContent},
    prober::{OwnershipProber, OwnershipRecord, Probe},
};

/// A token owned by the user, with its display fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedToken {
    pub record: OwnershipRecord,
    pub descriptor: String,
    pub content: ExtractedContent,
}

impl OwnedToken {
    pub fn token_id(&self) -> u64 {
        self.record.token_id
    }
}

/// Collects the tokens owned by a user.
pub struct Aggregator<Q> {
    prober: OwnershipProber<Q>,
    extractor: ContentExtractor,
    scan_bound: u64,
    max_in_flight: usize,
}

impl<Q: NftQueries> Aggregator<Q> {
    pub fn new(queries: Arc<Q>, config: &GalleryConfig) -> Self {
        Self {
            prober: OwnershipProber::new(queries),
            extractor: config.extractor(),
            scan_bound: config.scan_bound,
            max_in_flight: config.max_in_flight.max(1),
        }
    }

    pub fn queries(&self) -> &Arc<Q> {
        self.prober.queries()
    }

    pub fn scan_bound(&self) -> u64 {
        self.scan_bound
    }

    pub fn extractor(&self) -> &ContentExtractor {
        &self.extractor
    }

    /// Returns the tokens owned by `user` with ids in `[1, scan_bound]`, ascending, at
    /// most `known_balance` of them.
    pub async fn collect(&self, user: Address, known_balance: u64) -> Vec<OwnedToken> {
        self.collect_with_progress(user, known_balance, |_| {}).await
    }

    /// Same as [`Self::collect`], calling `on_probe` with each probed id, in ascending
    /// order.
    #[instrument(level = "debug", skip(self, on_probe))]
    pub async fn collect_with_progress(
        &self,
        user: Address,
        known_balance: u64,
        mut on_probe: impl FnMut(u64),
    ) -> Vec<OwnedToken> {
        if known_balance == 0 {
            return Vec::new();
        }
        let limit = usize::try_from(known_balance).unwrap_or(usize::MAX);
        let prober = &self.prober;
        // `buffered` yields in dispatch order, so results come out sorted by id.
        let tokens: Vec<OwnedToken> = stream::iter(1..=self.scan_bound)
            .map(|token_id| async move { (token_id, prober.probe(token_id, user).await) })
            .buffered(self.max_in_flight)
            .inspect(|(token_id, _)| on_probe(*token_id))
            .filter_map(|(_, probe)| future::ready(probe.filter(|probe| probe.record.is_owner)))
            .map(|probe| self.owned_token(probe))
            .take(limit)
            .collect()
            .await;
        debug!(found = tokens.len(), "Collection scan finished");
        tokens
    }

    fn owned_token(&self, probe: Probe) -> OwnedToken {
        let descriptor = probe.descriptor.unwrap_or_default();
        OwnedToken {
            record: probe.record,
            content: self.extractor.extract(&descriptor),
            descriptor,
        }
    }
}
