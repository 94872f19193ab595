// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use promptdrop_ethereum::{client::NftQueries, Address};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, instrument};

use crate::{
    aggregator::{Aggregator, OwnedToken},
    config::GalleryConfig,
};

/// The progress of the most recent gallery refresh.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase", tag = "state")]
pub enum ScanState {
    /// No user, or the balance of the user is unknown.
    #[default]
    Idle,
    Scanning {
        token_id: u64,
    },
    Done {
        found: usize,
    },
}

/// The tokens owned by a user, ascending by id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub owner: Address,
    pub balance: u64,
    pub tokens: Vec<OwnedToken>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// There was no user to refresh the gallery for.
    Idle,
    Current(Collection),
    /// A later refresh started before this one finished; its results were discarded.
    Superseded,
}

#[derive(Debug, Error)]
pub enum GalleryError {
    #[error("failed to read the balance of {owner}")]
    Balance {
        owner: Address,
        #[source]
        error: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// The collection view of one contract.
///
/// Every refresh is numbered. Only the most recent one publishes its progress and
/// returns its results.
pub struct Gallery<Q> {
    aggregator: Aggregator<Q>,
    runs: AtomicU64,
    state: watch::Sender<ScanState>,
}

impl<Q: NftQueries> Gallery<Q> {
    pub fn new(queries: Arc<Q>, config: &GalleryConfig) -> Self {
        let (state, _) = watch::channel(ScanState::Idle);
        Self {
            aggregator: Aggregator::new(queries, config),
            runs: AtomicU64::new(0),
            state,
        }
    }

    pub fn aggregator(&self) -> &Aggregator<Q> {
        &self.aggregator
    }

    /// Returns a receiver of the scan state of the most recent refresh.
    pub fn subscribe(&self) -> watch::Receiver<ScanState> {
        self.state.subscribe()
    }

    pub fn scan_state(&self) -> ScanState {
        *self.state.borrow()
    }

    /// Rescans the tokens of `user`, or resets the gallery if there is none.
    #[instrument(skip(self))]
    pub async fn refresh(&self, user: Option<Address>) -> Result<RefreshOutcome, GalleryError> {
        let run = self.runs.fetch_add(1, Ordering::SeqCst) + 1;
        let Some(user) = user else {
            self.publish(run, ScanState::Idle);
            return Ok(RefreshOutcome::Idle);
        };

        let balance = match self.aggregator.queries().balance_of(user).await {
            Ok(balance) => balance,
            Err(error) => {
                self.publish(run, ScanState::Idle);
                return Err(GalleryError::Balance {
                    owner: user,
                    error: Box::new(error),
                });
            }
        };

        let tokens = self
            .aggregator
            .collect_with_progress(user, balance, |token_id| {
                self.publish(run, ScanState::Scanning { token_id });
            })
            .await;

        if !self.publish(run, ScanState::Done { found: tokens.len() }) {
            info!(run, "Discarding the results of a superseded refresh");
            return Ok(RefreshOutcome::Superseded);
        }
        info!(found = tokens.len(), balance, "Gallery refreshed");
        Ok(RefreshOutcome::Current(Collection {
            owner: user,
            balance,
            tokens,
        }))
    }

    fn is_current(&self, run: u64) -> bool {
        self.runs.load(Ordering::SeqCst) == run
    }

    /// Publishes `state` if `run` is the most recent refresh. The check happens under
    /// the lock of the channel, so a stale run never overwrites a newer state.
    fn publish(&self, run: u64, state: ScanState) -> bool {
        self.state.send_if_modified(|current| {
            if !self.is_current(run) {
                return false;
            }
            *current = state;
            true
        })
    }
}
