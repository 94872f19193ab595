// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The PromptDrop pipeline: discovering the prompt NFTs owned by a user, extracting the
//! prompt and image of each, and minting new ones.

pub mod aggregator;
pub mod config;
pub mod descriptor;
pub mod extractor;
pub mod gallery;
pub mod mint;
pub mod prober;

pub use crate::{
    aggregator::{Aggregator, OwnedToken},
    config::GalleryConfig,
    descriptor::{ImageAttachment, TagLabelSet, TagLabels},
    extractor::{ContentExtractor, ExtractedContent, ImagePattern, PatternSet},
    gallery::{Collection, Gallery, GalleryError, RefreshOutcome, ScanState},
    mint::{MintError, MintSession, MintStep, NetworkGuard, PromptOrigin},
    prober::{OwnershipProber, OwnershipRecord, Probe},
};
