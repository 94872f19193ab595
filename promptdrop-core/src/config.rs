// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use clap::builder::RangedU64ValueParser;
use serde::{Deserialize, Serialize};

use crate::{
    descriptor::TagLabelSet,
    extractor::{ContentExtractor, PatternSet},
};

/// The highest token id probed by default.
pub const DEFAULT_SCAN_BOUND: u64 = 50;

/// The default number of ownership probes in flight at once.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 4;

/// How a gallery discovers and displays the tokens of a user.
#[derive(Debug, Clone, PartialEq, Eq, clap::Args, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryConfig {
    /// The highest token id to probe. Tokens are probed from id 1 upwards.
    #[serde(default = "default_scan_bound")]
    #[arg(long, default_value_t = DEFAULT_SCAN_BOUND, env = "PROMPTDROP_SCAN_BOUND")]
    pub scan_bound: u64,

    /// The maximum number of ownership probes in flight at once.
    #[serde(default = "default_max_in_flight")]
    #[arg(
        long,
        default_value_t = DEFAULT_MAX_IN_FLIGHT,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..),
        env = "PROMPTDROP_MAX_IN_FLIGHT"
    )]
    pub max_in_flight: usize,

    /// The patterns used to find the image URL of a descriptor.
    #[serde(default)]
    #[arg(long, value_enum, default_value_t, env = "PROMPTDROP_PATTERN_SET")]
    pub pattern_set: PatternSet,

    /// The tag labels recognized in descriptors and used to write them.
    #[serde(default)]
    #[arg(long, value_enum, default_value_t, env = "PROMPTDROP_TAG_LABELS")]
    pub tag_labels: TagLabelSet,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            scan_bound: DEFAULT_SCAN_BOUND,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            pattern_set: PatternSet::default(),
            tag_labels: TagLabelSet::default(),
        }
    }
}

impl GalleryConfig {
    pub fn extractor(&self) -> ContentExtractor {
        ContentExtractor::new(self.pattern_set.patterns(), &self.tag_labels.labels())
    }
}

fn default_scan_bound() -> u64 {
    DEFAULT_SCAN_BOUND
}

fn default_max_in_flight() -> usize {
    DEFAULT_MAX_IN_FLIGHT
}
