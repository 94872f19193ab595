// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The bracketed-tag convention used to embed image metadata in token descriptors.
//!
//! A descriptor is the prompt text followed, after a blank line, by one tag per line:
//!
//! ```text
//! 九尾火狐
//!
//! [图像URL: https://example.com/fox.png]
//! [生成模型: cogview-3]
//! [生成时间: 2024-01-01T00:00:00.000Z]
//! ```

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The model recorded when an image was attached without one.
pub const DEFAULT_IMAGE_MODEL: &str = "CogView-3";

/// The labels of the three known tag kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TagLabels {
    pub image_url: &'static str,
    pub model: &'static str,
    pub time: &'static str,
}

impl TagLabels {
    /// `[image URL: …]`, `[generation model: …]`, `[generation time: …]`.
    pub const ENGLISH: TagLabels = TagLabels {
        image_url: "image URL",
        model: "generation model",
        time: "generation time",
    };

    /// The labels written by the PromptDrop web mint page.
    pub const CHINESE: TagLabels = TagLabels {
        image_url: "图像URL",
        model: "生成模型",
        time: "生成时间",
    };

    pub fn all(&self) -> [&'static str; 3] {
        [self.image_url, self.model, self.time]
    }
}

/// Which label sets to recognize, or to write with.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "camelCase")]
pub enum TagLabelSet {
    #[default]
    All,
    #[value(name = "en")]
    English,
    #[value(name = "zh")]
    Chinese,
}

impl TagLabelSet {
    pub fn labels(self) -> Vec<TagLabels> {
        match self {
            TagLabelSet::All => vec![TagLabels::CHINESE, TagLabels::ENGLISH],
            TagLabelSet::English => vec![TagLabels::ENGLISH],
            TagLabelSet::Chinese => vec![TagLabels::CHINESE],
        }
    }

    /// The labels used when composing a descriptor. `All` writes the Chinese labels.
    pub fn writer_labels(self) -> TagLabels {
        match self {
            TagLabelSet::English => TagLabels::ENGLISH,
            TagLabelSet::All | TagLabelSet::Chinese => TagLabels::CHINESE,
        }
    }
}

/// A generated image to embed in a descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAttachment {
    pub url: String,
    pub model: Option<String>,
}

/// Builds the descriptor stored on chain for `prompt`.
///
/// Without an image the prompt is stored as is.
pub fn compose(
    prompt: &str,
    image: Option<&ImageAttachment>,
    labels: &TagLabels,
    generated_at: DateTime<Utc>,
) -> String {
    let Some(image) = image else {
        return prompt.to_string();
    };
    let model = image.model.as_deref().unwrap_or(DEFAULT_IMAGE_MODEL);
    let time = generated_at.to_rfc3339_opts(SecondsFormat::Millis, true);
    format!(
        "{prompt}\n\n[{}: {}]\n[{}: {model}]\n[{}: {time}]",
        labels.image_url, image.url, labels.model, labels.time,
    )
}

/// Returns the descriptor held in the raw content of a token.
///
/// Contracts that store JSON metadata in `tokenURI` keep the descriptor in the
/// `description` field, or in `prompt`. Anything else is the descriptor itself.
pub fn descriptor_from_content(raw: &str) -> String {
    let Ok(Value::Object(metadata)) = serde_json::from_str::<Value>(raw) else {
        return raw.to_string();
    };
    ["description", "prompt"]
        .iter()
        .filter_map(|field| metadata.get(*field).and_then(Value::as_str))
        .find(|text| !text.is_empty())
        .unwrap_or(raw)
        .to_string()
}

#[cfg(test)]
#[path = "unit_tests/descriptor.rs"]
mod tests;
