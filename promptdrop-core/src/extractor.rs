// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Extraction of the image URL and the human-readable prompt from a token descriptor.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::descriptor::{TagLabelSet, TagLabels};

/// The display fields derived from a descriptor.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedContent {
    pub image_url: Option<String>,
    pub clean_prompt: String,
}

/// A textual pattern locating an image URL in a descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImagePattern {
    /// `[image URL: https://…]`
    TaggedImageUrl,
    /// `image URL: https://…` outside of brackets.
    LabeledImageUrl,
    /// Any HTTP(S) URL ending in a known image file extension.
    ImageFileUrl,
    /// Any HTTP(S) URL.
    AnyUrl,
}

/// The predefined image pattern lists, most specific pattern first.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum PatternSet {
    /// Every pattern.
    #[default]
    Full,
    /// Only bracketed image tags.
    Tagged,
    /// Bracketed image tags, then any URL.
    TaggedOrAny,
}

impl PatternSet {
    pub fn patterns(self) -> &'static [ImagePattern] {
        use ImagePattern::*;
        match self {
            PatternSet::Full => &[TaggedImageUrl, LabeledImageUrl, ImageFileUrl, AnyUrl],
            PatternSet::Tagged => &[TaggedImageUrl],
            PatternSet::TaggedOrAny => &[TaggedImageUrl, AnyUrl],
        }
    }
}

const IMAGE_FILE_URL: &str = r"(?i)(https?://[^\s\]]+\.(?:png|jpg|jpeg|gif|webp))";
const ANY_URL: &str = r"(https?://[^\s\]]+)";

/// Derives [`ExtractedContent`] from descriptors.
///
/// Extraction is a pure function of the descriptor: no I/O and no failure mode. Text
/// without tags degrades to no image URL and the whole trimmed text as the prompt.
#[derive(Clone, Debug)]
pub struct ContentExtractor {
    image_patterns: Vec<Regex>,
    tag_patterns: Vec<Regex>,
}

impl Default for ContentExtractor {
    fn default() -> Self {
        Self::new(PatternSet::Full.patterns(), &TagLabelSet::All.labels())
    }
}

impl ContentExtractor {
    /// Creates an extractor trying `patterns` in order, for every set of `labels`.
    pub fn new(patterns: &[ImagePattern], labels: &[TagLabels]) -> Self {
        let mut image_patterns = Vec::new();
        for pattern in patterns {
            match pattern {
                ImagePattern::TaggedImageUrl => {
                    for labels in labels {
                        let label = regex::escape(labels.image_url);
                        image_patterns.push(compile(&format!(r"\[{label}:\s*(https?://[^\]]+)\]")));
                    }
                }
                ImagePattern::LabeledImageUrl => {
                    for labels in labels {
                        let label = regex::escape(labels.image_url);
                        image_patterns.push(compile(&format!(r"{label}[:\s]+(https?://[^\s\]]+)")));
                    }
                }
                ImagePattern::ImageFileUrl => image_patterns.push(compile(IMAGE_FILE_URL)),
                ImagePattern::AnyUrl => image_patterns.push(compile(ANY_URL)),
            }
        }

        let mut tag_patterns = Vec::new();
        for labels in labels {
            for label in labels.all() {
                let label = regex::escape(label);
                tag_patterns.push(compile(&format!(r"\[{label}:.*?\]")));
            }
            let label = regex::escape(labels.image_url);
            tag_patterns.push(compile(&format!(r"{label}[:\s]+https?://[^\s\]]+")));
        }

        Self {
            image_patterns,
            tag_patterns,
        }
    }

    pub fn extract(&self, descriptor: &str) -> ExtractedContent {
        ExtractedContent {
            image_url: self.image_url(descriptor),
            clean_prompt: self.clean_prompt(descriptor),
        }
    }

    /// Returns the URL captured by the first matching pattern.
    pub fn image_url(&self, descriptor: &str) -> Option<String> {
        self.image_patterns.iter().find_map(|pattern| {
            let captures = pattern.captures(descriptor)?;
            Some(captures.get(1)?.as_str().trim_end().to_string())
        })
    }

    /// Removes every known tag, then surrounding whitespace.
    pub fn clean_prompt(&self, descriptor: &str) -> String {
        let mut text = descriptor.to_string();
        // Removing a tag can join the pieces of another one.
        loop {
            let mut changed = false;
            for pattern in &self.tag_patterns {
                let stripped = pattern.replace_all(&text, "").into_owned();
                if stripped != text {
                    text = stripped;
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
        text.trim().to_string()
    }
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("tag labels are escaped, so patterns are valid")
}

#[cfg(test)]
#[path = "unit_tests/extractor.rs"]
mod tests;
