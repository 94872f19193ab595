// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Image generation through an image-generations API.

use std::time::Duration;

use rand::{seq::SliceRandom as _, Rng};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{
    client::{post_json, reqwest_client},
    GenerationError,
};

pub const DEFAULT_IMAGE_API_URL: &str = "https://open.bigmodel.cn/api/paas/v4/images/generations";
pub const DEFAULT_IMAGE_MODEL: &str = "cogview-3";
pub const DEFAULT_IMAGE_SIZE: &str = "1024x1024";
pub const DEFAULT_STYLE: &str = "default";

const STYLES: &[(&str, &str)] = &[
    ("digital-art", "数字艺术风格，高清细腻"),
    ("oil-painting", "中国传统油画风格，浓墨重彩"),
    ("watercolor", "水墨画风格，意境深远"),
    ("anime", "动漫插画风格，色彩鲜明"),
    ("concept-art", "概念艺术风格，富有想象力"),
    ("surreal", "超现实主义风格，梦幻神秘"),
    ("vintage", "复古古典风格，古色古香"),
    ("ai山海经", "中国古代山海经插画风格，古典神话"),
];

const DEFAULT_STYLE_DESCRIPTION: &str = "精美插画风格";

const ELEMENTS: &[&str] = &[
    "云雾缭绕的仙山",
    "古老的神兽",
    "金光闪闪的鳞片",
    "神秘的符文",
    "飘逸的仙气",
    "古代的宫殿",
    "翠绿的竹林",
    "潺潺的溪流",
];

const PROMPT_SUFFIX: &str = "中国古典神话色彩，4K高清，细节丰富，色彩饱满，富有艺术感";

/// The description appended for `style`. Unknown styles use the default description.
pub fn style_description(style: &str) -> &'static str {
    STYLES
        .iter()
        .find(|(name, _)| *name == style)
        .map_or(DEFAULT_STYLE_DESCRIPTION, |(_, description)| *description)
}

/// Adds a style description and one or two random scenery elements to `prompt`.
pub fn enhance_prompt<R: Rng + ?Sized>(prompt: &str, style: &str, rng: &mut R) -> String {
    let count = rng.gen_range(1..=2);
    let elements = ELEMENTS
        .choose_multiple(rng, count)
        .copied()
        .collect::<Vec<_>>()
        .join("，");
    format!(
        "{prompt}，{}，融入{elements}，{PROMPT_SUFFIX}",
        style_description(style)
    )
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedImage {
    pub image_url: String,
    pub original_prompt: String,
    pub enhanced_prompt: String,
    pub model: String,
    pub size: String,
}

#[derive(Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    size: &'a str,
    quality: &'static str,
    n: u32,
}

#[derive(Deserialize)]
struct ImageResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Deserialize)]
struct ImageData {
    url: Option<String>,
}

/// A client of the image-generations API.
#[derive(Clone, Debug)]
pub struct ImageGenerator {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
    model: String,
}

impl ImageGenerator {
    pub fn new(
        url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        Ok(Self {
            client: reqwest_client(timeout)?,
            url: url.into(),
            api_key,
            model: DEFAULT_IMAGE_MODEL.to_string(),
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Generates an image for `prompt`, enhanced with `style`.
    #[instrument(skip(self))]
    pub async fn generate(
        &self,
        prompt: &str,
        size: Option<&str>,
        style: Option<&str>,
    ) -> Result<GeneratedImage, GenerationError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(GenerationError::EmptyInput("prompt"));
        }
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(GenerationError::MissingApiKey("image generation"))?;
        let size = size.unwrap_or(DEFAULT_IMAGE_SIZE);
        let enhanced_prompt = enhance_prompt(
            prompt,
            style.unwrap_or(DEFAULT_STYLE),
            &mut rand::thread_rng(),
        );

        let request = ImageRequest {
            model: &self.model,
            prompt: &enhanced_prompt,
            size,
            quality: "standard",
            n: 1,
        };
        let response: ImageResponse = post_json(&self.client, &self.url, api_key, &request).await?;
        let image_url = response
            .data
            .into_iter()
            .next()
            .and_then(|data| data.url)
            .ok_or(GenerationError::MissingField("data[0].url"))?;
        info!(%image_url, "Generated image");
        Ok(GeneratedImage {
            image_url,
            original_prompt: prompt.to_string(),
            enhanced_prompt,
            model: self.model.clone(),
            size: size.to_string(),
        })
    }
}

#[cfg(test)]
#[path = "unit_tests/image.rs"]
mod tests;
