// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Prompt generation through an OpenAI-compatible chat-completions API.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{
    client::{post_json, reqwest_client},
    GenerationError,
};

pub const DEFAULT_LLM_API_URL: &str = "https://api.deepseek.com/v1";
pub const DEFAULT_LLM_MODEL: &str = "deepseek-chat";

const MAX_TOKENS: u32 = 300;
const TEMPERATURE: f32 = 0.8;
const TOP_P: f32 = 0.9;

const SYSTEM_PROMPT: &str = "你是一个专业的 AI 艺术 prompt 工程师。你的任务是根据用户提供的方向和风格，生成高质量、详细的艺术创作 prompt。
生成的 prompt 应该：
1. 具体而详细，包含视觉元素
2. 适合 AI 艺术生成工具（如 Midjourney、DALL-E、Stable Diffusion）
3. 包含艺术风格、光影、构图等专业术语
4. 长度在 50-300 个字之间
5. 使用中文，专业且富有创意
6. 可以偏向于使用AI山海经的样子
请只返回生成的 prompt 内容，不要包含额外的解释。";

const REFINE_SYSTEM_PROMPT: &str = "你是AI艺术Prompt工程师。";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPrompt {
    pub prompt: String,
    pub direction: String,
    pub style: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// A client of the chat-completions API generating art prompts.
#[derive(Clone, Debug)]
pub struct PromptGenerator {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl PromptGenerator {
    /// Creates a client of the API at `base_url`, without the `/chat/completions` suffix.
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        Ok(Self {
            client: reqwest_client(timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            model: DEFAULT_LLM_MODEL.to_string(),
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Generates an art prompt following a creative `direction`, with an optional style
    /// preference.
    #[instrument(skip(self))]
    pub async fn generate(
        &self,
        direction: &str,
        style: Option<&str>,
    ) -> Result<GeneratedPrompt, GenerationError> {
        let direction = direction.trim();
        if direction.is_empty() {
            return Err(GenerationError::EmptyInput("direction"));
        }
        let style = style.map(str::trim).filter(|style| !style.is_empty());
        let style_line = style
            .map(|style| format!("风格偏好：{style}"))
            .unwrap_or_default();
        let user_prompt = format!(
            "请为以下方向生成一个专业的艺术创作 prompt：\n方向：{direction}\n{style_line}\n要求：创意独特，视觉冲击力强，适合制作成 NFT 艺术品。"
        );
        let prompt = self
            .complete(SYSTEM_PROMPT, &user_prompt, Some(TEMPERATURE), Some(TOP_P))
            .await?;
        info!(length = prompt.chars().count(), "Generated prompt");
        Ok(GeneratedPrompt {
            prompt,
            direction: direction.to_string(),
            style: style.map(str::to_string),
            timestamp: Utc::now(),
        })
    }

    /// Sends a raw prompt to the model and returns its answer.
    #[instrument(skip(self, prompt))]
    pub async fn refine(&self, prompt: &str) -> Result<String, GenerationError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(GenerationError::EmptyInput("prompt"));
        }
        self.complete(REFINE_SYSTEM_PROMPT, prompt, None, None).await
    }

    async fn complete(
        &self,
        system: &str,
        user: &str,
        temperature: Option<f32>,
        top_p: Option<f32>,
    ) -> Result<String, GenerationError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(GenerationError::MissingApiKey("prompt generation"))?;
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            max_tokens: MAX_TOKENS,
            temperature,
            top_p,
        };
        let url = format!("{}/chat/completions", self.base_url);
        let response: ChatResponse = post_json(&self.client, &url, api_key, &request).await?;
        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(GenerationError::MissingField("choices[0].message.content"))
    }
}
