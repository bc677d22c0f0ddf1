use crate::config::LlmConfig;
use crate::domain::CaptionGenerator;
use crate::errors::GenerationError;
use crate::models::{Platform, Tone};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

const CAPTION_SYSTEM_PROMPT: &str = "You are a senior social media copywriter acting as a content strategist. \
You know tone, hooks, CTA, emoji etiquette, and platform limits (Twitter 280, Instagram 2200, LinkedIn 3000). \
Draft catchy, platform-aware, on-brand captions that drive engagement and include a smooth call-to-action when appropriate.";

const KEYWORD_SYSTEM_PROMPT: &str = "You are an expert in natural language processing. \
Analyze the given text, disregard any prior knowledge, and identify the most crucial and literal \
keywords that would be used to find a visually matching image.";

pub fn caption_prompt(topic: &str, platform: Platform, tone: Tone, include_hashtags: bool) -> String {
    format!(
        "Write a short, catchy caption for the topic: '{topic}'.\n\
         Platform: {platform}. Tone: {tone}. Include hashtags: {include_hashtags}.\n\
         Include a concise hook, value, and (optional) CTA. Use tasteful emojis. \
         Keep within {limit} characters.\n\
         Return a single caption string that is ready to post (no surrounding quotes).",
        limit = platform.char_limit(),
    )
}

pub fn keyword_prompt(caption: &str, platform: Platform) -> String {
    format!(
        "Here is a caption written for the {platform} platform:\n\n{caption}\n\n\
         Based only on that caption, extract 5-7 relevant keywords that would be perfect for \
         finding a matching image. Focus on the main themes.\n\
         Return ONLY a comma-separated list of keywords, no extra text."
    )
}

/// Strips the quotes models like to wrap a caption in.
fn clean_caption(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed)
        .trim()
        .to_string()
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    #[serde(default)]
    content: Option<String>,
}

/// Caption writer backed by an OpenAI-compatible chat completion endpoint.
pub struct OpenAiCaptionGenerator {
    client: reqwest::Client,
    config: LlmConfig,
}

impl OpenAiCaptionGenerator {
    pub fn new(config: LlmConfig) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| GenerationError::Http(e.to_string()))?;
        info!(model = %config.model, endpoint = %config.endpoint, "Initialized caption generator");
        Ok(Self { client, config })
    }

    async fn complete(&self, system: &str, user: String) -> Result<String, GenerationError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = &self.config.api_key {
            let value = format!("Bearer {}", key);
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&value).map_err(|e| GenerationError::Http(e.to_string()))?,
            );
        }

        let body = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage { role: "system", content: system.to_string() },
                ChatMessage { role: "user", content: user },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .headers(headers)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(GenerationError::Response(format!("HTTP {}: {}", status, text)));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Response(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| GenerationError::Response("Missing choices".to_string()))
    }
}

#[async_trait]
impl CaptionGenerator for OpenAiCaptionGenerator {
    async fn generate(
        &self,
        topic: &str,
        platform: Platform,
        tone: Tone,
        include_hashtags: bool,
    ) -> Result<String, GenerationError> {
        debug!(%topic, %platform, %tone, include_hashtags, "Requesting caption");
        let raw = self
            .complete(CAPTION_SYSTEM_PROMPT, caption_prompt(topic, platform, tone, include_hashtags))
            .await?;
        let caption = clean_caption(&raw);
        if caption.is_empty() {
            return Err(GenerationError::EmptyCaption);
        }
        Ok(caption)
    }

    async fn image_keywords(&self, caption: &str, platform: Platform) -> Result<String, GenerationError> {
        self.complete(KEYWORD_SYSTEM_PROMPT, keyword_prompt(caption, platform)).await
    }
}
