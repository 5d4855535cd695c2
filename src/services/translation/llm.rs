//! OpenAI-compatible chat completions provider

use std::time::Duration;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::config::LlmProviderConfig;
use crate::models::Lang;
use crate::utils::errors::{ProviderError, ProviderResult, RelayError, Result};
use super::provider::TranslationProvider;

const SYSTEM_PROMPT: &str = "You are a professional translation engine. \
Translate the user's text to the target language directly. \
Do not output any explanations, notes, or extra text. \
If the text is already in the target language or consists only of emojis/numbers, return it as is.";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatContent,
}

#[derive(Debug, Deserialize)]
struct ChatContent {
    content: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LlmProvider {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
    model: String,
}

impl LlmProvider {
    pub fn new(config: &LlmProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("LinguaRelay/0.1")
            .build()
            .map_err(RelayError::Http)?;

        let endpoint = config
            .endpoint
            .clone()
            .unwrap_or_else(|| format!("{}/chat/completions", config.api_base.trim_end_matches('/')));

        Ok(Self {
            client,
            api_key: config.api_key.clone().filter(|key| !key.trim().is_empty()),
            endpoint,
            model: config.model.clone(),
        })
    }
}

fn system_prompt(target: Lang) -> String {
    format!("{} Target Language: {}.", SYSTEM_PROMPT, target.code().to_uppercase())
}

#[async_trait]
impl TranslationProvider for LlmProvider {
    fn name(&self) -> &'static str {
        "llm"
    }

    async fn translate(&self, text: &str, _source: Option<Lang>, target: Lang) -> ProviderResult<String> {
        let api_key = self.api_key.as_deref().ok_or_else(|| ProviderError::NotConfigured {
            provider: self.name().to_string(),
            reason: "API key is not set".to_string(),
        })?;

        let prompt = system_prompt(target);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: &prompt },
                ChatMessage { role: "user", content: text },
            ],
            temperature: 0.3,
        };

        debug!(endpoint = %self.endpoint, model = %self.model, target = %target, "LLM request");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status { status: status.as_u16(), body });
        }

        let data: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        data.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| ProviderError::InvalidResponse("no choices in response".to_string()))
    }
}
