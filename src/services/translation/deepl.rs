//! DeepL translation provider

use std::time::Duration;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use crate::config::PrimaryProviderConfig;
use crate::models::Lang;
use crate::utils::errors::{ProviderError, ProviderResult, RelayError, Result};
use super::provider::TranslationProvider;

const DEEPL_PRO_ENDPOINT: &str = "https://api.deepl.com/v2/translate";
const DEEPL_FREE_ENDPOINT: &str = "https://api-free.deepl.com/v2/translate";

#[derive(Debug, Deserialize)]
struct DeeplResponse {
    translations: Vec<DeeplTranslation>,
}

#[derive(Debug, Deserialize)]
struct DeeplTranslation {
    text: String,
}

/// Free-tier keys end in `:fx` and only work against the free endpoint
pub fn endpoint_for_key(api_key: Option<&str>) -> &'static str {
    match api_key {
        Some(key) if key.ends_with(":fx") => DEEPL_FREE_ENDPOINT,
        _ => DEEPL_PRO_ENDPOINT,
    }
}

#[derive(Debug, Clone)]
pub struct DeeplProvider {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
}

impl DeeplProvider {
    pub fn new(config: &PrimaryProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("LinguaRelay/0.1")
            .build()
            .map_err(RelayError::Http)?;

        let api_key = config.api_key.clone().filter(|key| !key.trim().is_empty());
        let endpoint = config
            .endpoint
            .clone()
            .unwrap_or_else(|| endpoint_for_key(api_key.as_deref()).to_string());

        Ok(Self { client, api_key, endpoint })
    }
}

#[async_trait]
impl TranslationProvider for DeeplProvider {
    fn name(&self) -> &'static str {
        "deepl"
    }

    async fn translate(&self, text: &str, source: Option<Lang>, target: Lang) -> ProviderResult<String> {
        let api_key = self.api_key.as_deref().ok_or_else(|| ProviderError::NotConfigured {
            provider: self.name().to_string(),
            reason: "API key is not set".to_string(),
        })?;

        let target_lang = target.code().to_uppercase();
        let source_lang = source.map(|lang| lang.code().to_uppercase());
        let mut form = vec![
            ("auth_key", api_key),
            ("text", text),
            ("target_lang", target_lang.as_str()),
        ];
        if let Some(source_lang) = source_lang.as_deref() {
            form.push(("source_lang", source_lang));
        }

        debug!(endpoint = %self.endpoint, target = %target_lang, source = ?source_lang, "DeepL request");

        let response = self.client.post(&self.endpoint).form(&form).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status { status: status.as_u16(), body });
        }

        let data: DeeplResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        data.translations
            .into_iter()
            .next()
            .map(|t| t.text.trim().to_string())
            .ok_or_else(|| ProviderError::InvalidResponse("no translations in response".to_string()))
    }
}
