//! Remote translation provider interface

use async_trait::async_trait;
use crate::models::Lang;
use crate::utils::errors::ProviderResult;

#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Short name used in logs, translation logs and Owner notices
    fn name(&self) -> &'static str;

    /// Translate `text` into `target`.
    ///
    /// Returns [`ProviderError::NotConfigured`](crate::utils::errors::ProviderError::NotConfigured)
    /// without touching the network when the provider has no API key.
    async fn translate(&self, text: &str, source: Option<Lang>, target: Lang) -> ProviderResult<String>;
}
