//! Translator chain
//!
//! Remote providers are tried in order, each with a bounded retry loop. A
//! provider result that fails the acceptance check moves the chain on to the
//! next link; the local dictionary ends the chain and always produces text.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, info, warn};
use crate::config::TranslationConfig;
use crate::models::{LanguageMode, Lang};
use crate::services::ports::OwnerNotifier;
use crate::utils::errors::ProviderError;
use crate::utils::helpers::{exponential_backoff, truncate_chars};
use crate::utils::logging::log_provider_failure;
use super::dictionary::DictionaryTranslator;
use super::direction::{contains_cjk, decide_target, source_hint};
use super::provider::TranslationProvider;

/// Provider name recorded when the dictionary produced the text
pub const DICTIONARY_PROVIDER: &str = "dictionary";

/// Input shorter than this is never judged "implausibly short"
const MIN_LENGTH_FOR_RATIO_CHECK: usize = 20;

/// Result of running the chain on one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translation {
    Translated(TranslatedText),
    /// Nothing to translate
    Skip,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedText {
    pub text: String,
    pub source: Option<Lang>,
    pub target: Lang,
    pub provider: &'static str,
    pub truncated: bool,
}

impl TranslatedText {
    pub fn from_dictionary(&self) -> bool {
        self.provider == DICTIONARY_PROVIDER
    }
}

/// Why a provider result was not accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Empty,
    Echo,
    TooShort,
    MissingChinese,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            Rejection::Empty => "empty output",
            Rejection::Echo => "output echoes input",
            Rejection::TooShort => "output implausibly short",
            Rejection::MissingChinese => "no Chinese characters in output",
        };
        f.write_str(reason)
    }
}

/// Acceptance check applied to every remote result
pub fn check_output(input: &str, output: &str, target: Lang) -> Result<(), Rejection> {
    let input = input.trim();
    let output = output.trim();

    if output.is_empty() {
        return Err(Rejection::Empty);
    }
    if output.to_lowercase() == input.to_lowercase() {
        return Err(Rejection::Echo);
    }
    let input_len = input.chars().count();
    if input_len >= MIN_LENGTH_FOR_RATIO_CHECK && output.chars().count() * 10 < input_len {
        return Err(Rejection::TooShort);
    }
    if target == Lang::Zh && !contains_cjk(output) {
        return Err(Rejection::MissingChinese);
    }
    Ok(())
}

/// Retry and output limits for the chain
#[derive(Debug, Clone)]
pub struct ChainSettings {
    pub max_attempts: u32,
    pub backoff_base: Duration,
    pub max_output_chars: usize,
}

impl From<&TranslationConfig> for ChainSettings {
    fn from(config: &TranslationConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            backoff_base: config.backoff_base(),
            max_output_chars: config.max_output_chars,
        }
    }
}

impl Default for ChainSettings {
    fn default() -> Self {
        Self::from(&TranslationConfig::default())
    }
}

pub struct TranslatorChain {
    providers: Vec<Arc<dyn TranslationProvider>>,
    dictionary: DictionaryTranslator,
    notifier: Arc<dyn OwnerNotifier>,
    settings: ChainSettings,
    /// Providers the Owner was already told are missing a key
    reported_unconfigured: Mutex<HashSet<&'static str>>,
}

impl TranslatorChain {
    pub fn new(
        providers: Vec<Arc<dyn TranslationProvider>>,
        notifier: Arc<dyn OwnerNotifier>,
        settings: ChainSettings,
    ) -> Self {
        Self {
            providers,
            dictionary: DictionaryTranslator::new(),
            notifier,
            settings,
            reported_unconfigured: Mutex::new(HashSet::new()),
        }
    }

    /// Translate one group message
    pub async fn translate(&self, text: &str, mode: LanguageMode) -> Translation {
        let Some(target) = decide_target(text, mode) else {
            debug!("No translatable characters, skipping");
            return Translation::Skip;
        };
        let source = source_hint(target);

        for provider in &self.providers {
            if let Some(output) = self.run_provider(provider.as_ref(), text, source, target).await {
                return Translation::Translated(self.finish(output, source, target, provider.name()).await);
            }
        }

        let output = self.dictionary.translate(text, target);
        Translation::Translated(self.finish(output, source, target, DICTIONARY_PROVIDER).await)
    }

    /// Accepted output of one provider, `None` to fall through
    async fn run_provider(
        &self,
        provider: &dyn TranslationProvider,
        text: &str,
        source: Option<Lang>,
        target: Lang,
    ) -> Option<String> {
        let name = provider.name();
        let attempts = self.settings.max_attempts.max(1);

        for attempt in 1..=attempts {
            match provider.translate(text, source, target).await {
                Ok(output) => {
                    return match check_output(text, &output, target) {
                        Ok(()) => Some(output.trim().to_string()),
                        Err(rejection) => {
                            info!(provider = name, %target, reason = %rejection, "Provider result rejected");
                            None
                        }
                    };
                }
                Err(ProviderError::NotConfigured { reason, .. }) => {
                    self.report_unconfigured(name, &reason).await;
                    return None;
                }
                Err(e) => {
                    log_provider_failure(name, attempt, &e);
                    if !e.is_retryable() || attempt == attempts {
                        return None;
                    }
                    tokio::time::sleep(exponential_backoff(self.settings.backoff_base, attempt)).await;
                }
            }
        }
        None
    }

    async fn finish(&self, output: String, source: Option<Lang>, target: Lang, provider: &'static str) -> TranslatedText {
        let original_len = output.chars().count();
        let (text, truncated) = truncate_chars(&output, self.settings.max_output_chars);
        if truncated {
            warn!(provider, original_len, "Translation truncated");
            self.notifier
                .notify_owner(&format!(
                    "✂️ Translation from {} truncated from {} to {} characters",
                    provider, original_len, self.settings.max_output_chars
                ))
                .await;
        }

        TranslatedText { text, source, target, provider, truncated }
    }

    async fn report_unconfigured(&self, provider: &'static str, reason: &str) {
        let first_time = self
            .reported_unconfigured
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(provider);

        debug!(provider, reason, "Provider not configured, falling through");
        if first_time {
            warn!(provider, reason, "Translation provider not configured");
            self.notifier
                .notify_owner(&format!("⚠️ Translation provider {} is not configured: {}", provider, reason))
                .await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_output() {
        assert_eq!(check_output("hello", "  ", Lang::Zh), Err(Rejection::Empty));
        assert_eq!(check_output("Hello ", "hello", Lang::Zh), Err(Rejection::Echo));
        assert_eq!(check_output("hello", "hallo", Lang::Zh), Err(Rejection::MissingChinese));
        assert_eq!(check_output("hello", "你好", Lang::Zh), Ok(()));
        assert_eq!(check_output("你好", "hi", Lang::En), Ok(()));
    }

    #[test]
    fn test_check_output_length_ratio() {
        let long = "this is a reasonably long english sentence";
        assert_eq!(check_output(long, "好", Lang::Zh), Err(Rejection::TooShort));
        assert_eq!(check_output(long, "这是一个相当长的英文句子", Lang::Zh), Ok(()));
        // Short input is never judged by length
        assert_eq!(check_output("good morning", "早", Lang::Zh), Ok(()));
    }
}
