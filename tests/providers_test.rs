//! HTTP translation providers against a mock server

mod helpers;

use std::sync::Arc;
use assert_matches::assert_matches;
use serde_json::json;
use serial_test::serial;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use helpers::*;
use LinguaRelay::config::{LlmProviderConfig, PrimaryProviderConfig};
use LinguaRelay::models::{Lang, LanguageMode};
use LinguaRelay::services::translation::{Translation, TranslatorChain};
use LinguaRelay::services::{DeeplProvider, LlmProvider, TranslationProvider};
use LinguaRelay::utils::errors::ProviderError;

fn deepl_config(server: &MockServer, api_key: Option<&str>) -> PrimaryProviderConfig {
    PrimaryProviderConfig {
        provider: "deepl".to_string(),
        api_key: api_key.map(str::to_string),
        endpoint: Some(format!("{}/v2/translate", server.uri())),
        timeout_seconds: 5,
    }
}

fn llm_config(server: &MockServer, api_key: Option<&str>) -> LlmProviderConfig {
    LlmProviderConfig {
        api_key: api_key.map(str::to_string),
        api_base: format!("{}/v1", server.uri()),
        endpoint: None,
        model: "gpt-test".to_string(),
        timeout_seconds: 5,
    }
}

fn deepl_body(text: &str) -> serde_json::Value {
    json!({ "translations": [{ "detected_source_language": "EN", "text": text }] })
}

fn llm_body(text: &str) -> serde_json::Value {
    json!({ "choices": [{ "index": 0, "message": { "role": "assistant", "content": text } }] })
}

#[tokio::test]
async fn test_deepl_sends_form_and_reads_translation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/translate"))
        .and(body_string_contains("auth_key=test-key"))
        .and(body_string_contains("target_lang=ZH"))
        .respond_with(ResponseTemplate::new(200).set_body_json(deepl_body(" 你好 ")))
        .expect(1)
        .mount(&server)
        .await;

    let provider = DeeplProvider::new(&deepl_config(&server, Some("test-key"))).unwrap();
    let output = provider.translate("hello", None, Lang::Zh).await.unwrap();

    assert_eq!(output, "你好");
}

#[tokio::test]
async fn test_deepl_passes_source_language() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/translate"))
        .and(body_string_contains("source_lang=ZH"))
        .and(body_string_contains("target_lang=EN"))
        .respond_with(ResponseTemplate::new(200).set_body_json(deepl_body("Hello")))
        .expect(1)
        .mount(&server)
        .await;

    let provider = DeeplProvider::new(&deepl_config(&server, Some("test-key"))).unwrap();
    let output = provider.translate("你好", Some(Lang::Zh), Lang::En).await.unwrap();

    assert_eq!(output, "Hello");
}

#[tokio::test]
async fn test_deepl_quota_error_is_not_retryable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(456).set_body_string("Quota exceeded"))
        .mount(&server)
        .await;

    let provider = DeeplProvider::new(&deepl_config(&server, Some("test-key"))).unwrap();
    let err = provider.translate("hello", None, Lang::Zh).await.unwrap_err();

    assert_matches!(&err, ProviderError::Status { status: 456, .. });
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_deepl_malformed_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "translations": [] })))
        .mount(&server)
        .await;

    let provider = DeeplProvider::new(&deepl_config(&server, Some("test-key"))).unwrap();
    let err = provider.translate("hello", None, Lang::Zh).await.unwrap_err();

    assert_matches!(err, ProviderError::InvalidResponse(_));
}

#[tokio::test]
async fn test_llm_sends_bearer_and_model() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer llm-key"))
        .and(body_partial_json(json!({ "model": "gpt-test" })))
        .and(body_string_contains("Target Language: ZH."))
        .respond_with(ResponseTemplate::new(200).set_body_json(llm_body("你好，世界\n")))
        .expect(1)
        .mount(&server)
        .await;

    let provider = LlmProvider::new(&llm_config(&server, Some("llm-key"))).unwrap();
    let output = provider.translate("hello world", None, Lang::Zh).await.unwrap();

    assert_eq!(output, "你好，世界");
}

#[tokio::test]
async fn test_llm_server_error_is_retryable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream error"))
        .mount(&server)
        .await;

    let provider = LlmProvider::new(&llm_config(&server, Some("llm-key"))).unwrap();
    let err = provider.translate("hello", None, Lang::Zh).await.unwrap_err();

    assert_matches!(&err, ProviderError::Status { status: 500, .. });
    assert!(err.is_retryable());
}

#[tokio::test]
#[serial]
async fn test_chain_retries_primary_after_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/translate"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v2/translate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(deepl_body("你好，世界")))
        .mount(&server)
        .await;

    let providers: Vec<Arc<dyn TranslationProvider>> = vec![
        Arc::new(DeeplProvider::new(&deepl_config(&server, Some("test-key"))).unwrap()),
        Arc::new(LlmProvider::new(&llm_config(&server, Some("llm-key"))).unwrap()),
    ];
    let notifier = Arc::new(RecordingNotifier::default());
    let chain = TranslatorChain::new(providers, notifier.clone(), fast_chain_settings());

    let result = chain.translate("hello world", LanguageMode::Auto).await;

    assert_matches!(result, Translation::Translated(t) if t.provider == "deepl" && t.text == "你好，世界");
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
    assert!(notifier.notices().is_empty());
}

#[tokio::test]
#[serial]
async fn test_chain_skips_unconfigured_primary() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(llm_body("Hello everyone")))
        .expect(2)
        .mount(&server)
        .await;

    let providers: Vec<Arc<dyn TranslationProvider>> = vec![
        Arc::new(DeeplProvider::new(&deepl_config(&server, None)).unwrap()),
        Arc::new(LlmProvider::new(&llm_config(&server, Some("llm-key"))).unwrap()),
    ];
    let notifier = Arc::new(RecordingNotifier::default());
    let chain = TranslatorChain::new(providers, notifier.clone(), fast_chain_settings());

    for _ in 0..2 {
        let result = chain.translate("大家好", LanguageMode::Auto).await;
        assert_matches!(result, Translation::Translated(t) if t.provider == "llm" && t.target == Lang::En);
    }
    assert_eq!(notifier.notices().len(), 1);
}
