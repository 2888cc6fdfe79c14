//! Remote backends against a local mock server.

use forge_error::ProviderErrorKind;
use forge_models::{BackendConfig, ContentProvider, DeepSeekProvider, GeminiProvider};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn gemini_sends_prompt_and_reads_first_part() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash-lite:generateContent"))
        .and(header("x-goog-api-key", "g-key"))
        .and(body_partial_json(json!({"contents": [{"parts": [{"text": "Rivers"}]}]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [{"text": "## Rivers\n* Flow"}]}}]
        })))
        .mount(&server)
        .await;

    let provider = GeminiProvider::new(&BackendConfig::with_key("g-key").at(server.uri()), TIMEOUT)?;
    assert_eq!(provider.generate("Rivers").await?, "## Rivers\n* Flow");
    Ok(())
}

#[tokio::test]
async fn gemini_rejection_keeps_status() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota"))
        .mount(&server)
        .await;

    let provider = GeminiProvider::new(&BackendConfig::with_key("g-key").at(server.uri()), TIMEOUT)?;
    let err = provider.generate("Rivers").await.unwrap_err();
    assert_eq!(
        err.kind,
        ProviderErrorKind::Rejected {
            status: 429,
            message: "quota".to_string()
        }
    );
    Ok(())
}

#[tokio::test]
async fn deepseek_uses_bearer_and_chat_shape() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer d-key"))
        .and(body_partial_json(json!({
            "model": "deepseek-chat",
            "messages": [{"role": "user", "content": "Magnets"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "## Magnets"}}]
        })))
        .mount(&server)
        .await;

    let provider =
        DeepSeekProvider::new(&BackendConfig::with_key("d-key").at(server.uri()), TIMEOUT)?;
    assert_eq!(provider.generate("Magnets").await?, "## Magnets");
    Ok(())
}

#[tokio::test]
async fn empty_choice_is_invalid_response() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let provider =
        DeepSeekProvider::new(&BackendConfig::with_key("d-key").at(server.uri()), TIMEOUT)?;
    let err = provider.generate("Magnets").await.unwrap_err();
    assert!(matches!(err.kind, ProviderErrorKind::InvalidResponse(_)));
    Ok(())
}

#[tokio::test]
async fn slow_upstream_is_a_timeout_not_a_rejection() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let provider = DeepSeekProvider::new(
        &BackendConfig::with_key("d-key").at(server.uri()),
        Duration::from_millis(200),
    )?;
    let err = provider.generate("Magnets").await.unwrap_err();
    assert!(err.is_timeout());
    Ok(())
}

#[test]
fn missing_key_is_not_configured() {
    let err = GeminiProvider::new(&BackendConfig::default(), TIMEOUT).unwrap_err();
    assert!(matches!(err.kind, ProviderErrorKind::NotConfigured(_)));
}
