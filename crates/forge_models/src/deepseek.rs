//! DeepSeek backend (OpenAI-style chat completions).

use crate::http::{build_client, empty_content, missing_key, rejection, transport_error};
use crate::{BackendConfig, ContentProvider};
use async_trait::async_trait;
use forge_error::{ProviderError, ProviderErrorKind};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

const PROVIDER: &str = "deepseek";
/// Default API root.
pub const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com/v1";
/// Default model.
pub const DEEPSEEK_MODEL: &str = "deepseek-chat";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Subset of the chat completion response the service reads.
#[derive(Debug, Default, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatResponse {
    /// Content of the first choice.
    pub fn into_text(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()?
            .message
            .content
            .filter(|text| !text.trim().is_empty())
    }
}

/// Client for the DeepSeek chat completions API.
#[derive(Debug, Clone)]
pub struct DeepSeekProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl DeepSeekProvider {
    /// Creates a client from backend settings.
    ///
    /// # Errors
    ///
    /// Returns `NotConfigured` when no key is set or the HTTP client cannot be built.
    #[instrument(skip_all)]
    pub fn new(config: &BackendConfig, timeout: Duration) -> Result<Self, ProviderError> {
        let api_key = config
            .api_key()
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| missing_key(PROVIDER))?;
        Ok(Self {
            client: build_client(PROVIDER, timeout)?,
            api_key,
            base_url: config
                .base_url()
                .clone()
                .unwrap_or_else(|| DEEPSEEK_BASE_URL.to_string()),
            model: config
                .model()
                .clone()
                .unwrap_or_else(|| DEEPSEEK_MODEL.to_string()),
            timeout,
        })
    }
}

#[async_trait]
impl ContentProvider for DeepSeekProvider {
    #[instrument(skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };
        debug!(url = %url, "Sending DeepSeek request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, self.timeout, e))?;

        if !response.status().is_success() {
            return Err(rejection(PROVIDER, response).await);
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            ProviderError::for_provider(PROVIDER, ProviderErrorKind::InvalidResponse(e.to_string()))
        })?;
        parsed.into_text().ok_or_else(|| empty_content(PROVIDER))
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
