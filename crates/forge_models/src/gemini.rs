//! Google Gemini backend.

use crate::http::{build_client, empty_content, missing_key, rejection, transport_error};
use crate::{BackendConfig, ContentProvider};
use async_trait::async_trait;
use forge_error::{ProviderError, ProviderErrorKind};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

const PROVIDER: &str = "gemini";
/// Default API root.
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Default model.
pub const GEMINI_MODEL: &str = "gemini-2.0-flash-lite";

#[derive(Debug, Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

/// Subset of the `generateContent` response the service reads.
#[derive(Debug, Default, Deserialize)]
pub struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Default, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: GeminiCandidateContent,
}

#[derive(Debug, Default, Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
struct GeminiResponsePart {
    #[serde(default)]
    text: Option<String>,
}

impl GeminiResponse {
    /// Text of the first part of the first candidate.
    pub fn into_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content
            .parts
            .into_iter()
            .find_map(|part| part.text)
            .filter(|text| !text.trim().is_empty())
    }
}

/// Client for the Gemini REST API.
#[derive(Debug, Clone)]
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl GeminiProvider {
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
                .unwrap_or_else(|| GEMINI_BASE_URL.to_string()),
            model: config
                .model()
                .clone()
                .unwrap_or_else(|| GEMINI_MODEL.to_string()),
            timeout,
        })
    }
}

#[async_trait]
impl ContentProvider for GeminiProvider {
    #[instrument(skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart { text: prompt }],
            }],
        };
        debug!(url = %url, "Sending Gemini request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, self.timeout, e))?;

        if !response.status().is_success() {
            return Err(rejection(PROVIDER, response).await);
        }

        let parsed: GeminiResponse = response.json().await.map_err(|e| {
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
