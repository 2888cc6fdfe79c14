//! Provider configuration.

use crate::ProviderKind;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Endpoint settings for one remote backend.
///
/// Unset fields fall back to the backend's published defaults. The API key is
/// never serialized back out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(default)]
pub struct BackendConfig {
    /// Model identifier
    model: Option<String>,
    /// API base URL, without a trailing slash
    base_url: Option<String>,
    /// Secret key; usually injected from the environment
    #[serde(skip_serializing)]
    api_key: Option<String>,
}

impl BackendConfig {
    /// Backend with only a key set.
    pub fn with_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    /// Overrides the base URL.
    pub fn at(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into().trim_end_matches('/').to_string());
        self
    }

    /// Overrides the model.
    pub fn model_named(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// True when a non-blank key is present.
    pub fn has_key(&self) -> bool {
        self.api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }
}

/// Provider selection and backend settings.
///
/// ```toml
/// [providers]
/// mock = false
/// default_provider = "gemini"
/// http_timeout_secs = 90
///
/// [providers.region_routes]
/// CN = "deepseek"
/// US = "gemini"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_builder::Builder)]
#[serde(default)]
#[builder(default, setter(into))]
pub struct ProvidersConfig {
    /// Forces the deterministic stub regardless of routing
    mock: bool,
    /// Preferred backend when no region route matches
    default_provider: Option<ProviderKind>,
    /// Routing key (country code) to backend
    region_routes: HashMap<String, ProviderKind>,
    /// Per-request HTTP timeout for remote backends
    http_timeout_secs: u64,
    /// Gemini endpoint
    gemini: BackendConfig,
    /// DeepSeek endpoint
    deepseek: BackendConfig,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            mock: false,
            default_provider: None,
            region_routes: HashMap::new(),
            http_timeout_secs: 90,
            gemini: BackendConfig::default(),
            deepseek: BackendConfig::default(),
        }
    }
}

impl ProvidersConfig {
    /// Creates a new builder.
    pub fn builder() -> ProvidersConfigBuilder {
        ProvidersConfigBuilder::default()
    }

    /// HTTP timeout for remote calls.
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs.max(1))
    }

    /// Sets the key for a remote backend. Ignored for the stub.
    pub fn with_api_key(mut self, kind: ProviderKind, key: impl Into<String>) -> Self {
        let key = Some(key.into());
        match kind {
            ProviderKind::Gemini => self.gemini.api_key = key,
            ProviderKind::DeepSeek => self.deepseek.api_key = key,
            ProviderKind::Stub => {}
        }
        self
    }

    /// Sets the stub override.
    pub fn with_mock(mut self, mock: bool) -> Self {
        self.mock = mock;
        self
    }

    /// Whether a backend can be called at all.
    pub fn is_configured(&self, kind: ProviderKind) -> bool {
        match kind {
            ProviderKind::Gemini => self.gemini.has_key(),
            ProviderKind::DeepSeek => self.deepseek.has_key(),
            ProviderKind::Stub => true,
        }
    }
}
