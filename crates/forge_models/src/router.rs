//! Deadline-bounded dispatch to the selected backend.

use crate::{
    ContentProvider, DeepSeekProvider, GeminiProvider, ProviderKind, ProvidersConfig,
    StubProvider, select_provider,
};
use derive_getters::Getters;
use forge_error::{ProviderError, ProviderErrorKind};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Text produced by a backend, with where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct GeneratedContent {
    text: String,
    #[getter(skip)]
    provider: &'static str,
    model: String,
}

impl GeneratedContent {
    /// Name of the backend that answered.
    pub fn provider(&self) -> &'static str {
        self.provider
    }
}

/// Chooses one backend per request and calls it once.
///
/// There is no failover: a failed call is returned to the caller as-is.
#[derive(Clone)]
pub struct ProviderRouter {
    config: ProvidersConfig,
    providers: HashMap<ProviderKind, Arc<dyn ContentProvider>>,
}

impl std::fmt::Debug for ProviderRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRouter")
            .field("config", &self.config)
            .field("providers", &self.providers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ProviderRouter {
    /// Router with only the stub registered.
    pub fn new(config: ProvidersConfig) -> Self {
        let mut providers: HashMap<ProviderKind, Arc<dyn ContentProvider>> = HashMap::new();
        providers.insert(ProviderKind::Stub, Arc::new(StubProvider));
        Self { config, providers }
    }

    /// Builds clients for every backend that has a key.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be constructed.
    #[instrument(skip_all)]
    pub fn from_config(config: ProvidersConfig) -> Result<Self, ProviderError> {
        let timeout = config.http_timeout();
        let mut router = Self::new(config);
        if router.config.is_configured(ProviderKind::Gemini) {
            let gemini = GeminiProvider::new(router.config.gemini(), timeout)?;
            router = router.with_provider(ProviderKind::Gemini, Arc::new(gemini));
        }
        if router.config.is_configured(ProviderKind::DeepSeek) {
            let deepseek = DeepSeekProvider::new(router.config.deepseek(), timeout)?;
            router = router.with_provider(ProviderKind::DeepSeek, Arc::new(deepseek));
        }
        info!(
            backends = ?router.providers.keys().collect::<Vec<_>>(),
            mock = *router.config.mock(),
            "Provider router ready"
        );
        Ok(router)
    }

    /// Registers or replaces the backend for a kind.
    pub fn with_provider(mut self, kind: ProviderKind, provider: Arc<dyn ContentProvider>) -> Self {
        self.providers.insert(kind, provider);
        self
    }

    /// Backend the routing policy picks for this key.
    pub fn select(&self, routing_key: Option<&str>) -> ProviderKind {
        select_provider(routing_key, &self.config)
    }

    /// Generates content with the selected backend, bounded by `deadline`.
    ///
    /// # Errors
    ///
    /// `Timeout` when the deadline passes first, otherwise whatever the backend
    /// reported. `NotConfigured` if the selected backend was never registered.
    #[instrument(skip(self, prompt), fields(provider = tracing::field::Empty))]
    pub async fn generate(
        &self,
        routing_key: Option<&str>,
        prompt: &str,
        deadline: Instant,
    ) -> Result<GeneratedContent, ProviderError> {
        let kind = self.select(routing_key);
        let provider = self.providers.get(&kind).ok_or_else(|| {
            ProviderError::new(ProviderErrorKind::NotConfigured(kind.to_string()))
        })?;
        tracing::Span::current().record("provider", provider.provider_name());

        let started = Instant::now();
        let outcome = tokio::time::timeout_at(deadline, provider.generate(prompt)).await;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        match outcome {
            Ok(Ok(text)) => {
                debug!(elapsed_ms, chars = text.len(), "Provider returned content");
                Ok(GeneratedContent {
                    text,
                    provider: provider.provider_name(),
                    model: provider.model_name().to_string(),
                })
            }
            Ok(Err(err)) => {
                warn!(elapsed_ms, error = %err.kind, "Provider call failed");
                Err(err)
            }
            Err(_) => {
                warn!(elapsed_ms, "Provider call exceeded deadline");
                Err(ProviderError::for_provider(
                    provider.provider_name(),
                    ProviderErrorKind::Timeout(elapsed_ms),
                ))
            }
        }
    }
}
