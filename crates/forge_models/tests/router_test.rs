//! Router dispatch, deadlines and fallback.

use async_trait::async_trait;
use forge_error::{ProviderError, ProviderErrorKind};
use forge_models::{ContentProvider, ProviderKind, ProviderRouter, ProvidersConfig};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::Instant;

struct ScriptedProvider {
    delay: Duration,
    fail: bool,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    fn new(delay: Duration, fail: bool) -> Arc<Self> {
        Arc::new(Self {
            delay,
            fail,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl ContentProvider for ScriptedProvider {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        if self.fail {
            return Err(ProviderError::for_provider(
                "scripted",
                ProviderErrorKind::Rejected {
                    status: 500,
                    message: "boom".into(),
                },
            ));
        }
        Ok(format!("scripted: {}", prompt))
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }

    fn model_name(&self) -> &str {
        "scripted-1"
    }
}

fn gemini_config() -> ProvidersConfig {
    ProvidersConfig::default().with_api_key(ProviderKind::Gemini, "key")
}

#[tokio::test]
async fn falls_back_to_stub_without_keys() -> anyhow::Result<()> {
    let router = ProviderRouter::new(ProvidersConfig::default());
    let content = router
        .generate(None, "Owls", Instant::now() + Duration::from_secs(1))
        .await?;
    assert_eq!(content.text(), "# Mock Content\nGenerated for: Owls");
    assert_eq!(content.provider(), "stub");
    Ok(())
}

#[tokio::test]
async fn dispatches_to_selected_backend() -> anyhow::Result<()> {
    let scripted = ScriptedProvider::new(Duration::ZERO, false);
    let router = ProviderRouter::new(gemini_config())
        .with_provider(ProviderKind::Gemini, scripted.clone());

    let content = router
        .generate(Some("DE"), "Owls", Instant::now() + Duration::from_secs(1))
        .await?;
    assert_eq!(content.text(), "scripted: Owls");
    assert_eq!(content.model(), "scripted-1");
    Ok(())
}

#[tokio::test]
async fn failure_is_returned_without_retry() {
    let scripted = ScriptedProvider::new(Duration::ZERO, true);
    let router = ProviderRouter::new(gemini_config())
        .with_provider(ProviderKind::Gemini, scripted.clone());

    let err = router
        .generate(None, "Owls", Instant::now() + Duration::from_secs(1))
        .await
        .unwrap_err();

    assert!(matches!(err.kind, ProviderErrorKind::Rejected { status: 500, .. }));
    assert_eq!(scripted.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn deadline_maps_to_timeout() {
    let scripted = ScriptedProvider::new(Duration::from_secs(30), false);
    let router = ProviderRouter::new(gemini_config())
        .with_provider(ProviderKind::Gemini, scripted);

    let err = router
        .generate(None, "Owls", Instant::now() + Duration::from_secs(2))
        .await
        .unwrap_err();

    assert!(err.is_timeout());
    assert_eq!(err.provider, "scripted");
}

#[tokio::test]
async fn configured_but_unregistered_backend_is_reported() {
    let router = ProviderRouter::new(gemini_config());
    let err = router
        .generate(None, "Owls", Instant::now() + Duration::from_secs(1))
        .await
        .unwrap_err();
    assert!(matches!(err.kind, ProviderErrorKind::NotConfigured(_)));
}
