//! Deterministic offline backend.

use crate::ContentProvider;
use async_trait::async_trait;
use forge_error::ProviderError;

/// Returns canned Markdown built from the prompt. Never fails.
///
/// ```
/// use forge_models::StubProvider;
/// assert_eq!(StubProvider::content_for("Volcanoes"), "# Mock Content\nGenerated for: Volcanoes");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct StubProvider;

impl StubProvider {
    /// The exact text returned for a prompt.
    pub fn content_for(prompt: &str) -> String {
        format!("# Mock Content\nGenerated for: {}", prompt)
    }
}

#[async_trait]
impl ContentProvider for StubProvider {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        Ok(Self::content_for(prompt))
    }

    fn provider_name(&self) -> &'static str {
        "stub"
    }

    fn model_name(&self) -> &str {
        "stub"
    }
}
