//! The content provider capability.

use async_trait::async_trait;
use forge_error::ProviderError;

/// A backend that turns a prompt into text.
///
/// Implementations perform a single attempt. Deadlines and backend choice are
/// the router's concern.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// Generates content for the prompt.
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError>;

    /// Short backend name used in logs and errors.
    fn provider_name(&self) -> &'static str;

    /// Model the backend calls.
    fn model_name(&self) -> &str;
}
