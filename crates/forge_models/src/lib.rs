//! Content-generation backends for Lesson Forge.
//!
//! Every backend implements [`ContentProvider`]. [`select_provider`] maps a
//! routing key (the caller's country code) and configuration to exactly one
//! [`ProviderKind`], and [`ProviderRouter`] calls it once under a deadline.
//!
//! # Example
//!
//! ```
//! use forge_models::{ProviderRouter, ProvidersConfig};
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), forge_error::ProviderError> {
//! let router = ProviderRouter::from_config(ProvidersConfig::default().with_mock(true))?;
//! let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
//! let content = router.generate(Some("US"), "Fractions", deadline).await?;
//! assert_eq!(content.provider(), "stub");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod deepseek;
mod gemini;
mod http;
mod provider;
mod router;
mod routing;
mod stub;

pub use config::{BackendConfig, ProvidersConfig, ProvidersConfigBuilder};
pub use deepseek::{ChatResponse, DEEPSEEK_BASE_URL, DEEPSEEK_MODEL, DeepSeekProvider};
pub use gemini::{GEMINI_BASE_URL, GEMINI_MODEL, GeminiProvider, GeminiResponse};
pub use provider::ContentProvider;
pub use router::{GeneratedContent, ProviderRouter};
pub use routing::{ProviderKind, select_provider};
pub use stub::StubProvider;
