//! Shared HTTP plumbing for the remote backends.

use forge_error::{ProviderError, ProviderErrorKind};
use reqwest::{Client, Response};
use std::time::Duration;

const MAX_ERROR_BODY: usize = 200;

pub(crate) fn build_client(provider: &'static str, timeout: Duration) -> Result<Client, ProviderError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| {
            ProviderError::for_provider(provider, ProviderErrorKind::NotConfigured(e.to_string()))
        })
}

#[track_caller]
pub(crate) fn transport_error(provider: &'static str, timeout: Duration, err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        let millis = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        return ProviderError::for_provider(provider, ProviderErrorKind::Timeout(millis));
    }
    ProviderError::for_provider(provider, ProviderErrorKind::Transport(err.to_string()))
}

/// Turns a non-success response into a rejection, keeping a short body excerpt.
pub(crate) async fn rejection(provider: &'static str, response: Response) -> ProviderError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message: String = body.chars().take(MAX_ERROR_BODY).collect();
    ProviderError::for_provider(provider, ProviderErrorKind::Rejected { status, message })
}

pub(crate) fn missing_key(provider: &'static str) -> ProviderError {
    ProviderError::for_provider(
        provider,
        ProviderErrorKind::NotConfigured(format!("{} API key not set", provider)),
    )
}

pub(crate) fn empty_content(provider: &'static str) -> ProviderError {
    ProviderError::for_provider(
        provider,
        ProviderErrorKind::InvalidResponse("response carried no text".to_string()),
    )
}
