//! Bearer credential verification.

use async_trait::async_trait;
use axum::http::{HeaderMap, header::AUTHORIZATION};
use forge_core::AccountId;
use forge_error::{AuthError, AuthErrorKind, ConfigError};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Turns a bearer credential into the account it belongs to.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Verifies `credential`.
    ///
    /// # Errors
    ///
    /// `InvalidCredential` when the credential is rejected, `Unavailable` when
    /// the verifier cannot give an answer.
    async fn verify(&self, credential: &str) -> Result<AccountId, AuthError>;
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[derive(Debug, Deserialize)]
struct SupabaseUser {
    id: String,
}

/// Verifies credentials against Supabase Auth.
#[derive(Clone)]
pub struct SupabaseIdentityVerifier {
    client: Client,
    project_url: String,
    anon_key: String,
}

impl std::fmt::Debug for SupabaseIdentityVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseIdentityVerifier")
            .field("project_url", &self.project_url)
            .finish_non_exhaustive()
    }
}

impl SupabaseIdentityVerifier {
    /// Creates a verifier for the project at `project_url`.
    ///
    /// # Errors
    ///
    /// Returns an error when the URL or key is blank or the HTTP client cannot
    /// be built.
    pub fn new(
        project_url: impl Into<String>,
        anon_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let project_url = project_url.into().trim_end_matches('/').to_string();
        let anon_key = anon_key.into();
        if project_url.is_empty() || anon_key.trim().is_empty() {
            return Err(ConfigError::new("Supabase URL and anon key are required"));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to build auth client: {}", e)))?;
        Ok(Self {
            client,
            project_url,
            anon_key,
        })
    }
}

#[async_trait]
impl IdentityVerifier for SupabaseIdentityVerifier {
    #[instrument(skip_all)]
    async fn verify(&self, credential: &str) -> Result<AccountId, AuthError> {
        let response = self
            .client
            .get(format!("{}/auth/v1/user", self.project_url))
            .bearer_auth(credential)
            .header("apikey", &self.anon_key)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Identity provider unreachable");
                AuthError::new(AuthErrorKind::Unavailable(e.to_string()))
            })?;

        let status = response.status();
        match status {
            s if s.is_success() => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                debug!(status = status.as_u16(), "Credential rejected");
                return Err(AuthError::new(AuthErrorKind::InvalidCredential(
                    "rejected by identity provider".to_string(),
                )));
            }
            _ => {
                warn!(status = status.as_u16(), "Identity provider error");
                return Err(AuthError::new(AuthErrorKind::Unavailable(format!(
                    "identity provider returned {}",
                    status
                ))));
            }
        }

        let user: SupabaseUser = response
            .json()
            .await
            .map_err(|e| AuthError::new(AuthErrorKind::Unavailable(e.to_string())))?;
        user.id.parse().map_err(|_| {
            AuthError::new(AuthErrorKind::Unavailable(format!(
                "identity provider returned a malformed user id: {}",
                user.id
            )))
        })
    }
}

/// Fixed token table, for local development and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentityVerifier {
    tokens: HashMap<String, AccountId>,
}

impl StaticIdentityVerifier {
    /// Empty table that rejects everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts `token` as `account`.
    pub fn with_token(mut self, token: impl Into<String>, account: AccountId) -> Self {
        self.tokens.insert(token.into(), account);
        self
    }
}

impl FromIterator<(String, AccountId)> for StaticIdentityVerifier {
    fn from_iter<I: IntoIterator<Item = (String, AccountId)>>(iter: I) -> Self {
        Self {
            tokens: iter.into_iter().collect(),
        }
    }
}

#[async_trait]
impl IdentityVerifier for StaticIdentityVerifier {
    async fn verify(&self, credential: &str) -> Result<AccountId, AuthError> {
        self.tokens.get(credential).copied().ok_or_else(|| {
            AuthError::new(AuthErrorKind::InvalidCredential("unknown token".to_string()))
        })
    }
}
