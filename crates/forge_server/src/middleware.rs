//! Request admission: rate limiting, then authentication.

use crate::{ApiError, AppState, bearer_token};
use axum::extract::{ConnectInfo, Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use forge_error::{AuthError, AuthErrorKind};
use std::net::SocketAddr;
use tracing::debug;

/// Rejects callers over their admission window with 429.
pub async fn rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let key = client_key(&request);
    if !state.limiter().admit(&key) {
        debug!(client = %key, "Admission denied");
        return Err(ApiError::RateLimited);
    }
    Ok(next.run(request).await)
}

/// Verifies the bearer credential and attaches the caller's
/// [`AccountId`](forge_core::AccountId) to the request extensions.
pub async fn require_identity(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let credential = bearer_token(request.headers())
        .map(str::to_owned)
        .ok_or_else(|| AuthError::new(AuthErrorKind::MissingCredential))?;
    let account = state.verifier().verify(&credential).await?;
    request.extensions_mut().insert(account);
    Ok(next.run(request).await)
}

/// Client identity for admission: first `X-Forwarded-For` hop, else the peer address.
pub fn client_key(request: &Request) -> String {
    forwarded_for(request.headers())
        .or_else(|| {
            request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

fn forwarded_for(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")?
        .to_str()
        .ok()?
        .split(',')
        .map(str::trim)
        .find(|hop| !hop.is_empty())
        .map(str::to_owned)
}
