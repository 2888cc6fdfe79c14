//! Mapping from internal failures to HTTP responses.
//!
//! Bodies are `{"error": <code>, "message": <text>}`. The text is chosen per
//! category and never carries upstream bodies, SQL errors or connection details.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use forge_error::{
    AuthError, AuthErrorKind, DatabaseError, GenerationError, GenerationErrorKind, LedgerError,
    LedgerErrorKind,
};
use serde_json::json;
use tracing::{error, warn};

/// A failed API request.
#[derive(Debug, derive_more::Display, derive_more::From)]
pub enum ApiError {
    /// Credential missing, rejected or unverifiable
    #[display("{}", _0)]
    Auth(AuthError),
    /// Admission denied by the rate limiter
    #[display("Rate limit exceeded")]
    #[from(ignore)]
    RateLimited,
    /// Body or query could not be used
    #[display("Bad request: {}", _0)]
    #[from(ignore)]
    BadRequest(String),
    /// Terminal saga failure
    #[display("{}", _0)]
    Generation(GenerationError),
    /// Ledger read failure
    #[display("{}", _0)]
    Ledger(LedgerError),
    /// History read failure
    #[display("{}", _0)]
    Database(DatabaseError),
}

impl ApiError {
    /// Status code, stable error code and public message.
    pub fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            ApiError::Auth(err) => match &err.kind {
                AuthErrorKind::Unavailable(_) => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "auth_unavailable",
                    "Identity verification is temporarily unavailable".to_string(),
                ),
                AuthErrorKind::MissingCredential | AuthErrorKind::InvalidCredential(_) => (
                    StatusCode::UNAUTHORIZED,
                    "unauthorized",
                    "Authentication required".to_string(),
                ),
            },
            ApiError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limited",
                "Too many requests, slow down".to_string(),
            ),
            ApiError::BadRequest(reason) => {
                (StatusCode::BAD_REQUEST, "invalid_request", reason.clone())
            }
            ApiError::Generation(err) => generation_parts(&err.kind),
            ApiError::Ledger(err) => ledger_parts(&err.kind),
            ApiError::Database(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "store_unavailable",
                "History is temporarily unavailable".to_string(),
            ),
        }
    }
}

fn generation_parts(kind: &GenerationErrorKind) -> (StatusCode, &'static str, String) {
    match kind {
        GenerationErrorKind::InvalidRequest(reason) => {
            (StatusCode::BAD_REQUEST, "invalid_request", reason.clone())
        }
        GenerationErrorKind::InsufficientCredits { required } => (
            StatusCode::PAYMENT_REQUIRED,
            "insufficient_credits",
            format!("This request needs {} credits", required),
        ),
        GenerationErrorKind::ProviderFailed(_) => (
            StatusCode::BAD_GATEWAY,
            "provider_failed",
            "Content generation failed, you were not charged".to_string(),
        ),
        GenerationErrorKind::RenderFailed(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "render_failed",
            "Document rendering failed, your credits were refunded".to_string(),
        ),
        GenerationErrorKind::StorageFailed(_) => (
            StatusCode::BAD_GATEWAY,
            "storage_failed",
            "Saving the document failed, your credits were refunded".to_string(),
        ),
        GenerationErrorKind::RefundFailed { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            "Generation failed and needs attention from support".to_string(),
        ),
        GenerationErrorKind::Ledger(kind) => ledger_parts(kind),
        GenerationErrorKind::Aborted(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            "Internal error".to_string(),
        ),
    }
}

fn ledger_parts(kind: &LedgerErrorKind) -> (StatusCode, &'static str, String) {
    match kind {
        LedgerErrorKind::UnknownAccount(_) => (
            StatusCode::NOT_FOUND,
            "account_not_found",
            "No credit account exists for this user".to_string(),
        ),
        LedgerErrorKind::Unavailable(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "ledger_unavailable",
            "Credits are temporarily unavailable".to_string(),
        ),
        LedgerErrorKind::InvalidAmount(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            "Internal error".to_string(),
        ),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        if status.is_server_error() {
            error!(status = status.as_u16(), code, error = %self, "Request failed");
        } else {
            warn!(status = status.as_u16(), code, error = %self, "Request rejected");
        }
        (status, Json(json!({ "error": code, "message": message }))).into_response()
    }
}
