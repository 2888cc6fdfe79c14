//! HTTP routes.
//!
//! | Method | Path | Auth |
//! |---|---|---|
//! | GET | `/health` | no |
//! | POST | `/generate` | bearer |
//! | GET | `/user/credits` | bearer |
//! | GET | `/user/generations?limit=N` | bearer |
//!
//! Every route is also served under `/api`.

use crate::middleware::{rate_limit, require_identity};
use crate::{ApiError, AppState};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, header};
use axum::response::{IntoResponse, Json};
use axum::routing::{get, post};
use axum::{Extension, Router, middleware};
use forge_core::{AccountId, Credits, GenerationRecord, GenerationRequest};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::instrument;

/// History page size when none is requested.
pub const DEFAULT_HISTORY_LIMIT: i64 = 20;
/// Largest history page served.
pub const MAX_HISTORY_LIMIT: i64 = 100;

/// Successful generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// Where the artifact can be downloaded
    pub file: String,
}

/// Caller's balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditsResponse {
    /// Credits available
    pub credits: Credits,
}

/// Caller's recent generations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryResponse {
    /// Newest first
    pub generations: Vec<GenerationRecord>,
}

#[derive(Debug, Default, Deserialize)]
struct HistoryQuery {
    limit: Option<i64>,
}

/// Builds the application router.
///
/// `cors_origins` lists allowed origins; empty allows any origin.
pub fn router(state: AppState, cors_origins: &[String]) -> Router {
    let protected = Router::new()
        .route("/generate", post(generate))
        .route("/user/credits", get(credits))
        .route("/user/generations", get(generations))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_identity))
        .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit));

    let routes = Router::new()
        .route("/health", get(health))
        .merge(protected);

    Router::new()
        .merge(routes.clone())
        .nest("/api", routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

/// CORS policy: `GET, POST, OPTIONS` with the headers browser clients send.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(
            origins
                .iter()
                .filter_map(|origin| HeaderValue::from_str(origin).ok()),
        )
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("apikey"),
        ])
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

#[instrument(skip_all, fields(account_id = %account))]
async fn generate(
    State(state): State<AppState>,
    Extension(account): Extension<AccountId>,
    headers: HeaderMap,
    payload: Result<Json<GenerationRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        ApiError::BadRequest(format!("Malformed request body: {}", rejection.body_text()))
    })?;

    let routing_key = headers
        .get(state.routing_header().as_str())
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned);

    let outcome = state
        .saga()
        .run_detached(account, request, routing_key)
        .await?;

    Ok(Json(GenerateResponse {
        file: outcome.location().to_string(),
    }))
}

#[instrument(skip_all, fields(account_id = %account))]
async fn credits(
    State(state): State<AppState>,
    Extension(account): Extension<AccountId>,
) -> Result<Json<CreditsResponse>, ApiError> {
    let credits = state.ledger().balance_of(account).await?;
    Ok(Json(CreditsResponse { credits }))
}

#[instrument(skip_all, fields(account_id = %account))]
async fn generations(
    State(state): State<AppState>,
    Extension(account): Extension<AccountId>,
    query: Option<Query<HistoryQuery>>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let limit = query
        .and_then(|Query(query)| query.limit)
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT);
    let generations = state.records().list_for_account(account, limit).await?;
    Ok(Json(HistoryResponse { generations }))
}
