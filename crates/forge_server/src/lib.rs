//! HTTP surface for Lesson Forge.
//!
//! Requests pass the rate limiter, then identity verification, then reach a
//! handler. `POST /generate` hands the request to the
//! [`GenerationSaga`](forge_generation::GenerationSaga) on its own task, so a
//! client that disconnects cancels the run without skipping a refund.
//!
//! ```no_run
//! use forge_rate_limit::FixedWindowLimiter;
//! use forge_server::{ForgeConfig, build_state, router};
//! use std::sync::Arc;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = ForgeConfig::load(None)?;
//! let limiter = Arc::new(FixedWindowLimiter::new(config.rate_limit().clone())?);
//! let state = build_state(&config, limiter)?;
//! let app = router(state, config.server().cors_origins());
//! let listener = tokio::net::TcpListener::bind(config.server().bind()).await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod auth;
mod bootstrap;
mod config;
mod error;
mod middleware;
mod observability;
mod routes;
mod state;

pub use auth::{IdentityVerifier, StaticIdentityVerifier, SupabaseIdentityVerifier, bearer_token};
pub use bootstrap::{build_state, migrate};
pub use config::{
    AuthBackend, AuthConfig, DatabaseBackend, DatabaseConfig, ForgeConfig, PricingConfig,
    ServerConfig, StaticAccount, StorageBackend, StorageConfig, SupabaseConfig,
};
pub use error::ApiError;
pub use middleware::{client_key, rate_limit, require_identity};
pub use observability::init_tracing;
pub use routes::{
    CreditsResponse, DEFAULT_HISTORY_LIMIT, GenerateResponse, HistoryResponse, MAX_HISTORY_LIMIT,
    cors_layer, router,
};
pub use state::{AppState, AppStateBuilder, DEFAULT_ROUTING_HEADER};
