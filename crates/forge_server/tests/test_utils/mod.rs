//! In-process application for API tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, header};
use forge_core::{AccountId, Artifact, Credits, GenerationMode};
use forge_database::{CreditLedger, InMemoryCreditLedger, InMemoryRecordStore};
use forge_error::{RenderError, RenderErrorKind};
use forge_generation::GenerationSaga;
use forge_models::{ProviderRouter, ProvidersConfig};
use forge_rate_limit::{FixedWindowLimiter, RateLimitConfig};
use forge_server::{AppState, StaticIdentityVerifier, router};
use forge_storage::{DocumentRenderer, FilesystemArtifactStore, MarkdownRenderer};
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

pub const TOKEN: &str = "test-token";

/// Renderer that always fails, for compensation tests.
pub struct FailingRenderer;

#[async_trait]
impl DocumentRenderer for FailingRenderer {
    async fn render(&self, _mode: GenerationMode, _content: &str) -> Result<Artifact, RenderError> {
        Err(RenderError::new(RenderErrorKind::Failed("font missing".into())))
    }
}

pub struct TestApp {
    pub router: Router,
    pub account: AccountId,
    pub ledger: Arc<InMemoryCreditLedger>,
    pub records: Arc<InMemoryRecordStore>,
    pub artifacts: TempDir,
}

pub struct TestAppBuilder {
    balance: Credits,
    max_requests: u32,
    renderer: Arc<dyn DocumentRenderer>,
}

impl TestApp {
    pub fn builder(balance: Credits) -> TestAppBuilder {
        TestAppBuilder {
            balance,
            max_requests: 100,
            renderer: Arc::new(MarkdownRenderer),
        }
    }

    pub async fn balance(&self) -> Credits {
        self.ledger.balance_of(self.account).await.expect("account exists")
    }

    pub fn stored_files(&self) -> usize {
        std::fs::read_dir(self.artifacts.path())
            .expect("artifact dir")
            .filter_map(Result::ok)
            .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "md"))
            .count()
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }
}

impl TestAppBuilder {
    pub fn max_requests(mut self, max_requests: u32) -> Self {
        self.max_requests = max_requests;
        self
    }

    pub fn failing_renderer(mut self) -> Self {
        self.renderer = Arc::new(FailingRenderer);
        self
    }

    pub fn build(self) -> TestApp {
        let account = AccountId::random();
        let ledger = Arc::new(InMemoryCreditLedger::new());
        ledger.open_account(account, self.balance);
        let records = Arc::new(InMemoryRecordStore::new());
        let artifacts = TempDir::new().expect("temp dir");

        let provider_router = ProviderRouter::from_config(ProvidersConfig::default().with_mock(true))
            .expect("stub router");
        let store = FilesystemArtifactStore::new(artifacts.path(), None).expect("store");

        let saga = GenerationSaga::builder()
            .router(Arc::new(provider_router))
            .ledger(ledger.clone())
            .renderer(self.renderer)
            .store(Arc::new(store))
            .records(records.clone())
            .build()
            .expect("saga wiring");

        let limiter = FixedWindowLimiter::new(RateLimitConfig::new(60, self.max_requests))
            .expect("limiter config");

        let state = AppState::builder()
            .saga(Arc::new(saga))
            .ledger(ledger.clone())
            .records(records.clone())
            .verifier(Arc::new(StaticIdentityVerifier::new().with_token(TOKEN, account)))
            .limiter(Arc::new(limiter))
            .build()
            .expect("state wiring");

        TestApp {
            router: router(state, &[]),
            account,
            ledger,
            records,
            artifacts,
        }
    }
}

pub fn authed(method: &str, uri: &str) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", TOKEN))
}

pub fn generate_request(body: Value) -> Request<Body> {
    authed("POST", "/generate")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}
