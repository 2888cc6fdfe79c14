//! Test doubles for saga tests.
//!
//! Every collaborator counts its calls so tests can assert on what the saga
//! did, not just on what it returned.

#![allow(dead_code)]

use async_trait::async_trait;
use forge_core::{
    AccountId, Artifact, ArtifactLocation, Credits, GenerationMode, GenerationRecord,
    NewGenerationRecord,
};
use forge_database::{
    ChargeOutcome, CreditLedger, DatabaseResult, GenerationRecordStore, InMemoryCreditLedger,
    InMemoryRecordStore,
};
use forge_error::{
    DatabaseError, DatabaseErrorKind, LedgerError, LedgerErrorKind, LedgerResult, ProviderError,
    ProviderErrorKind, RenderError, RenderErrorKind, StorageError, StorageErrorKind,
};
use forge_generation::{GenerationSaga, SagaSettings};
use forge_models::{ContentProvider, ProviderKind, ProviderRouter, ProvidersConfig};
use forge_storage::{ArtifactStore, DocumentRenderer, MarkdownRenderer};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Notify;

/// In-memory ledger that counts calls and can be told to fail refunds.
#[derive(Default)]
pub struct CountingLedger {
    inner: InMemoryCreditLedger,
    pub charges: AtomicUsize,
    pub refunds: AtomicUsize,
    pub balance_reads: AtomicUsize,
    pub fail_refunds: AtomicBool,
}

impl CountingLedger {
    pub fn with_account(account: AccountId, balance: Credits) -> Arc<Self> {
        let ledger = Self::default();
        ledger.inner.open_account(account, balance);
        Arc::new(ledger)
    }

    pub async fn balance(&self, account: AccountId) -> Credits {
        self.inner.balance_of(account).await.expect("account exists")
    }
}

#[async_trait]
impl CreditLedger for CountingLedger {
    async fn try_charge(&self, account: AccountId, amount: Credits) -> LedgerResult<ChargeOutcome> {
        self.charges.fetch_add(1, Ordering::SeqCst);
        self.inner.try_charge(account, amount).await
    }

    async fn refund(&self, account: AccountId, amount: Credits) -> LedgerResult<()> {
        self.refunds.fetch_add(1, Ordering::SeqCst);
        if self.fail_refunds.load(Ordering::SeqCst) {
            return Err(LedgerError::new(LedgerErrorKind::Unavailable(
                "connection refused".into(),
            )));
        }
        self.inner.refund(account, amount).await
    }

    async fn balance_of(&self, account: AccountId) -> LedgerResult<Credits> {
        self.balance_reads.fetch_add(1, Ordering::SeqCst);
        self.inner.balance_of(account).await
    }
}

/// How a scripted collaborator behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    Succeed,
    Fail,
    Hang,
}

/// Provider with scripted behaviour; signals when it has been entered.
pub struct ScriptedProvider {
    behavior: Behavior,
    pub calls: AtomicUsize,
    pub entered: Notify,
}

impl ScriptedProvider {
    pub fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: AtomicUsize::new(0),
            entered: Notify::new(),
        })
    }
}

#[async_trait]
impl ContentProvider for ScriptedProvider {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.entered.notify_one();
        match self.behavior {
            Behavior::Succeed => Ok(format!("## Plan\n* {}", prompt.lines().last().unwrap_or(""))),
            Behavior::Fail => Err(ProviderError::for_provider(
                "scripted",
                ProviderErrorKind::Rejected {
                    status: 503,
                    message: "overloaded".into(),
                },
            )),
            Behavior::Hang => {
                std::future::pending::<()>().await;
                unreachable!()
            }
        }
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }

    fn model_name(&self) -> &str {
        "scripted-1"
    }
}

/// Renderer with scripted behaviour; signals when it has been entered.
pub struct ScriptedRenderer {
    behavior: Behavior,
    pub calls: AtomicUsize,
    pub entered: Notify,
}

impl ScriptedRenderer {
    pub fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: AtomicUsize::new(0),
            entered: Notify::new(),
        })
    }
}

#[async_trait]
impl DocumentRenderer for ScriptedRenderer {
    async fn render(&self, mode: GenerationMode, content: &str) -> Result<Artifact, RenderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.entered.notify_one();
        match self.behavior {
            Behavior::Succeed => MarkdownRenderer.render(mode, content).await,
            Behavior::Fail => Err(RenderError::new(RenderErrorKind::Failed(
                "layout engine crashed".into(),
            ))),
            Behavior::Hang => {
                std::future::pending::<()>().await;
                unreachable!()
            }
        }
    }
}

/// Store with scripted behaviour that remembers what it accepted.
pub struct ScriptedStore {
    behavior: Behavior,
    pub calls: AtomicUsize,
    pub entered: Notify,
    pub stored: parking_lot::Mutex<Vec<String>>,
}

impl ScriptedStore {
    pub fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: AtomicUsize::new(0),
            entered: Notify::new(),
            stored: parking_lot::Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl ArtifactStore for ScriptedStore {
    async fn put(&self, artifact: &Artifact) -> Result<ArtifactLocation, StorageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.entered.notify_one();
        match self.behavior {
            Behavior::Succeed => {
                self.stored.lock().push(artifact.file_name().clone());
                Ok(ArtifactLocation::new(format!(
                    "https://files.test/{}",
                    artifact.file_name()
                )))
            }
            Behavior::Fail => Err(StorageError::new(StorageErrorKind::Rejected(500))),
            Behavior::Hang => {
                std::future::pending::<()>().await;
                unreachable!()
            }
        }
    }

    fn backend_name(&self) -> &'static str {
        "scripted"
    }
}

/// Record store that always fails.
#[derive(Default)]
pub struct BrokenRecordStore;

#[async_trait]
impl GenerationRecordStore for BrokenRecordStore {
    async fn insert(&self, _record: NewGenerationRecord) -> DatabaseResult<GenerationRecord> {
        Err(DatabaseError::new(DatabaseErrorKind::Connection(
            "server closed the connection".into(),
        )))
    }

    async fn list_for_account(
        &self,
        _account: AccountId,
        _limit: i64,
    ) -> DatabaseResult<Vec<GenerationRecord>> {
        Ok(Vec::new())
    }
}

/// Everything a saga test needs to inspect afterwards.
pub struct Harness {
    pub account: AccountId,
    pub ledger: Arc<CountingLedger>,
    pub provider: Arc<ScriptedProvider>,
    pub renderer: Arc<ScriptedRenderer>,
    pub store: Arc<ScriptedStore>,
    pub records: Arc<InMemoryRecordStore>,
    pub saga: Arc<GenerationSaga>,
}

pub struct HarnessBuilder {
    balance: Credits,
    provider: Behavior,
    renderer: Behavior,
    store: Behavior,
    settings: SagaSettings,
    records: Option<Arc<dyn GenerationRecordStore>>,
}

impl Harness {
    pub fn builder(balance: Credits) -> HarnessBuilder {
        HarnessBuilder {
            balance,
            provider: Behavior::Succeed,
            renderer: Behavior::Succeed,
            store: Behavior::Succeed,
            settings: SagaSettings::default(),
            records: None,
        }
    }

    pub fn completed_records(&self) -> usize {
        self.records
            .snapshot()
            .iter()
            .filter(|r| *r.status() == forge_core::RecordStatus::Completed)
            .count()
    }

    pub fn failed_records(&self) -> usize {
        self.records
            .snapshot()
            .iter()
            .filter(|r| *r.status() == forge_core::RecordStatus::Failed)
            .count()
    }
}

impl HarnessBuilder {
    pub fn provider(mut self, behavior: Behavior) -> Self {
        self.provider = behavior;
        self
    }

    pub fn renderer(mut self, behavior: Behavior) -> Self {
        self.renderer = behavior;
        self
    }

    pub fn store(mut self, behavior: Behavior) -> Self {
        self.store = behavior;
        self
    }

    pub fn preflight(mut self, enabled: bool) -> Self {
        self.settings = SagaSettings::builder()
            .deadline(*self.settings.deadline())
            .preflight_check(enabled)
            .build()
            .expect("valid settings");
        self
    }

    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.settings = SagaSettings::builder()
            .deadline(deadline)
            .preflight_check(*self.settings.preflight_check())
            .build()
            .expect("valid settings");
        self
    }

    pub fn broken_records(mut self) -> Self {
        self.records = Some(Arc::new(BrokenRecordStore));
        self
    }

    pub fn build(self) -> Harness {
        let account = AccountId::random();
        let ledger = CountingLedger::with_account(account, self.balance);
        let provider = ScriptedProvider::new(self.provider);
        let renderer = ScriptedRenderer::new(self.renderer);
        let store = ScriptedStore::new(self.store);
        let records = Arc::new(InMemoryRecordStore::new());

        let router = ProviderRouter::new(
            ProvidersConfig::default().with_api_key(ProviderKind::Gemini, "test"),
        )
        .with_provider(ProviderKind::Gemini, provider.clone());

        let record_store: Arc<dyn GenerationRecordStore> = match self.records {
            Some(store) => store,
            None => records.clone(),
        };

        let saga = GenerationSaga::builder()
            .router(Arc::new(router))
            .ledger(ledger.clone())
            .renderer(renderer.clone())
            .store(store.clone())
            .records(record_store)
            .settings(self.settings)
            .build()
            .expect("complete saga");

        Harness {
            account,
            ledger,
            provider,
            renderer,
            store,
            records,
            saga: Arc::new(saga),
        }
    }
}
