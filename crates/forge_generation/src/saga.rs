//! The metered generation saga.
//!
//! One run moves through [`SagaState`] in order:
//!
//! ```text
//! Received -> Quoted -> ContentReady -> Charged -> Rendered -> Stored -> Completed
//! ```
//!
//! Credits are charged only after the provider has produced content, and only
//! render and upload happen while a charge is outstanding. Any failure or
//! cancellation in that window triggers exactly one refund of the amount that
//! was actually charged.

use crate::charge::ChargeGuard;
use crate::{SagaSettings, SagaState};
use derive_getters::Getters;
use forge_core::{
    AccountId, Artifact, ArtifactLocation, Credits, GenerationRequest, NewGenerationRecord,
    Pricing, compose_prompt,
};
use forge_database::{ChargeOutcome, CreditLedger, GenerationRecordStore};
use forge_error::{
    GenerationError, GenerationErrorKind, ProviderErrorKind, RenderErrorKind, StorageErrorKind,
};
use forge_models::{GeneratedContent, ProviderRouter};
use forge_storage::{ArtifactStore, DocumentRenderer};
use std::future::Future;
use std::sync::Arc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// What a successful run delivered.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct GenerationOutcome {
    location: ArtifactLocation,
    charged: Credits,
    #[getter(skip)]
    provider: &'static str,
    record_id: Option<i64>,
}

impl GenerationOutcome {
    /// Backend that produced the content.
    pub fn provider(&self) -> &'static str {
        self.provider
    }
}

/// Coordinates provider, ledger, renderer and store for one request at a time.
///
/// The saga itself is stateless and shared; every call to [`GenerationSaga::run`]
/// gets its own request-local state.
#[derive(derive_builder::Builder)]
#[builder(pattern = "owned")]
pub struct GenerationSaga {
    /// Picks and calls the content backend
    router: Arc<ProviderRouter>,
    /// Source of truth for credit balances
    ledger: Arc<dyn CreditLedger>,
    /// Turns generated text into a document
    renderer: Arc<dyn DocumentRenderer>,
    /// Where finished documents are uploaded
    store: Arc<dyn ArtifactStore>,
    /// Append-only generation history
    records: Arc<dyn GenerationRecordStore>,
    /// Credit cost per request shape
    #[builder(default)]
    pricing: Pricing,
    /// Deadline and preflight behaviour
    #[builder(default)]
    settings: SagaSettings,
}

impl std::fmt::Debug for GenerationSaga {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationSaga")
            .field("store", &self.store.backend_name())
            .field("pricing", &self.pricing)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Interrupt {
    Deadline,
    Cancelled,
}

impl GenerationSaga {
    /// Creates a new builder.
    pub fn builder() -> GenerationSagaBuilder {
        GenerationSagaBuilder::default()
    }

    /// Pricing in effect.
    pub fn pricing(&self) -> &Pricing {
        &self.pricing
    }

    /// Runs one request to a terminal state.
    ///
    /// `routing_key` feeds provider selection. Cancelling `cancel` aborts the
    /// step in flight; if credits were already charged they are refunded
    /// before this returns.
    ///
    /// # Errors
    ///
    /// Returns the terminal failure. [`GenerationErrorKind::RefundFailed`]
    /// means the account was charged without delivery and needs an operator.
    #[instrument(
        skip(self, request, routing_key, cancel),
        fields(account_id = %account, mode = %request.mode, cost = tracing::field::Empty)
    )]
    pub async fn run(
        &self,
        account: AccountId,
        request: GenerationRequest,
        routing_key: Option<String>,
        cancel: CancellationToken,
    ) -> Result<GenerationOutcome, GenerationError> {
        request
            .validate()
            .map_err(|reason| GenerationError::new(GenerationErrorKind::InvalidRequest(reason)))?;

        let started = Instant::now();
        let mut run = SagaRun {
            saga: self,
            account,
            request,
            routing_key,
            cancel,
            started,
            deadline: started + *self.settings.deadline(),
            state: SagaState::Received,
            guard: ChargeGuard::default(),
        };

        let result = run.execute().await;
        match &result {
            Ok(outcome) => info!(
                location = %outcome.location,
                charged = outcome.charged,
                provider = outcome.provider,
                "Generation completed"
            ),
            // Already reported on the alert target
            Err(err) if err.requires_operator() => {}
            Err(err) => warn!(state = %run.state, error = %err.kind, "Generation failed"),
        }
        result
    }

    /// Runs on a separate task tied to this future's lifetime.
    ///
    /// Dropping the returned future (for example when the HTTP client goes
    /// away) cancels the run, and the task still performs any refund it owes.
    ///
    /// # Errors
    ///
    /// Same as [`GenerationSaga::run`]; a task that dies without finishing is
    /// reported as [`GenerationErrorKind::Aborted`].
    pub async fn run_detached(
        self: &Arc<Self>,
        account: AccountId,
        request: GenerationRequest,
        routing_key: Option<String>,
    ) -> Result<GenerationOutcome, GenerationError> {
        let cancel = CancellationToken::new();
        let _cancel_on_drop = cancel.clone().drop_guard();
        let saga = Arc::clone(self);
        let task =
            tokio::spawn(async move { saga.run(account, request, routing_key, cancel).await });

        task.await.map_err(|err| {
            error!(error = %err, "Generation task ended abnormally");
            GenerationError::new(GenerationErrorKind::Aborted(err.to_string()))
        })?
    }
}

/// Request-local saga state. Never shared between requests.
struct SagaRun<'a> {
    saga: &'a GenerationSaga,
    account: AccountId,
    request: GenerationRequest,
    routing_key: Option<String>,
    cancel: CancellationToken,
    started: Instant,
    deadline: Instant,
    state: SagaState,
    guard: ChargeGuard,
}

impl SagaRun<'_> {
    async fn execute(&mut self) -> Result<GenerationOutcome, GenerationError> {
        let quote = self.saga.pricing.quote(&self.request);
        let cost = *quote.amount();
        tracing::Span::current().record("cost", cost);
        self.advance(SagaState::Quoted);

        if *self.saga.settings.preflight_check() {
            self.preflight(cost).await?;
        }

        let content = self.generate().await?;
        self.advance(SagaState::ContentReady);

        self.charge(cost).await?;
        self.advance(SagaState::Charged);

        let artifact = self.render(&content).await?;
        self.advance(SagaState::Rendered);

        let location = self.upload(&artifact).await?;
        self.guard.settle();
        self.advance(SagaState::Stored);

        let record_id = self
            .write_record(NewGenerationRecord::completed(
                self.account,
                self.request.prompt.clone(),
                self.request.mode,
                location.clone(),
            ))
            .await;
        self.advance(SagaState::Completed);

        Ok(GenerationOutcome {
            location,
            charged: cost,
            provider: content.provider(),
            record_id,
        })
    }

    fn advance(&mut self, next: SagaState) {
        debug!(from = %self.state, to = %next, "Saga transition");
        self.state = next;
    }

    fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    /// Races a step against cancellation and the run deadline.
    async fn bounded<F: Future>(&self, step: F) -> Result<F::Output, Interrupt> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(Interrupt::Cancelled),
            outcome = tokio::time::timeout_at(self.deadline, step) => {
                outcome.map_err(|_| Interrupt::Deadline)
            }
        }
    }

    fn interrupted(&self) -> Option<Interrupt> {
        if self.cancel.is_cancelled() {
            Some(Interrupt::Cancelled)
        } else if Instant::now() >= self.deadline {
            Some(Interrupt::Deadline)
        } else {
            None
        }
    }

    async fn preflight(&mut self, cost: Credits) -> Result<(), GenerationError> {
        let balance = self
            .bounded(self.saga.ledger.balance_of(self.account))
            .await;
        match balance {
            Ok(Ok(balance)) if balance < cost => {
                debug!(balance, cost, "Balance below quote, skipping provider");
                Err(self
                    .fail("preflight", GenerationErrorKind::InsufficientCredits { required: cost })
                    .await)
            }
            Ok(Ok(_)) => Ok(()),
            Ok(Err(err)) => Err(GenerationError::new(GenerationErrorKind::Ledger(err.kind))),
            Err(Interrupt::Deadline) => {
                let waited = self.elapsed_ms();
                Err(self
                    .fail(
                        "preflight",
                        GenerationErrorKind::ProviderFailed(ProviderErrorKind::Timeout(waited)),
                    )
                    .await)
            }
            Err(Interrupt::Cancelled) => Err(self
                .fail(
                    "preflight",
                    GenerationErrorKind::ProviderFailed(ProviderErrorKind::Cancelled),
                )
                .await),
        }
    }

    async fn generate(&mut self) -> Result<GeneratedContent, GenerationError> {
        let prompt = compose_prompt(&self.request);
        let generated = self
            .bounded(self.saga.router.generate(
                self.routing_key.as_deref(),
                &prompt,
                self.deadline,
            ))
            .await;
        let failure = match generated {
            Ok(Ok(content)) => return Ok(content),
            Ok(Err(err)) => GenerationErrorKind::ProviderFailed(err.kind),
            Err(Interrupt::Deadline) => {
                GenerationErrorKind::ProviderFailed(ProviderErrorKind::Timeout(self.elapsed_ms()))
            }
            Err(Interrupt::Cancelled) => {
                GenerationErrorKind::ProviderFailed(ProviderErrorKind::Cancelled)
            }
        };
        Err(self.fail("provider", failure).await)
    }

    async fn charge(&mut self, cost: Credits) -> Result<(), GenerationError> {
        if let Some(interrupt) = self.interrupted() {
            let failure = match interrupt {
                Interrupt::Deadline => {
                    GenerationErrorKind::ProviderFailed(ProviderErrorKind::Timeout(self.elapsed_ms()))
                }
                Interrupt::Cancelled => {
                    GenerationErrorKind::ProviderFailed(ProviderErrorKind::Cancelled)
                }
            };
            return Err(self.fail("charge", failure).await);
        }

        // Never abandoned mid-flight: the debit may land after the caller stops waiting.
        let outcome = self.saga.ledger.try_charge(self.account, cost).await;
        match outcome {
            Ok(ChargeOutcome::Charged) => {
                self.guard.arm(cost);
                Ok(())
            }
            Ok(ChargeOutcome::Declined) => Err(self
                .fail("charge", GenerationErrorKind::InsufficientCredits { required: cost })
                .await),
            Err(err) => Err(GenerationError::new(GenerationErrorKind::Ledger(err.kind))),
        }
    }

    async fn render(&mut self, content: &GeneratedContent) -> Result<Artifact, GenerationError> {
        let rendered = self
            .bounded(self.saga.renderer.render(self.request.mode, content.text()))
            .await;
        let failure = match rendered {
            Ok(Ok(artifact)) => return Ok(artifact),
            Ok(Err(err)) => GenerationErrorKind::RenderFailed(err.kind),
            Err(Interrupt::Deadline) => GenerationErrorKind::RenderFailed(RenderErrorKind::Timeout),
            Err(Interrupt::Cancelled) => {
                GenerationErrorKind::RenderFailed(RenderErrorKind::Cancelled)
            }
        };
        Err(self.fail("render", failure).await)
    }

    async fn upload(&mut self, artifact: &Artifact) -> Result<ArtifactLocation, GenerationError> {
        let stored = self.bounded(self.saga.store.put(artifact)).await;
        let failure = match stored {
            Ok(Ok(location)) => return Ok(location),
            Ok(Err(err)) => GenerationErrorKind::StorageFailed(err.kind),
            Err(Interrupt::Deadline) => {
                GenerationErrorKind::StorageFailed(StorageErrorKind::Timeout)
            }
            Err(Interrupt::Cancelled) => {
                GenerationErrorKind::StorageFailed(StorageErrorKind::Cancelled)
            }
        };
        Err(self.fail("upload", failure).await)
    }

    /// Ends the run: refunds any outstanding charge, then writes a failed record.
    async fn fail(&mut self, step: &'static str, failure: GenerationErrorKind) -> GenerationError {
        debug_assert_eq!(self.guard.is_outstanding(), self.state.holds_charge());
        let error = match self.guard.take() {
            Some(amount) => self.refund(step, amount, failure).await,
            None => GenerationError::new(failure),
        };
        self.write_record(NewGenerationRecord::failed(
            self.account,
            self.request.prompt.clone(),
            self.request.mode,
        ))
        .await;
        error
    }

    /// Issues the single compensating refund. Not raced against cancellation.
    async fn refund(
        &self,
        step: &'static str,
        amount: Credits,
        failure: GenerationErrorKind,
    ) -> GenerationError {
        match self.saga.ledger.refund(self.account, amount).await {
            Ok(()) => {
                info!(amount, step, reason = %failure, "Charge refunded");
                GenerationError::new(failure)
            }
            Err(err) => {
                error!(
                    target: "forge::alert",
                    alert = "refund_failed",
                    account_id = %self.account,
                    amount,
                    step,
                    reason = %failure,
                    error = %err.kind,
                    "Refund failed: account charged without delivery"
                );
                GenerationError::new(GenerationErrorKind::RefundFailed {
                    amount,
                    step: step.to_string(),
                    cause: err.kind.to_string(),
                })
            }
        }
    }

    /// Best-effort audit write. Failures are logged and never change the outcome.
    async fn write_record(&self, record: NewGenerationRecord) -> Option<i64> {
        let status = record.status;
        let written = tokio::time::timeout(
            *self.saga.settings.record_timeout(),
            self.saga.records.insert(record),
        )
        .await;
        match written {
            Ok(Ok(stored)) => Some(*stored.id()),
            Ok(Err(err)) => {
                warn!(
                    anomaly = "record_persist_failed",
                    %status,
                    error = %err.kind,
                    "Generation record not written"
                );
                None
            }
            Err(_) => {
                warn!(anomaly = "record_persist_failed", %status, "Generation record write timed out");
                None
            }
        }
    }
}
