//! Wires configured backends into an [`AppState`].

use crate::{
    AppState, AuthBackend, DatabaseBackend, ForgeConfig, IdentityVerifier, StaticIdentityVerifier,
    StorageBackend, SupabaseIdentityVerifier,
};
use forge_database::{
    CreditLedger, GenerationRecordStore, InMemoryCreditLedger, InMemoryRecordStore,
    PostgresCreditLedger, PostgresRecordStore, establish_pool, run_migrations,
};
use forge_error::{ConfigError, ForgeResult};
use forge_generation::{GenerationSaga, SagaSettings};
use forge_models::ProviderRouter;
use forge_rate_limit::Admission;
use forge_storage::{
    ArtifactStore, FilesystemArtifactStore, MarkdownRenderer, SupabaseArtifactStore,
};
use std::sync::Arc;
use tracing::{info, instrument};

/// Applies pending migrations to the configured database.
///
/// # Errors
///
/// Returns an error if the backend is not Postgres or the migration fails.
#[instrument(skip(config))]
pub fn migrate(config: &ForgeConfig) -> ForgeResult<()> {
    let url = postgres_url(config)?;
    let pool = establish_pool(url, 1)?;
    run_migrations(&pool)?;
    Ok(())
}

/// Builds every collaborator named by `config`.
///
/// Blocking: opens the database pool. Call before serving.
///
/// # Errors
///
/// Returns an error if a backend cannot be constructed.
#[instrument(skip_all)]
pub fn build_state(config: &ForgeConfig, limiter: Arc<dyn Admission>) -> ForgeResult<AppState> {
    let router = ProviderRouter::from_config(config.providers().clone())?;

    let (ledger, records) = match config.database().backend() {
        DatabaseBackend::Postgres => {
            let pool = establish_pool(postgres_url(config)?, *config.database().pool_size())?;
            let ledger: Arc<dyn CreditLedger> = Arc::new(PostgresCreditLedger::new(pool.clone()));
            let records: Arc<dyn GenerationRecordStore> = Arc::new(PostgresRecordStore::new(pool));
            (ledger, records)
        }
        DatabaseBackend::Memory => {
            let ledger: Arc<dyn CreditLedger> = Arc::new(
                InMemoryCreditLedger::with_starting_balance(*config.database().starting_credits()),
            );
            let records: Arc<dyn GenerationRecordStore> = Arc::new(InMemoryRecordStore::new());
            (ledger, records)
        }
    };

    let storage = config.storage();
    let store: Arc<dyn ArtifactStore> = match storage.backend() {
        StorageBackend::Supabase => {
            let supabase = config.supabase();
            Arc::new(SupabaseArtifactStore::new(
                required(supabase.url(), "SUPABASE_URL")?,
                required(supabase.service_role_key(), "SUPABASE_SERVICE_ROLE_KEY")?,
                storage.bucket().clone(),
                storage.upload_timeout(),
            )?)
        }
        StorageBackend::Filesystem => Arc::new(FilesystemArtifactStore::new(
            storage.root().clone(),
            storage.public_base().clone(),
        )?),
    };

    let auth = config.auth();
    let verifier: Arc<dyn IdentityVerifier> = match auth.backend() {
        AuthBackend::Supabase => {
            let supabase = config.supabase();
            Arc::new(SupabaseIdentityVerifier::new(
                required(supabase.url(), "SUPABASE_URL")?,
                required(supabase.anon_key(), "SUPABASE_ANON_KEY")?,
                auth.verify_timeout(),
            )?)
        }
        AuthBackend::Static => Arc::new(
            auth.static_accounts()
                .iter()
                .map(|entry| (entry.token().clone(), *entry.account()))
                .collect::<StaticIdentityVerifier>(),
        ),
    };

    let settings = SagaSettings::builder()
        .deadline(config.server().request_deadline())
        .preflight_check(*config.pricing().preflight_check())
        .build()
        .map_err(|e| ConfigError::new(format!("Invalid saga settings: {}", e)))?;

    let saga = GenerationSaga::builder()
        .router(Arc::new(router))
        .ledger(Arc::clone(&ledger))
        .renderer(Arc::new(MarkdownRenderer))
        .store(store)
        .records(Arc::clone(&records))
        .pricing(config.pricing().prices().clone())
        .settings(settings)
        .build()
        .map_err(|e| ConfigError::new(format!("Invalid generation wiring: {}", e)))?;

    info!(
        database = %config.database().backend(),
        storage = %storage.backend(),
        auth = %auth.backend(),
        "Backends ready"
    );

    let state = AppState::builder()
        .saga(Arc::new(saga))
        .ledger(ledger)
        .records(records)
        .verifier(verifier)
        .limiter(limiter)
        .routing_header(config.server().routing_header().clone())
        .build()
        .map_err(|e| ConfigError::new(format!("Invalid application state: {}", e)))?;
    Ok(state)
}

fn postgres_url(config: &ForgeConfig) -> Result<&str, ConfigError> {
    required(config.database().url(), "DATABASE_URL")
}

fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, ConfigError> {
    value
        .as_deref()
        .ok_or_else(|| ConfigError::new(format!("{} is not set", name)))
}
