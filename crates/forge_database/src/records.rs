//! Append-only generation history.

use crate::connection::{PgPool, run_blocking};
use crate::models::{GenerationRow, NewGenerationRow};
use crate::schema::generations;
use crate::DatabaseResult;
use async_trait::async_trait;
use diesel::prelude::*;
use forge_core::{AccountId, GenerationRecord, NewGenerationRecord};
use forge_error::DatabaseError;
use parking_lot::Mutex;
use tracing::{debug, instrument};

/// Storage for generation records. Records are written once and never updated.
///
/// The record table is an audit trail; billing truth lives in the ledger.
#[async_trait]
pub trait GenerationRecordStore: Send + Sync {
    /// Appends a record and returns it with its assigned id and timestamp.
    async fn insert(&self, record: NewGenerationRecord) -> DatabaseResult<GenerationRecord>;

    /// Most recent records for an account, newest first.
    async fn list_for_account(
        &self,
        account: AccountId,
        limit: i64,
    ) -> DatabaseResult<Vec<GenerationRecord>>;
}

/// Record store over the Postgres `generations` table.
#[derive(Clone)]
pub struct PostgresRecordStore {
    pool: PgPool,
}

impl std::fmt::Debug for PostgresRecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresRecordStore").finish_non_exhaustive()
    }
}

impl PostgresRecordStore {
    /// Wraps an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GenerationRecordStore for PostgresRecordStore {
    #[instrument(skip(self, record), fields(account_id = %record.account_id, status = %record.status))]
    async fn insert(&self, record: NewGenerationRecord) -> DatabaseResult<GenerationRecord> {
        run_blocking(&self.pool, move |conn| {
            let row: GenerationRow = diesel::insert_into(generations::table)
                .values(NewGenerationRow::from(&record))
                .returning(GenerationRow::as_returning())
                .get_result(conn)?;
            debug!(id = row.id, "Generation record inserted");
            GenerationRecord::try_from(row)
        })
        .await
    }

    #[instrument(skip(self), fields(account_id = %account))]
    async fn list_for_account(
        &self,
        account: AccountId,
        limit: i64,
    ) -> DatabaseResult<Vec<GenerationRecord>> {
        run_blocking(&self.pool, move |conn| {
            let rows: Vec<GenerationRow> = generations::table
                .filter(generations::user_id.eq(*account.as_uuid()))
                .order((generations::created_at.desc(), generations::id.desc()))
                .limit(limit.max(0))
                .select(GenerationRow::as_select())
                .load(conn)?;
            rows.into_iter()
                .map(GenerationRecord::try_from)
                .collect::<Result<Vec<_>, DatabaseError>>()
        })
        .await
    }
}

/// Record store kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    records: Mutex<Vec<GenerationRecord>>,
}

impl InMemoryRecordStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every record, oldest first.
    pub fn snapshot(&self) -> Vec<GenerationRecord> {
        self.records.lock().clone()
    }
}

#[async_trait]
impl GenerationRecordStore for InMemoryRecordStore {
    async fn insert(&self, record: NewGenerationRecord) -> DatabaseResult<GenerationRecord> {
        let mut records = self.records.lock();
        let id = i64::try_from(records.len()).unwrap_or(i64::MAX - 1) + 1;
        let stored = GenerationRecord::from_parts(id, record, chrono::Utc::now().naive_utc());
        records.push(stored.clone());
        Ok(stored)
    }

    async fn list_for_account(
        &self,
        account: AccountId,
        limit: i64,
    ) -> DatabaseResult<Vec<GenerationRecord>> {
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(self
            .records
            .lock()
            .iter()
            .rev()
            .filter(|record| *record.account_id() == account)
            .take(limit)
            .cloned()
            .collect())
    }
}
