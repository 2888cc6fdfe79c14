//! Ledger tests against a live Postgres database.
//!
//! Run with: DATABASE_URL=postgres://... cargo test -p forge_database -- --ignored

use diesel::prelude::*;
use forge_core::{AccountId, GenerationMode, NewGenerationRecord};
use forge_database::{
    CreditLedger, GenerationRecordStore, PostgresCreditLedger, PostgresRecordStore,
    establish_pool, run_migrations, schema::users,
};
use std::sync::Arc;

fn seeded_account(pool: &forge_database::PgPool, balance: i64) -> anyhow::Result<AccountId> {
    let account = AccountId::random();
    let mut conn = pool.get()?;
    diesel::insert_into(users::table)
        .values((users::id.eq(*account.as_uuid()), users::credit_balance.eq(balance)))
        .execute(&mut conn)?;
    Ok(account)
}

fn pool() -> anyhow::Result<forge_database::PgPool> {
    dotenvy::dotenv().ok();
    let pool = establish_pool(&std::env::var("DATABASE_URL")?, 8)?;
    run_migrations(&pool)?;
    Ok(pool)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore]
async fn conditional_update_prevents_overspend() -> anyhow::Result<()> {
    let pool = pool()?;
    let account = seeded_account(&pool, 5)?;
    let ledger = Arc::new(PostgresCreditLedger::new(pool));

    let attempts = (0..8).map(|_| {
        let ledger = Arc::clone(&ledger);
        tokio::spawn(async move { ledger.try_charge(account, 2).await })
    });
    let mut charged = 0;
    for outcome in futures::future::join_all(attempts).await {
        if outcome??.is_charged() {
            charged += 1;
        }
    }

    assert_eq!(charged, 2);
    assert_eq!(ledger.balance_of(account).await?, 1);
    Ok(())
}

#[tokio::test]
#[ignore]
async fn unknown_account_is_reported() -> anyhow::Result<()> {
    let ledger = PostgresCreditLedger::new(pool()?);
    let err = ledger.try_charge(AccountId::random(), 1).await.unwrap_err();
    assert!(matches!(
        err.kind(),
        forge_error::LedgerErrorKind::UnknownAccount(_)
    ));
    Ok(())
}

#[tokio::test]
#[ignore]
async fn records_round_trip_through_postgres() -> anyhow::Result<()> {
    let pool = pool()?;
    let account = seeded_account(&pool, 0)?;
    let store = PostgresRecordStore::new(pool);

    store
        .insert(NewGenerationRecord::failed(account, "photosynthesis", GenerationMode::Slides))
        .await?;
    let history = store.list_for_account(account, 20).await?;

    assert_eq!(history.len(), 1);
    assert_eq!(*history[0].mode(), GenerationMode::Slides);
    Ok(())
}
