//! Postgres-backed credit ledger.

use crate::connection::{PgPool, run_blocking};
use crate::ledger::{ChargeOutcome, CreditLedger, ensure_positive, unknown_account};
use crate::schema::users;
use async_trait::async_trait;
use diesel::prelude::*;
use forge_core::{AccountId, Credits};
use forge_error::{DatabaseError, LedgerResult};
use tracing::{debug, instrument};

/// Ledger over the `users.credit_balance` column.
///
/// Charging is a single `UPDATE ... WHERE credit_balance >= amount`; the
/// database serialises concurrent updates of the row, so no application lock
/// is taken.
#[derive(Clone)]
pub struct PostgresCreditLedger {
    pool: PgPool,
}

impl std::fmt::Debug for PostgresCreditLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresCreditLedger")
            .field("pool_size", &self.pool.state().connections)
            .finish()
    }
}

impl PostgresCreditLedger {
    /// Wraps an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn account_exists(conn: &mut PgConnection, account: AccountId) -> LedgerResult<bool> {
    let found = diesel::select(diesel::dsl::exists(
        users::table.filter(users::id.eq(*account.as_uuid())),
    ))
    .get_result::<bool>(conn)
    .map_err(DatabaseError::from)?;
    Ok(found)
}

#[async_trait]
impl CreditLedger for PostgresCreditLedger {
    #[instrument(skip(self), fields(account_id = %account))]
    async fn try_charge(&self, account: AccountId, amount: Credits) -> LedgerResult<ChargeOutcome> {
        ensure_positive(amount)?;
        run_blocking(&self.pool, move |conn| {
            let updated = diesel::update(
                users::table
                    .filter(users::id.eq(*account.as_uuid()))
                    .filter(users::credit_balance.ge(amount)),
            )
            .set(users::credit_balance.eq(users::credit_balance - amount))
            .execute(conn)
            .map_err(DatabaseError::from)?;

            if updated > 0 {
                debug!(amount, "Charge applied");
                return Ok(ChargeOutcome::Charged);
            }
            // Zero rows means either a short balance or no such account
            if account_exists(conn, account)? {
                debug!(amount, "Charge declined");
                Ok(ChargeOutcome::Declined)
            } else {
                Err(unknown_account(account))
            }
        })
        .await
    }

    #[instrument(skip(self), fields(account_id = %account))]
    async fn refund(&self, account: AccountId, amount: Credits) -> LedgerResult<()> {
        ensure_positive(amount)?;
        run_blocking(&self.pool, move |conn| {
            let updated = diesel::update(users::table.filter(users::id.eq(*account.as_uuid())))
                .set(users::credit_balance.eq(users::credit_balance + amount))
                .execute(conn)
                .map_err(DatabaseError::from)?;
            if updated == 0 {
                return Err(unknown_account(account));
            }
            debug!(amount, "Refund applied");
            Ok(())
        })
        .await
    }

    #[instrument(skip(self), fields(account_id = %account))]
    async fn balance_of(&self, account: AccountId) -> LedgerResult<Credits> {
        run_blocking(&self.pool, move |conn| {
            users::table
                .find(*account.as_uuid())
                .select(users::credit_balance)
                .first::<i64>(conn)
                .optional()
                .map_err(DatabaseError::from)?
                .ok_or_else(|| unknown_account(account))
        })
        .await
    }
}
