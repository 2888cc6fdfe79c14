//! Process-local credit ledger.

use crate::ledger::{ChargeOutcome, CreditLedger, ensure_positive, unknown_account};
use async_trait::async_trait;
use forge_core::{AccountId, Credits};
use forge_error::LedgerResult;
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Ledger held in memory behind one mutex.
///
/// Used by the `memory` database backend and by tests. When a starting balance
/// is configured, accounts are opened on first use; otherwise unknown accounts
/// are rejected the same way the Postgres ledger rejects them.
#[derive(Debug, Default)]
pub struct InMemoryCreditLedger {
    balances: Mutex<HashMap<AccountId, Credits>>,
    starting_balance: Option<Credits>,
}

impl InMemoryCreditLedger {
    /// Empty ledger that rejects unknown accounts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger that opens unseen accounts with `balance` credits.
    pub fn with_starting_balance(balance: Credits) -> Self {
        Self {
            balances: Mutex::default(),
            starting_balance: Some(balance.max(0)),
        }
    }

    /// Opens (or resets) an account.
    pub fn open_account(&self, account: AccountId, balance: Credits) {
        self.balances.lock().insert(account, balance.max(0));
    }

    fn with_balance<T>(
        &self,
        account: AccountId,
        op: impl FnOnce(&mut Credits) -> T,
    ) -> LedgerResult<T> {
        let mut balances = self.balances.lock();
        if !balances.contains_key(&account) {
            let start = self.starting_balance.ok_or_else(|| unknown_account(account))?;
            balances.insert(account, start);
        }
        let balance = balances
            .get_mut(&account)
            .ok_or_else(|| unknown_account(account))?;
        Ok(op(balance))
    }
}

#[async_trait]
impl CreditLedger for InMemoryCreditLedger {
    #[instrument(skip(self), fields(account_id = %account))]
    async fn try_charge(&self, account: AccountId, amount: Credits) -> LedgerResult<ChargeOutcome> {
        ensure_positive(amount)?;
        let outcome = self.with_balance(account, |balance| {
            if *balance >= amount {
                *balance -= amount;
                ChargeOutcome::Charged
            } else {
                ChargeOutcome::Declined
            }
        })?;
        debug!(amount, ?outcome, "Charge evaluated");
        Ok(outcome)
    }

    #[instrument(skip(self), fields(account_id = %account))]
    async fn refund(&self, account: AccountId, amount: Credits) -> LedgerResult<()> {
        ensure_positive(amount)?;
        self.with_balance(account, |balance| *balance += amount)
    }

    async fn balance_of(&self, account: AccountId) -> LedgerResult<Credits> {
        self.with_balance(account, |balance| *balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_account_is_rejected() {
        let ledger = InMemoryCreditLedger::new();
        let err = ledger.try_charge(AccountId::random(), 1).await.unwrap_err();
        assert!(matches!(
            err.kind(),
            forge_error::LedgerErrorKind::UnknownAccount(_)
        ));
    }

    #[tokio::test]
    async fn starting_balance_opens_accounts() {
        let ledger = InMemoryCreditLedger::with_starting_balance(3);
        let account = AccountId::random();
        assert_eq!(ledger.balance_of(account).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn non_positive_amounts_are_invalid() {
        let ledger = InMemoryCreditLedger::with_starting_balance(3);
        let account = AccountId::random();
        assert!(ledger.try_charge(account, 0).await.is_err());
        assert!(ledger.refund(account, -2).await.is_err());
        assert_eq!(ledger.balance_of(account).await.unwrap(), 3);
    }
}
