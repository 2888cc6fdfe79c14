//! The credit ledger contract.

use async_trait::async_trait;
use forge_core::{AccountId, Credits};
use forge_error::{LedgerError, LedgerErrorKind, LedgerResult};

/// Result of a conditional debit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChargeOutcome {
    /// Balance covered the amount and was decremented
    Charged,
    /// Balance was below the amount; nothing changed
    Declined,
}

impl ChargeOutcome {
    /// True when the balance was debited.
    pub fn is_charged(self) -> bool {
        matches!(self, ChargeOutcome::Charged)
    }
}

/// Owner of authoritative account balances.
///
/// Implementations are the only code allowed to mutate a balance, and every
/// operation must be atomic with respect to concurrent callers on the same
/// account. Balances never go below zero.
#[async_trait]
pub trait CreditLedger: Send + Sync {
    /// Debits `amount` only if the balance covers it, as one compare-and-decrement.
    ///
    /// # Errors
    ///
    /// `Unavailable` when the store cannot answer (nothing was applied),
    /// `UnknownAccount` when no such account exists, `InvalidAmount` for
    /// non-positive amounts.
    async fn try_charge(&self, account: AccountId, amount: Credits) -> LedgerResult<ChargeOutcome>;

    /// Credits `amount` back. The ledger does not deduplicate refunds.
    ///
    /// # Errors
    ///
    /// Same conditions as [`CreditLedger::try_charge`].
    async fn refund(&self, account: AccountId, amount: Credits) -> LedgerResult<()>;

    /// Read-only snapshot; may be stale relative to in-flight charges.
    ///
    /// # Errors
    ///
    /// `Unavailable` or `UnknownAccount`.
    async fn balance_of(&self, account: AccountId) -> LedgerResult<Credits>;
}

pub(crate) fn ensure_positive(amount: Credits) -> LedgerResult<()> {
    if amount <= 0 {
        return Err(LedgerError::new(LedgerErrorKind::InvalidAmount(amount)));
    }
    Ok(())
}

pub(crate) fn unknown_account(account: AccountId) -> LedgerError {
    LedgerError::new(LedgerErrorKind::UnknownAccount(account.to_string()))
}
