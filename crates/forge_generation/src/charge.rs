//! Tracking of the one charge a saga may hold.

use forge_core::Credits;

/// The amount debited by this saga instance that has not been refunded.
///
/// Armed once after a successful charge with the exact amount charged, and
/// taken at most once. Taking clears the guard before the refund is attempted,
/// so a failed refund can never be followed by a second one.
#[derive(Debug, Default)]
pub(crate) struct ChargeGuard {
    outstanding: Option<Credits>,
}

impl ChargeGuard {
    pub(crate) fn arm(&mut self, amount: Credits) {
        debug_assert!(self.outstanding.is_none(), "a saga charges at most once");
        self.outstanding = Some(amount);
    }

    pub(crate) fn take(&mut self) -> Option<Credits> {
        self.outstanding.take()
    }

    /// Marks the charge as earned; nothing is left to refund.
    pub(crate) fn settle(&mut self) {
        self.outstanding = None;
    }

    pub(crate) fn is_outstanding(&self) -> bool {
        self.outstanding.is_some()
    }
}
