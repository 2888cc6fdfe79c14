//! Saga states.

/// Where a saga run currently stands. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum SagaState {
    /// Request accepted and validated
    Received,
    /// Cost computed
    Quoted,
    /// Provider returned content; nothing charged yet
    ContentReady,
    /// Balance debited; failures from here on are refunded
    Charged,
    /// Document bytes produced
    Rendered,
    /// Artifact stored and deliverable
    Stored,
    /// Terminal success
    Completed,
}

impl SagaState {
    /// True once the run holds the user's credits.
    pub fn holds_charge(self) -> bool {
        matches!(self, SagaState::Charged | SagaState::Rendered)
    }
}
