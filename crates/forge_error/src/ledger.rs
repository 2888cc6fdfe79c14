//! Credit ledger error types.

/// Ledger failure conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum LedgerErrorKind {
    /// The durable store could not be reached; no partial effect was applied
    #[display("Ledger unavailable: {}", _0)]
    Unavailable(String),
    /// No account row exists for the id
    #[display("Unknown account: {}", _0)]
    UnknownAccount(String),
    /// Charge or refund amount was not strictly positive
    #[display("Invalid credit amount: {}", _0)]
    InvalidAmount(i64),
}

/// Ledger error with location tracking.
///
/// # Examples
///
/// ```
/// use forge_error::{LedgerError, LedgerErrorKind};
///
/// let err = LedgerError::new(LedgerErrorKind::InvalidAmount(0));
/// assert!(format!("{}", err).contains("Invalid credit amount"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Ledger Error: {} at line {} in {}", kind, line, file)]
pub struct LedgerError {
    /// The specific error kind
    pub kind: LedgerErrorKind,
    /// Line number where error occurred
    pub line: u32,
    /// File where error occurred
    pub file: &'static str,
}

impl LedgerError {
    /// Create a new ledger error with location tracking.
    #[track_caller]
    pub fn new(kind: LedgerErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &LedgerErrorKind {
        &self.kind
    }
}

impl From<crate::DatabaseError> for LedgerError {
    #[track_caller]
    fn from(err: crate::DatabaseError) -> Self {
        // Anything short of a definite answer from the store is treated as unavailability.
        LedgerError::new(LedgerErrorKind::Unavailable(err.kind.to_string()))
    }
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
