//! Terminal failures of a generation run.

use crate::{
    LedgerError, LedgerErrorKind, ProviderError, ProviderErrorKind, RenderError, RenderErrorKind,
    StorageError, StorageErrorKind,
};

/// Why a generation run ended without delivering an artifact.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum GenerationErrorKind {
    /// The request failed validation before any work started
    #[display("Invalid generation request: {}", _0)]
    InvalidRequest(String),
    /// Content generation failed; nothing was charged
    #[display("Content generation failed: {}", _0)]
    ProviderFailed(ProviderErrorKind),
    /// The conditional debit was declined; nothing was charged
    #[display("Insufficient credits: {} required", required)]
    InsufficientCredits {
        /// Credits the request would have cost
        required: i64,
    },
    /// The ledger could not be used before any charge was made
    #[display("Ledger failure: {}", _0)]
    Ledger(LedgerErrorKind),
    /// Rendering failed after the charge; the charge was refunded
    #[display("Document rendering failed: {}", _0)]
    RenderFailed(RenderErrorKind),
    /// Upload failed after the charge; the charge was refunded
    #[display("Artifact storage failed: {}", _0)]
    StorageFailed(StorageErrorKind),
    /// The compensating refund itself failed; the account is out of balance
    #[display("Refund of {} credits failed after {}: {}", amount, step, cause)]
    RefundFailed {
        /// Credits that were charged and not returned
        amount: i64,
        /// The forward step whose failure triggered compensation
        step: String,
        /// Ledger error reported by the refund
        cause: String,
    },
    /// The run's task ended without reaching a terminal state
    #[display("Generation aborted: {}", _0)]
    Aborted(String),
}

/// Generation error with location tracking.
///
/// # Examples
///
/// ```
/// use forge_error::{GenerationError, GenerationErrorKind};
///
/// let err = GenerationError::new(GenerationErrorKind::InsufficientCredits { required: 2 });
/// assert!(!err.requires_operator());
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Generation Error: {} at line {} in {}", kind, line, file)]
pub struct GenerationError {
    /// The specific error kind
    pub kind: GenerationErrorKind,
    /// Line number where error occurred
    pub line: u32,
    /// File where error occurred
    pub file: &'static str,
}

impl GenerationError {
    /// Create a new generation error with location tracking.
    #[track_caller]
    pub fn new(kind: GenerationErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &GenerationErrorKind {
        &self.kind
    }

    /// Whether the failure left the ledger inconsistent.
    pub fn requires_operator(&self) -> bool {
        matches!(self.kind, GenerationErrorKind::RefundFailed { .. })
    }
}

impl From<ProviderError> for GenerationError {
    #[track_caller]
    fn from(err: ProviderError) -> Self {
        GenerationError::new(GenerationErrorKind::ProviderFailed(err.kind))
    }
}

impl From<LedgerError> for GenerationError {
    #[track_caller]
    fn from(err: LedgerError) -> Self {
        GenerationError::new(GenerationErrorKind::Ledger(err.kind))
    }
}

impl From<RenderError> for GenerationError {
    #[track_caller]
    fn from(err: RenderError) -> Self {
        GenerationError::new(GenerationErrorKind::RenderFailed(err.kind))
    }
}

impl From<StorageError> for GenerationError {
    #[track_caller]
    fn from(err: StorageError) -> Self {
        GenerationError::new(GenerationErrorKind::StorageFailed(err.kind))
    }
}
