//! Content provider error types.

/// Failure conditions of a content-generation backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ProviderErrorKind {
    /// The caller-supplied deadline elapsed before the backend answered
    #[display("Provider timed out after {}ms", _0)]
    Timeout(u64),
    /// The backend answered with a non-success status
    #[display("Provider rejected request ({}): {}", status, message)]
    Rejected {
        /// HTTP status code returned by the backend
        status: u16,
        /// Response body or summary
        message: String,
    },
    /// The request never reached the backend or the connection dropped
    #[display("Provider transport error: {}", _0)]
    Transport(String),
    /// The backend answered but the payload had no usable content
    #[display("Provider returned an invalid response: {}", _0)]
    InvalidResponse(String),
    /// The selected backend lacks credentials or configuration
    #[display("Provider not configured: {}", _0)]
    NotConfigured(String),
    /// The request was abandoned by the caller
    #[display("Provider call cancelled")]
    Cancelled,
}

/// Provider error with location tracking.
///
/// # Examples
///
/// ```
/// use forge_error::{ProviderError, ProviderErrorKind};
///
/// let err = ProviderError::new(ProviderErrorKind::Timeout(90_000));
/// assert!(err.is_timeout());
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Provider Error [{}]: {} at line {} in {}", provider, kind, line, file)]
pub struct ProviderError {
    /// Backend that produced the error
    pub provider: &'static str,
    /// The specific error kind
    pub kind: ProviderErrorKind,
    /// Line number where error occurred
    pub line: u32,
    /// File where error occurred
    pub file: &'static str,
}

impl ProviderError {
    /// Create a new provider error not attributed to a specific backend.
    #[track_caller]
    pub fn new(kind: ProviderErrorKind) -> Self {
        Self::for_provider("router", kind)
    }

    /// Create a new provider error attributed to a named backend.
    #[track_caller]
    pub fn for_provider(provider: &'static str, kind: ProviderErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            provider,
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Whether the deadline elapsed, as opposed to a remote rejection.
    pub fn is_timeout(&self) -> bool {
        matches!(self.kind, ProviderErrorKind::Timeout(_))
    }
}
