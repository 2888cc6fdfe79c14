//! Artifact storage error types.

/// Kinds of storage errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum StorageErrorKind {
    /// Store answered with a non-success status
    #[display("Upload rejected with status {}", _0)]
    Rejected(u16),
    /// The upload never completed at the transport level
    #[display("Storage transport error: {}", _0)]
    Transport(String),
    /// Local filesystem failure
    #[display("Storage I/O error: {}", _0)]
    Io(String),
    /// Invalid artifact name
    #[display("Invalid artifact name: {}", _0)]
    InvalidName(String),
    /// Invalid storage configuration
    #[display("Invalid configuration: {}", _0)]
    InvalidConfig(String),
    /// Deadline elapsed while uploading
    #[display("Upload timed out")]
    Timeout,
    /// The request was abandoned by the caller
    #[display("Upload cancelled")]
    Cancelled,
}

/// Storage error with location tracking.
///
/// # Examples
///
/// ```
/// use forge_error::{StorageError, StorageErrorKind};
///
/// let err = StorageError::new(StorageErrorKind::Rejected(403));
/// assert!(format!("{}", err).contains("403"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Storage Error: {} at line {} in {}", kind, line, file)]
pub struct StorageError {
    /// The kind of error that occurred
    pub kind: StorageErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StorageError {
    /// Create a new storage error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StorageErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
