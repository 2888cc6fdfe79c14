//! Top-level error wrapper types.

use crate::{
    AuthError, ConfigError, DatabaseError, GenerationError, LedgerError, ProviderError,
    RateLimitError, RenderError, StorageError,
};

/// Every error a forge crate can surface.
///
/// # Examples
///
/// ```
/// use forge_error::{ForgeError, ForgeErrorKind, StorageError, StorageErrorKind};
///
/// let err: ForgeError = StorageError::new(StorageErrorKind::Rejected(403)).into();
/// assert!(matches!(err.kind(), ForgeErrorKind::Storage(_)));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum ForgeErrorKind {
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Database error
    #[from(DatabaseError)]
    Database(DatabaseError),
    /// Credit ledger error
    #[from(LedgerError)]
    Ledger(LedgerError),
    /// Content provider error
    #[from(ProviderError)]
    Provider(ProviderError),
    /// Document renderer error
    #[from(RenderError)]
    Render(RenderError),
    /// Artifact storage error
    #[from(StorageError)]
    Storage(StorageError),
    /// Authentication error
    #[from(AuthError)]
    Auth(AuthError),
    /// Rate limiting error
    #[from(RateLimitError)]
    RateLimit(RateLimitError),
    /// Generation run error
    #[from(GenerationError)]
    Generation(GenerationError),
}

/// Forge error with kind discrimination.
///
/// # Examples
///
/// ```
/// use forge_error::{ConfigError, ForgeResult};
///
/// fn might_fail() -> ForgeResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// assert!(might_fail().is_err());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Forge Error: {}", _0)]
pub struct ForgeError(Box<ForgeErrorKind>);

impl ForgeError {
    /// Create a new error from a kind.
    pub fn new(kind: ForgeErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ForgeErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to ForgeErrorKind
impl<T> From<T> for ForgeError
where
    T: Into<ForgeErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for forge operations.
pub type ForgeResult<T> = std::result::Result<T, ForgeError>;
