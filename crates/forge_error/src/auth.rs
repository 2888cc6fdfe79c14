//! Authentication error types.

/// Authentication failure conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum AuthErrorKind {
    /// No bearer credential on the request
    #[display("Missing bearer credential")]
    MissingCredential,
    /// The identity provider rejected the credential
    #[display("Invalid credential: {}", _0)]
    InvalidCredential(String),
    /// The identity provider could not be reached
    #[display("Identity provider unavailable: {}", _0)]
    Unavailable(String),
}

/// Authentication error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Auth Error: {} at line {} in {}", kind, line, file)]
pub struct AuthError {
    /// The specific error kind
    pub kind: AuthErrorKind,
    /// Line number where error occurred
    pub line: u32,
    /// File where error occurred
    pub file: &'static str,
}

impl AuthError {
    /// Create a new auth error with location tracking.
    #[track_caller]
    pub fn new(kind: AuthErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
