//! Document rendering error types.

/// Rendering failure conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum RenderErrorKind {
    /// Generated content had nothing renderable in it
    #[display("Nothing to render")]
    EmptyContent,
    /// Renderer failed
    #[display("Render failed: {}", _0)]
    Failed(String),
    /// Deadline elapsed while rendering
    #[display("Render timed out")]
    Timeout,
    /// The request was abandoned by the caller
    #[display("Render cancelled")]
    Cancelled,
}

/// Render error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Render Error: {} at line {} in {}", kind, line, file)]
pub struct RenderError {
    /// The specific error kind
    pub kind: RenderErrorKind,
    /// Line number where error occurred
    pub line: u32,
    /// File where error occurred
    pub file: &'static str,
}

impl RenderError {
    /// Create a new render error with location tracking.
    #[track_caller]
    pub fn new(kind: RenderErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
