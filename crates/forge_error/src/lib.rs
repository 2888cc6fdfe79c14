//! Error types for Lesson Forge.
//!
//! This crate provides the foundation error types used throughout the forge workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All constructors use `#[track_caller]` for automatic location capture
//!
//! The saga's terminal failures live in [`GenerationErrorKind`]; everything the
//! HTTP layer can see funnels into [`ForgeError`].
//!
//! # Examples
//!
//! ```
//! use forge_error::{ForgeResult, LedgerError, LedgerErrorKind};
//!
//! fn read_balance() -> ForgeResult<i64> {
//!     Err(LedgerError::new(LedgerErrorKind::Unavailable("pool exhausted".into())))?
//! }
//!
//! assert!(read_balance().is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod auth;
mod config;
mod database;
mod error;
mod generation;
mod ledger;
mod provider;
mod rate_limit;
mod render;
mod storage;

pub use auth::{AuthError, AuthErrorKind};
pub use config::ConfigError;
pub use database::{DatabaseError, DatabaseErrorKind};
pub use error::{ForgeError, ForgeErrorKind, ForgeResult};
pub use generation::{GenerationError, GenerationErrorKind};
pub use ledger::{LedgerError, LedgerErrorKind, LedgerResult};
pub use provider::{ProviderError, ProviderErrorKind};
pub use rate_limit::{RateLimitError, RateLimitErrorKind};
pub use render::{RenderError, RenderErrorKind};
pub use storage::{StorageError, StorageErrorKind};
