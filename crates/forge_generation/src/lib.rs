//! Metered generation for Lesson Forge.
//!
//! [`GenerationSaga`] turns one [`GenerationRequest`](forge_core::GenerationRequest)
//! into a stored artifact while guaranteeing that the account is debited at
//! most once, and only when the user ends up with something to download.
//!
//! There is no transaction spanning the ledger, the renderer and the artifact
//! store. Instead the saga charges after the provider succeeds and compensates
//! render or upload failures with a single refund of the exact charged amount.
//!
//! | Failing step | Ledger | Terminal |
//! |---|---|---|
//! | provider | untouched | `ProviderFailed` |
//! | charge declined | untouched | `InsufficientCredits` |
//! | render | refunded | `RenderFailed` |
//! | upload | refunded | `StorageFailed` |
//! | refund itself | charged | `RefundFailed` (alert) |
//! | record write | charged, delivered | success, anomaly logged |

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod charge;
mod saga;
mod settings;
mod state;

pub use saga::{GenerationOutcome, GenerationSaga, GenerationSagaBuilder};
pub use settings::{SagaSettings, SagaSettingsBuilder};
pub use state::SagaState;
