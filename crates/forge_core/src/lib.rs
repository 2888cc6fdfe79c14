//! Core data types for Lesson Forge.
//!
//! This crate holds the vocabulary shared by every other forge crate: who is
//! paying ([`AccountId`]), what they asked for ([`GenerationRequest`]), what it
//! costs ([`CostQuote`]), what they received ([`Artifact`], [`ArtifactLocation`])
//! and the audit trail left behind ([`GenerationRecord`]).
//!
//! Nothing here performs I/O.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod account;
mod artifact;
mod pricing;
mod prompt;
mod record;
mod request;

pub use account::{AccountId, Credits};
pub use artifact::{Artifact, ArtifactLocation};
pub use pricing::{CostQuote, Pricing, PricingBuilder};
pub use prompt::compose_prompt;
pub use record::{GenerationRecord, NewGenerationRecord, RecordStatus};
pub use request::{GenerationMode, GenerationRequest, MAX_PROMPT_CHARS};
