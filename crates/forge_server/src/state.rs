//! Shared handler state.

use crate::IdentityVerifier;
use derive_getters::Getters;
use forge_database::{CreditLedger, GenerationRecordStore};
use forge_generation::GenerationSaga;
use forge_rate_limit::Admission;
use std::sync::Arc;

/// Header read for the provider routing key unless configured otherwise.
pub const DEFAULT_ROUTING_HEADER: &str = "x-vercel-ip-country";

/// Everything a request handler needs. Cheap to clone.
#[derive(Clone, Getters, derive_builder::Builder)]
#[builder(pattern = "owned")]
pub struct AppState {
    /// Generation coordinator
    saga: Arc<GenerationSaga>,
    /// Balance reads for `/user/credits`
    ledger: Arc<dyn CreditLedger>,
    /// History reads for `/user/generations`
    records: Arc<dyn GenerationRecordStore>,
    /// Bearer credential check
    verifier: Arc<dyn IdentityVerifier>,
    /// Per-client admission
    limiter: Arc<dyn Admission>,
    /// Header carrying the routing key
    #[builder(default = "DEFAULT_ROUTING_HEADER.to_string()", setter(into))]
    routing_header: String,
}

impl AppState {
    /// Creates a new builder.
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::default()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("saga", &self.saga)
            .field("routing_header", &self.routing_header)
            .finish_non_exhaustive()
    }
}
