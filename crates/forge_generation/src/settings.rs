//! Per-run limits.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Knobs that shape every saga run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_builder::Builder)]
#[builder(default)]
pub struct SagaSettings {
    /// End-to-end deadline covering provider, render and upload
    deadline: Duration,
    /// Read the balance before the provider call and stop early when short
    preflight_check: bool,
    /// Time allowed for writing the audit record
    record_timeout: Duration,
}

impl Default for SagaSettings {
    fn default() -> Self {
        Self {
            deadline: Duration::from_secs(110),
            preflight_check: true,
            record_timeout: Duration::from_secs(5),
        }
    }
}

impl SagaSettings {
    /// Creates a new builder.
    pub fn builder() -> SagaSettingsBuilder {
        SagaSettingsBuilder::default()
    }
}
