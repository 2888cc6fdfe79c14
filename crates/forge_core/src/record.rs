//! Generation audit records.

use crate::{AccountId, ArtifactLocation, GenerationMode};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Terminal status of a generation run.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RecordStatus {
    /// Artifact delivered
    Completed,
    /// Run ended without an artifact
    Failed,
}

/// A persisted, append-only history row.
///
/// Audit only; the ledger is the billing source of truth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRecord {
    id: i64,
    account_id: AccountId,
    prompt: String,
    mode: GenerationMode,
    artifact_location: Option<ArtifactLocation>,
    status: RecordStatus,
    created_at: NaiveDateTime,
}

impl GenerationRecord {
    /// Assembles a record read back from storage.
    pub fn from_parts(id: i64, new: NewGenerationRecord, created_at: NaiveDateTime) -> Self {
        Self {
            id,
            account_id: new.account_id,
            prompt: new.prompt,
            mode: new.mode,
            artifact_location: new.artifact_location,
            status: new.status,
            created_at,
        }
    }
}

/// A record about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq, derive_builder::Builder)]
#[builder(setter(into))]
pub struct NewGenerationRecord {
    /// Account that made the request
    pub account_id: AccountId,
    /// Prompt as submitted
    pub prompt: String,
    /// Requested document kind
    pub mode: GenerationMode,
    /// Where the artifact was stored, when it was
    #[builder(default)]
    pub artifact_location: Option<ArtifactLocation>,
    /// Terminal status
    pub status: RecordStatus,
}

impl NewGenerationRecord {
    /// Creates a new record builder.
    pub fn builder() -> NewGenerationRecordBuilder {
        NewGenerationRecordBuilder::default()
    }

    /// Record for a run that delivered an artifact.
    pub fn completed(
        account_id: AccountId,
        prompt: impl Into<String>,
        mode: GenerationMode,
        location: ArtifactLocation,
    ) -> Self {
        Self {
            account_id,
            prompt: prompt.into(),
            mode,
            artifact_location: Some(location),
            status: RecordStatus::Completed,
        }
    }

    /// Record for a run that ended without an artifact.
    pub fn failed(account_id: AccountId, prompt: impl Into<String>, mode: GenerationMode) -> Self {
        Self {
            account_id,
            prompt: prompt.into(),
            mode,
            artifact_location: None,
            status: RecordStatus::Failed,
        }
    }
}
