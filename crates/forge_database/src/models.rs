//! Diesel row types for the `generations` table.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use forge_core::{
    AccountId, ArtifactLocation, GenerationMode, GenerationRecord, NewGenerationRecord,
    RecordStatus,
};
use forge_error::{DatabaseError, DatabaseErrorKind};
use uuid::Uuid;

/// Database row for the generations table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = crate::schema::generations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct GenerationRow {
    pub id: i64,
    pub user_id: Uuid,
    pub prompt: String,
    pub mode: String,
    pub file_path: Option<String>,
    pub status: String,
    pub created_at: NaiveDateTime,
}

/// Insertable generation row. `id` and `created_at` come from the database.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::generations)]
pub struct NewGenerationRow {
    pub user_id: Uuid,
    pub prompt: String,
    pub mode: String,
    pub file_path: Option<String>,
    pub status: String,
}

impl From<&NewGenerationRecord> for NewGenerationRow {
    fn from(record: &NewGenerationRecord) -> Self {
        Self {
            user_id: *record.account_id.as_uuid(),
            prompt: record.prompt.clone(),
            mode: record.mode.to_string(),
            file_path: record
                .artifact_location
                .as_ref()
                .map(|location| location.as_str().to_string()),
            status: record.status.to_string(),
        }
    }
}

impl TryFrom<GenerationRow> for GenerationRecord {
    type Error = DatabaseError;

    fn try_from(row: GenerationRow) -> Result<Self, Self::Error> {
        let mode: GenerationMode = row.mode.parse().map_err(|_| {
            DatabaseError::new(DatabaseErrorKind::Query(format!(
                "unknown generation mode '{}'",
                row.mode
            )))
        })?;
        let status: RecordStatus = row.status.parse().map_err(|_| {
            DatabaseError::new(DatabaseErrorKind::Query(format!(
                "unknown generation status '{}'",
                row.status
            )))
        })?;

        let new = NewGenerationRecord {
            account_id: AccountId::new(row.user_id),
            prompt: row.prompt,
            mode,
            artifact_location: row.file_path.map(ArtifactLocation::new),
            status,
        };
        Ok(GenerationRecord::from_parts(row.id, new, row.created_at))
    }
}
