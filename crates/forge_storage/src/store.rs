//! Artifact store contract.

use async_trait::async_trait;
use forge_core::{Artifact, ArtifactLocation};
use forge_error::{StorageError, StorageErrorKind};

/// Durable home for rendered artifacts.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Stores the artifact under its file name and returns where it can be fetched.
    async fn put(&self, artifact: &Artifact) -> Result<ArtifactLocation, StorageError>;

    /// Backend name for logs.
    fn backend_name(&self) -> &'static str;
}

/// Rejects names that could escape the bucket or directory.
pub(crate) fn validate_name(name: &str) -> Result<(), StorageError> {
    let bad = name.is_empty()
        || name.contains(['/', '\\'])
        || name.contains("..")
        || name.chars().any(char::is_control);
    if bad {
        return Err(StorageError::new(StorageErrorKind::InvalidName(
            name.to_string(),
        )));
    }
    Ok(())
}
