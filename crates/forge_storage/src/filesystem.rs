//! Local directory artifact store.

use crate::store::{ArtifactStore, validate_name};
use forge_core::{Artifact, ArtifactLocation};
use forge_error::{StorageError, StorageErrorKind};
use std::path::{Path, PathBuf};

/// Writes artifacts into a directory.
///
/// Locations are `{public_base}/{file_name}` when a public base URL is set
/// (for a directory served by a static file server), otherwise the absolute
/// file path.
#[derive(Debug, Clone)]
pub struct FilesystemArtifactStore {
    root: PathBuf,
    public_base: Option<String>,
}

impl FilesystemArtifactStore {
    /// Create a store rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created.
    #[tracing::instrument(skip(root))]
    pub fn new(root: impl Into<PathBuf>, public_base: Option<String>) -> Result<Self, StorageError> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| {
            StorageError::new(StorageErrorKind::Io(format!("{}: {}", root.display(), e)))
        })?;
        tracing::info!(path = %root.display(), "Created filesystem artifact store");
        Ok(Self {
            root,
            public_base: public_base.map(|base| base.trim_end_matches('/').to_string()),
        })
    }
}

#[async_trait::async_trait]
impl ArtifactStore for FilesystemArtifactStore {
    #[tracing::instrument(skip(self, artifact), fields(name = %artifact.file_name(), size = artifact.len()))]
    async fn put(&self, artifact: &Artifact) -> Result<ArtifactLocation, StorageError> {
        validate_name(artifact.file_name())?;
        let path = self.root.join(artifact.file_name());

        // The blocking task finishes even if this future is dropped; the temp
        // file is either renamed into place or removed.
        let bytes = artifact.bytes().clone();
        let target = path.clone();
        tokio::task::spawn_blocking(move || write_then_rename(&bytes, &target))
            .await
            .map_err(|e| {
                StorageError::new(StorageErrorKind::Io(format!("write task failed: {}", e)))
            })??;

        tracing::info!(path = %path.display(), "Stored artifact");

        let location = match &self.public_base {
            Some(base) => format!("{}/{}", base, artifact.file_name()),
            None => path.to_string_lossy().to_string(),
        };
        Ok(ArtifactLocation::new(location))
    }

    fn backend_name(&self) -> &'static str {
        "filesystem"
    }
}

/// A temp file that is deleted on drop unless it was committed.
struct PendingFile {
    path: PathBuf,
    committed: bool,
}

impl Drop for PendingFile {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "Removed temp file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Could not remove temp file")
            }
        }
    }
}

/// Writes to `<name>.tmp` and renames over `path` so readers never see a partial file.
fn write_then_rename(bytes: &[u8], path: &Path) -> Result<(), StorageError> {
    let mut pending = PendingFile {
        path: path.with_extension("tmp"),
        committed: false,
    };
    std::fs::write(&pending.path, bytes).map_err(|e| {
        StorageError::new(StorageErrorKind::Io(format!(
            "{}: {}",
            pending.path.display(),
            e
        )))
    })?;
    std::fs::rename(&pending.path, path).map_err(|e| {
        StorageError::new(StorageErrorKind::Io(format!(
            "rename {} to {}: {}",
            pending.path.display(),
            path.display(),
            e
        )))
    })?;
    pending.committed = true;
    Ok(())
}
