//! Rendered documents and where they end up.

use crate::GenerationMode;
use serde::{Deserialize, Serialize};

/// A rendered document ready for upload.
#[derive(Debug, Clone, PartialEq, Eq, derive_getters::Getters)]
pub struct Artifact {
    bytes: Vec<u8>,
    file_name: String,
    content_type: String,
}

impl Artifact {
    /// Creates an artifact.
    pub fn new(bytes: Vec<u8>, file_name: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            bytes,
            file_name: file_name.into(),
            content_type: content_type.into(),
        }
    }

    /// Unique object name for a freshly rendered document.
    ///
    /// Names are `<unix-seconds>_<mode>_<uuid>.<extension>` so concurrent uploads
    /// for the same account never overwrite one another.
    pub fn unique_name(mode: GenerationMode, extension: &str) -> String {
        format!(
            "{}_{}_{}.{}",
            chrono::Utc::now().timestamp(),
            mode,
            uuid::Uuid::new_v4().simple(),
            extension
        )
    }

    /// Size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the document is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Public location of a stored artifact.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display, derive_more::From,
)]
#[serde(transparent)]
pub struct ArtifactLocation(String);

impl ArtifactLocation {
    /// Wraps a location string.
    pub fn new(location: impl Into<String>) -> Self {
        Self(location.into())
    }

    /// The location as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
