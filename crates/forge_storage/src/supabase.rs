//! Supabase Storage artifact store.

use crate::store::{ArtifactStore, validate_name};
use forge_core::{Artifact, ArtifactLocation};
use forge_error::{StorageError, StorageErrorKind};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Uploads artifacts to a Supabase Storage bucket and returns the public URL.
#[derive(Clone)]
pub struct SupabaseArtifactStore {
    client: Client,
    project_url: String,
    service_key: String,
    bucket: String,
}

impl std::fmt::Debug for SupabaseArtifactStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseArtifactStore")
            .field("project_url", &self.project_url)
            .field("bucket", &self.bucket)
            .finish_non_exhaustive()
    }
}

impl SupabaseArtifactStore {
    /// Creates a store for `bucket` in the project at `project_url`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` when the URL or key is blank or the HTTP client
    /// cannot be built.
    pub fn new(
        project_url: impl Into<String>,
        service_key: impl Into<String>,
        bucket: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, StorageError> {
        let project_url = project_url.into().trim_end_matches('/').to_string();
        let service_key = service_key.into();
        let bucket = bucket.into();
        if project_url.is_empty() || service_key.trim().is_empty() || bucket.is_empty() {
            return Err(StorageError::new(StorageErrorKind::InvalidConfig(
                "Supabase URL, service key and bucket are required".to_string(),
            )));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StorageError::new(StorageErrorKind::InvalidConfig(e.to_string())))?;
        Ok(Self {
            client,
            project_url,
            service_key,
            bucket,
        })
    }

    /// Public URL of an object in the bucket.
    pub fn public_url(&self, name: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.project_url, self.bucket, name
        )
    }
}

#[async_trait::async_trait]
impl ArtifactStore for SupabaseArtifactStore {
    #[instrument(skip(self, artifact), fields(bucket = %self.bucket, name = %artifact.file_name(), size = artifact.len()))]
    async fn put(&self, artifact: &Artifact) -> Result<ArtifactLocation, StorageError> {
        validate_name(artifact.file_name())?;
        let url = format!(
            "{}/storage/v1/object/{}/{}",
            self.project_url,
            self.bucket,
            artifact.file_name()
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
            .header(reqwest::header::CONTENT_TYPE, artifact.content_type().as_str())
            .body(artifact.bytes().clone())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    StorageError::new(StorageErrorKind::Timeout)
                } else {
                    StorageError::new(StorageErrorKind::Transport(e.to_string()))
                }
            })?;

        let status = response.status().as_u16();
        if status != 200 && status != 201 {
            warn!(status, "Upload rejected");
            return Err(StorageError::new(StorageErrorKind::Rejected(status)));
        }

        debug!(status, "Upload accepted");
        Ok(ArtifactLocation::new(self.public_url(artifact.file_name())))
    }

    fn backend_name(&self) -> &'static str {
        "supabase"
    }
}
