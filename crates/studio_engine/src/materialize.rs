use std::sync::Arc;

use studio_logging::{studio_info, studio_warn};

use crate::{ArtifactRef, ArtifactStore, BackendError, GenerationBackend, Job, JobError};

/// Resolves a finished job into a local artifact.
#[derive(Clone)]
pub struct Materializer {
    backend: Arc<dyn GenerationBackend>,
    store: Arc<dyn ArtifactStore>,
}

impl Materializer {
    pub fn new(backend: Arc<dyn GenerationBackend>, store: Arc<dyn ArtifactStore>) -> Self {
        Self { backend, store }
    }

    pub async fn materialize(&self, job: &Job) -> Result<ArtifactRef, JobError> {
        if !job.is_done() {
            return Err(JobError::NotFinished);
        }
        let uri = job.artifact_uri().ok_or(JobError::MissingArtifact)?;

        let bytes = self.backend.download(uri).await.map_err(|err| {
            studio_warn!("Artifact download for {} failed: {}", job.handle(), err);
            match err {
                BackendError::HttpStatus { reason, .. } => JobError::DownloadFailed(reason),
                other => JobError::DownloadFailed(other.to_string()),
            }
        })?;

        let size = bytes.len();
        let artifact = self
            .store
            .store(bytes)
            .map_err(|err| JobError::StoreFailed(err.to_string()))?;
        studio_info!("Materialized {} ({} bytes) as {}", job.handle(), size, artifact);
        Ok(artifact)
    }
}
