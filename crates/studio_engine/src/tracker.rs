use std::sync::Arc;

use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use studio_logging::studio_warn;
use tokio_util::sync::CancellationToken;

use crate::{
    poll_job, ArtifactRef, ArtifactStore, GenerationBackend, ImageInput, JobError, JobEvent,
    Materializer, PollSettings, StatusSlot, Submitter,
};

/// Orchestrates one video job: submit, poll, materialize.
///
/// Every failure surfaces as `JobError::GenerationFailed` wrapping the
/// stage error. Once a job exists, failures also publish a terminal status.
#[derive(Clone)]
pub struct VideoJobTracker {
    backend: Arc<dyn GenerationBackend>,
    submitter: Submitter,
    materializer: Materializer,
    settings: PollSettings,
}

impl VideoJobTracker {
    pub fn new(
        backend: Arc<dyn GenerationBackend>,
        store: Arc<dyn ArtifactStore>,
        video_model: impl Into<String>,
        settings: PollSettings,
    ) -> Self {
        Self {
            materializer: Materializer::new(backend.clone(), store),
            submitter: Submitter::new(video_model),
            backend,
            settings,
        }
    }

    pub fn settings(&self) -> &PollSettings {
        &self.settings
    }

    /// Submits the job and returns its event stream.
    ///
    /// Validation and submission errors are returned before any event
    /// exists. The stream starts with the starting status at progress 0 and
    /// ends with exactly one terminal event.
    pub async fn start(
        &self,
        prompt: &str,
        image: Option<ImageInput>,
        cancel: CancellationToken,
    ) -> Result<BoxStream<'static, JobEvent>, JobError> {
        let job = self
            .submitter
            .submit(self.backend.as_ref(), prompt, image)
            .await
            .map_err(JobError::generation_failed)?;

        Ok(poll_job(
            self.backend.clone(),
            self.materializer.clone(),
            job,
            self.settings.clone(),
            cancel,
        ))
    }

    /// Runs the job to completion, publishing every status into `slot`.
    pub async fn run(
        &self,
        prompt: &str,
        image: Option<ImageInput>,
        slot: &StatusSlot,
        cancel: CancellationToken,
    ) -> Result<ArtifactRef, JobError> {
        let mut events = self.start(prompt, image, cancel).await?;
        while let Some(event) = events.next().await {
            slot.publish(event.status().clone());
            if let Some(result) = settle(event) {
                return result;
            }
        }

        studio_warn!("Job stream ended without a terminal event");
        Err(JobError::generation_failed(JobError::NotFinished))
    }
}

/// The job's outcome for a terminal event, `None` for progress.
pub(crate) fn settle(event: JobEvent) -> Option<Result<ArtifactRef, JobError>> {
    match event {
        JobEvent::Progress(_) => None,
        JobEvent::Completed { artifact, .. } => Some(Ok(artifact)),
        JobEvent::Failed { error, .. } => Some(Err(JobError::generation_failed(error))),
    }
}
