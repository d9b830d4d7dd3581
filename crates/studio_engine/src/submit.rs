use studio_logging::{studio_info, studio_warn};

use crate::{GenerationBackend, ImageInput, Job, JobError, VideoRequest};

/// Issues the initial video generation request.
#[derive(Debug, Clone)]
pub struct Submitter {
    model: String,
    video_count: u8,
}

impl Submitter {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            video_count: 1,
        }
    }

    /// Validates the input and submits it; no status exists until this succeeds.
    pub async fn submit(
        &self,
        backend: &dyn GenerationBackend,
        prompt: &str,
        image: Option<ImageInput>,
    ) -> Result<Job, JobError> {
        let request = self.build_request(prompt, image)?;
        studio_info!(
            "Submitting video job model={} prompt_len={} image={}",
            request.model,
            request.prompt.len(),
            request.image.is_some()
        );

        let handle = backend.submit_video(&request).await.map_err(|err| {
            studio_warn!("Video submission failed: {}", err);
            JobError::SubmissionFailed(err)
        })?;

        Ok(Job::new(handle))
    }

    pub fn build_request(
        &self,
        prompt: &str,
        image: Option<ImageInput>,
    ) -> Result<VideoRequest, JobError> {
        let prompt = prompt.trim();
        if let Some(image) = &image {
            if image.bytes.is_empty() {
                return Err(JobError::InvalidRequest("uploaded file is empty".to_string()));
            }
        }
        if prompt.is_empty() && image.is_none() {
            return Err(JobError::InvalidRequest(
                "a prompt or an image is required".to_string(),
            ));
        }
        Ok(VideoRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            image,
            video_count: self.video_count,
        })
    }
}
