#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, Once};

use bytes::Bytes;
use studio_engine::{
    BackendError, GenerationBackend, ImageInput, JobHandle, JobSnapshot, VideoRequest,
};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(studio_logging::initialize_for_tests);
}

pub const VIDEO_URI: &str = "http://x/video";
pub const VIDEO_BYTES: &[u8] = b"\x00\x00\x00\x18ftypmp42";

/// Backend double whose status checks follow a fixed script.
///
/// Once the script runs out, every further check repeats the last answer.
pub struct ScriptedBackend {
    submit_error: Option<BackendError>,
    text_error: Option<BackendError>,
    statuses: Mutex<VecDeque<Result<JobSnapshot, BackendError>>>,
    last: Mutex<Option<Result<JobSnapshot, BackendError>>>,
    download: Result<Bytes, BackendError>,
    submitted: Mutex<Vec<VideoRequest>>,
    checks: AtomicUsize,
    downloads: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    /// Reports `pending` unfinished checks, then done with [`VIDEO_URI`].
    pub fn finishing_after(pending: usize) -> Self {
        let mut script: Vec<_> = (0..pending).map(|_| Ok(JobSnapshot::pending())).collect();
        script.push(Ok(JobSnapshot::finished(VIDEO_URI)));
        Self::with_script(script)
    }

    pub fn with_script(script: Vec<Result<JobSnapshot, BackendError>>) -> Self {
        Self {
            submit_error: None,
            text_error: None,
            statuses: Mutex::new(script.into()),
            last: Mutex::new(None),
            download: Ok(Bytes::from_static(VIDEO_BYTES)),
            submitted: Mutex::new(Vec::new()),
            checks: AtomicUsize::new(0),
            downloads: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_submission(mut self, error: BackendError) -> Self {
        self.submit_error = Some(error);
        self
    }

    /// Text and image description calls fail with `error`.
    pub fn failing_text(mut self, error: BackendError) -> Self {
        self.text_error = Some(error);
        self
    }

    pub fn failing_download(mut self, error: BackendError) -> Self {
        self.download = Err(error);
        self
    }

    pub fn checks(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }

    pub fn submitted(&self) -> Vec<VideoRequest> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn downloads(&self) -> Vec<String> {
        self.downloads.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl GenerationBackend for ScriptedBackend {
    async fn generate_text(&self, prompt: &str) -> Result<String, BackendError> {
        if let Some(err) = &self.text_error {
            return Err(err.clone());
        }
        Ok(format!("echo: {prompt}"))
    }

    async fn describe_image(
        &self,
        prompt: &str,
        image: &ImageInput,
    ) -> Result<String, BackendError> {
        if let Some(err) = &self.text_error {
            return Err(err.clone());
        }
        Ok(format!("{prompt} ({}, {} bytes)", image.mime_type, image.bytes.len()))
    }

    async fn submit_video(&self, request: &VideoRequest) -> Result<JobHandle, BackendError> {
        if let Some(err) = &self.submit_error {
            return Err(err.clone());
        }
        self.submitted.lock().unwrap().push(request.clone());
        Ok(JobHandle::new("operations/test-1"))
    }

    async fn check_status(&self, _handle: &JobHandle) -> Result<JobSnapshot, BackendError> {
        self.checks.fetch_add(1, Ordering::SeqCst);
        let next = self.statuses.lock().unwrap().pop_front();
        let mut last = self.last.lock().unwrap();
        match next {
            Some(answer) => {
                *last = Some(answer.clone());
                answer
            }
            None => last.clone().unwrap_or_else(|| Ok(JobSnapshot::pending())),
        }
    }

    async fn download(&self, artifact_uri: &str) -> Result<Bytes, BackendError> {
        self.downloads.lock().unwrap().push(artifact_uri.to_string());
        self.download.clone()
    }
}
