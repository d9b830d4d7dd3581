use std::fmt;
use std::time::Duration;

use bytes::Bytes;

use crate::{BackendError, ImageInput, JobHandle, JobSnapshot, VideoRequest};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_VIDEO_MODEL: &str = "veo-2.0-generate-001";

#[derive(Clone)]
pub struct BackendSettings {
    pub base_url: String,
    pub api_key: String,
    pub text_model: String,
    pub video_model: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// Downloads larger than this are rejected.
    pub max_download_bytes: u64,
}

impl BackendSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            video_model: DEFAULT_VIDEO_MODEL.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(120),
            max_download_bytes: 512 * 1024 * 1024,
        }
    }
}

// The key must never reach the logs.
impl fmt::Debug for BackendSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("text_model", &self.text_model)
            .field("video_model", &self.video_model)
            .field("connect_timeout", &self.connect_timeout)
            .field("request_timeout", &self.request_timeout)
            .field("max_download_bytes", &self.max_download_bytes)
            .finish()
    }
}

/// Remote generation service.
///
/// The credential is owned by the implementation and attached to every
/// call, including artifact downloads.
#[async_trait::async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate_text(&self, prompt: &str) -> Result<String, BackendError>;

    async fn describe_image(&self, prompt: &str, image: &ImageInput)
        -> Result<String, BackendError>;

    async fn submit_video(&self, request: &VideoRequest) -> Result<JobHandle, BackendError>;

    async fn check_status(&self, handle: &JobHandle) -> Result<JobSnapshot, BackendError>;

    async fn download(&self, artifact_uri: &str) -> Result<Bytes, BackendError>;
}
