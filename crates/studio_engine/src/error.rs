use thiserror::Error;

/// Failure of a single collaborator call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("http status {status}: {reason}")]
    HttpStatus { status: u16, reason: String },
    #[error("timeout: {0}")]
    Timeout(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobError {
    /// Rejected before any remote call was made.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("submission failed: {0}")]
    SubmissionFailed(#[source] BackendError),
    /// A single-call text or image description request failed.
    #[error("request failed: {0}")]
    RequestFailed(#[source] BackendError),
    #[error("status check failed: {0}")]
    PollFailed(#[source] BackendError),
    #[error("job is not finished")]
    NotFinished,
    #[error("job result has no artifact link")]
    MissingArtifact,
    #[error("artifact download failed: {0}")]
    DownloadFailed(String),
    #[error("artifact could not be stored: {0}")]
    StoreFailed(String),
    #[error("job cancelled")]
    Cancelled,
    /// Umbrella surfaced to the timeline.
    #[error("generation failed: {0}")]
    GenerationFailed(#[source] Box<JobError>),
}

impl JobError {
    /// Wraps a stage error in `GenerationFailed` unless it already is one.
    pub fn generation_failed(cause: JobError) -> Self {
        match cause {
            JobError::GenerationFailed(_) => cause,
            other => JobError::GenerationFailed(Box::new(other)),
        }
    }

    /// The stage error behind the umbrella, or `self`.
    pub fn cause(&self) -> &JobError {
        match self {
            JobError::GenerationFailed(inner) => inner.cause(),
            other => other,
        }
    }
}
