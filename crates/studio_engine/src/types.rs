use std::fmt;

/// Caller-chosen id that tags every event of one request.
pub type RequestId = u64;

/// Opaque reference to a remote long-running operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobHandle(String);

impl JobHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobResult {
    pub artifact_uri: Option<String>,
}

/// One answer from the remote status-check operation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobSnapshot {
    pub done: bool,
    pub result: Option<JobResult>,
}

impl JobSnapshot {
    pub fn pending() -> Self {
        Self::default()
    }

    pub fn finished(artifact_uri: impl Into<String>) -> Self {
        Self {
            done: true,
            result: Some(JobResult {
                artifact_uri: Some(artifact_uri.into()),
            }),
        }
    }
}

/// A submitted job as seen by the tracker.
///
/// `done` flips to true at most once and never reverts; `result` is only
/// kept once the job is done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    handle: JobHandle,
    done: bool,
    result: Option<JobResult>,
}

impl Job {
    pub fn new(handle: JobHandle) -> Self {
        Self {
            handle,
            done: false,
            result: None,
        }
    }

    pub fn handle(&self) -> &JobHandle {
        &self.handle
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn result(&self) -> Option<&JobResult> {
        self.result.as_ref()
    }

    pub fn artifact_uri(&self) -> Option<&str> {
        self.result.as_ref()?.artifact_uri.as_deref()
    }

    /// Folds a fresh status snapshot into the job.
    pub fn absorb(&mut self, snapshot: JobSnapshot) {
        if self.done {
            return;
        }
        if snapshot.done {
            self.done = true;
            self.result = snapshot.result;
        }
    }
}

/// Uploaded image carried with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInput {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// Payload of the video submission operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRequest {
    pub model: String,
    pub prompt: String,
    pub image: Option<ImageInput>,
    pub video_count: u8,
}

/// Locally addressable handle to a materialized artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactRef(String);

impl ArtifactRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Processing,
    Done,
    Error,
    Cancelled,
}

/// Externally observable progress snapshot of one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub phase: Phase,
    pub message: String,
    pub progress: Option<u8>,
    pub artifact: Option<ArtifactRef>,
}

impl Status {
    pub fn processing(message: impl Into<String>, progress: u8) -> Self {
        Self {
            phase: Phase::Processing,
            message: message.into(),
            progress: Some(progress.min(100)),
            artifact: None,
        }
    }

    pub fn done(message: impl Into<String>, artifact: ArtifactRef) -> Self {
        Self {
            phase: Phase::Done,
            message: message.into(),
            progress: Some(100),
            artifact: Some(artifact),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            phase: Phase::Error,
            message: message.into(),
            progress: None,
            artifact: None,
        }
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        Self {
            phase: Phase::Cancelled,
            message: message.into(),
            progress: None,
            artifact: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self.phase, Phase::Processing)
    }
}
