//! Studio engine: generation backends, the long-running job tracker and
//! effect execution.
mod artifact;
mod backend;
mod engine;
mod error;
mod estimator;
mod gemini;
mod materialize;
mod poller;
mod status;
mod submit;
mod tracker;
mod types;

pub use artifact::{
    ensure_output_dir, ArtifactStore, DirectoryArtifactStore, MemoryArtifactStore, PersistError,
};
pub use backend::{
    BackendSettings, GenerationBackend, DEFAULT_BASE_URL, DEFAULT_TEXT_MODEL, DEFAULT_VIDEO_MODEL,
};
pub use engine::{EngineEvent, EngineHandle, EngineRequest, Outcome};
pub use error::{BackendError, JobError};
pub use estimator::{status_text, PollSettings, ProgressEstimator};
pub use gemini::GeminiBackend;
pub use materialize::Materializer;
pub use poller::{poll_job, JobEvent};
pub use status::StatusSlot;
pub use submit::Submitter;
pub use tracker::VideoJobTracker;
pub use types::{
    ArtifactRef, ImageInput, Job, JobHandle, JobResult, JobSnapshot, Phase, RequestId, Status,
    VideoRequest,
};
