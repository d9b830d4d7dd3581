use std::sync::Arc;

use futures_util::stream::{self, BoxStream, StreamExt};
use studio_logging::{studio_debug, studio_info, studio_warn};
use tokio_util::sync::CancellationToken;

use crate::estimator::status_text;
use crate::{
    ArtifactRef, GenerationBackend, Job, JobError, JobSnapshot, Materializer, PollSettings,
    ProgressEstimator, Status,
};

/// One step of a tracked job.
///
/// A stream of these ends with exactly one `Completed` or `Failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobEvent {
    Progress(Status),
    Completed { status: Status, artifact: ArtifactRef },
    Failed { status: Status, error: JobError },
}

impl JobEvent {
    pub fn status(&self) -> &Status {
        match self {
            JobEvent::Progress(status)
            | JobEvent::Completed { status, .. }
            | JobEvent::Failed { status, .. } => status,
        }
    }

    pub fn into_status(self) -> Status {
        match self {
            JobEvent::Progress(status)
            | JobEvent::Completed { status, .. }
            | JobEvent::Failed { status, .. } => status,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobEvent::Progress(_))
    }
}

enum PollState {
    Starting(Job),
    Accepted(Job),
    Polling(Job),
    Finishing(Job),
    Materializing(Job),
    Settled,
}

struct Poller {
    backend: Arc<dyn GenerationBackend>,
    materializer: Materializer,
    settings: PollSettings,
    estimator: ProgressEstimator,
    cancel: CancellationToken,
    state: PollState,
}

/// Drives a submitted job to a terminal state.
///
/// The first item is the starting status at progress 0, followed by the
/// accepted status. Lazy: nothing happens until the stream is polled. There is no overall
/// timeout; the stream ends only when the backend reports the job done, a
/// call fails, or `cancel` fires.
pub fn poll_job(
    backend: Arc<dyn GenerationBackend>,
    materializer: Materializer,
    job: Job,
    settings: PollSettings,
    cancel: CancellationToken,
) -> BoxStream<'static, JobEvent> {
    let poller = Poller {
        backend,
        materializer,
        estimator: ProgressEstimator::new(&settings),
        settings,
        cancel,
        state: PollState::Starting(job),
    };
    stream::unfold(poller, Poller::step).boxed()
}

impl Poller {
    async fn step(mut self) -> Option<(JobEvent, Self)> {
        let event = match std::mem::replace(&mut self.state, PollState::Settled) {
            PollState::Settled => return None,
            PollState::Starting(job) => {
                self.state = PollState::Accepted(job);
                JobEvent::Progress(Status::processing(status_text::STARTING, 0))
            }
            PollState::Accepted(job) => {
                let progress = self.estimator.accepted();
                self.state = self.after_check(job);
                JobEvent::Progress(Status::processing(status_text::ACCEPTED, progress))
            }
            PollState::Polling(mut job) => match self.check(&job).await {
                Ok(snapshot) => {
                    job.absorb(snapshot);
                    let progress = self.estimator.advance();
                    studio_debug!(
                        "Polled {} iteration={} done={} progress={}",
                        job.handle(),
                        self.estimator.iterations(),
                        job.is_done(),
                        progress
                    );
                    self.state = self.after_check(job);
                    JobEvent::Progress(Status::processing(status_text::GENERATING, progress))
                }
                Err(error) => failure(error),
            },
            PollState::Finishing(job) => {
                let progress = self.estimator.finishing();
                self.state = PollState::Materializing(job);
                JobEvent::Progress(Status::processing(status_text::FINISHING, progress))
            }
            PollState::Materializing(job) => match self.materializer.materialize(&job).await {
                Ok(artifact) => {
                    studio_info!("Job {} completed", job.handle());
                    JobEvent::Completed {
                        status: Status::done(status_text::SUCCESS, artifact.clone()),
                        artifact,
                    }
                }
                Err(error) => failure(error),
            },
        };
        Some((event, self))
    }

    fn after_check(&self, job: Job) -> PollState {
        if job.is_done() {
            PollState::Finishing(job)
        } else {
            PollState::Polling(job)
        }
    }

    async fn check(&self, job: &Job) -> Result<JobSnapshot, JobError> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                studio_info!("Job {} cancelled while polling", job.handle());
                return Err(JobError::Cancelled);
            }
            _ = tokio::time::sleep(self.settings.interval) => {}
        }
        self.backend
            .check_status(job.handle())
            .await
            .map_err(JobError::PollFailed)
    }
}

fn failure(error: JobError) -> JobEvent {
    let status = match error {
        JobError::Cancelled => Status::cancelled(status_text::CANCELLED),
        ref other => {
            studio_warn!("Job failed: {}", other);
            Status::error(format!("Error: {other}"))
        }
    };
    JobEvent::Failed { status, error }
}
