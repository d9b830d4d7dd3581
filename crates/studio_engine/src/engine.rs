use std::collections::HashMap;
use std::io;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use futures_util::StreamExt;
use studio_logging::{studio_debug, studio_info, studio_warn};
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

use crate::tracker::settle;
use crate::{
    ArtifactRef, GenerationBackend, ImageInput, JobError, JobEvent, RequestId, Status,
    VideoJobTracker,
};

/// Work the engine accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineRequest {
    Text {
        prompt: String,
    },
    DescribeImage {
        prompt: String,
        image: ImageInput,
    },
    Video {
        prompt: String,
        image: Option<ImageInput>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Text(String),
    Video(ArtifactRef),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Intermediate status of a running video job.
    Status { request_id: RequestId, status: Status },
    Completed {
        request_id: RequestId,
        result: Result<Outcome, JobError>,
    },
}

enum EngineCommand {
    Submit {
        request_id: RequestId,
        request: EngineRequest,
    },
}

type CancelMap = Arc<Mutex<HashMap<RequestId, CancellationToken>>>;

/// Runs requests on a background tokio runtime.
///
/// Each request becomes its own task; events come back tagged with the
/// request id they were submitted under.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>,
    cancels: CancelMap,
}

impl EngineHandle {
    pub fn new(backend: Arc<dyn GenerationBackend>, tracker: VideoJobTracker) -> io::Result<Self> {
        let runtime = Runtime::new()?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let cancels: CancelMap = Arc::default();

        let worker_cancels = cancels.clone();
        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                let EngineCommand::Submit {
                    request_id,
                    request,
                } = command;
                let cancel = CancellationToken::new();
                lock(&worker_cancels).insert(request_id, cancel.clone());

                let backend = backend.clone();
                let tracker = tracker.clone();
                let event_tx = event_tx.clone();
                let cancels = worker_cancels.clone();
                runtime.spawn(async move {
                    let result =
                        execute(backend.as_ref(), &tracker, request_id, request, &event_tx, cancel)
                            .await;
                    lock(&cancels).remove(&request_id);
                    let _ = event_tx.send(EngineEvent::Completed { request_id, result });
                });
            }
            studio_debug!("Engine command channel closed");
        });

        Ok(Self {
            cmd_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
            cancels,
        })
    }

    pub fn submit(&self, request_id: RequestId, request: EngineRequest) {
        let _ = self.cmd_tx.send(EngineCommand::Submit {
            request_id,
            request,
        });
    }

    /// Stops polling for `request_id`; the job settles as cancelled.
    pub fn cancel(&self, request_id: RequestId) -> bool {
        match lock(&self.cancels).get(&request_id) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&self) {
        for token in lock(&self.cancels).values() {
            token.cancel();
        }
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        lock(&self.event_rx).try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        lock(&self.event_rx).recv_timeout(timeout).ok()
    }
}

async fn execute(
    backend: &dyn GenerationBackend,
    tracker: &VideoJobTracker,
    request_id: RequestId,
    request: EngineRequest,
    event_tx: &mpsc::Sender<EngineEvent>,
    cancel: CancellationToken,
) -> Result<Outcome, JobError> {
    match request {
        EngineRequest::Text { prompt } => {
            studio_info!("Request {} text prompt_len={}", request_id, prompt.len());
            backend
                .generate_text(&prompt)
                .await
                .map(Outcome::Text)
                .map_err(|err| JobError::generation_failed(JobError::RequestFailed(err)))
        }
        EngineRequest::DescribeImage { prompt, image } => {
            studio_info!(
                "Request {} describe image mime={} bytes={}",
                request_id,
                image.mime_type,
                image.bytes.len()
            );
            backend
                .describe_image(&prompt, &image)
                .await
                .map(Outcome::Text)
                .map_err(|err| JobError::generation_failed(JobError::RequestFailed(err)))
        }
        EngineRequest::Video { prompt, image } => {
            let result = run_video(tracker, request_id, &prompt, image, event_tx, cancel).await;
            if let Err(err) = &result {
                studio_warn!("Request {} failed: {}", request_id, err);
            }
            result.map(Outcome::Video)
        }
    }
}

/// Forwards every intermediate status of one video job, in order.
async fn run_video(
    tracker: &VideoJobTracker,
    request_id: RequestId,
    prompt: &str,
    image: Option<ImageInput>,
    event_tx: &mpsc::Sender<EngineEvent>,
    cancel: CancellationToken,
) -> Result<ArtifactRef, JobError> {
    let mut events = tracker.start(prompt, image, cancel).await?;
    while let Some(event) = events.next().await {
        match event {
            JobEvent::Progress(status) => {
                let _ = event_tx.send(EngineEvent::Status { request_id, status });
            }
            terminal => {
                if let Some(result) = settle(terminal) {
                    return result;
                }
            }
        }
    }
    Err(JobError::generation_failed(JobError::NotFinished))
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
