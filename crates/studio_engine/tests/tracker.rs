mod support;

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use pretty_assertions::assert_eq;
use studio_engine::{
    poll_job, status_text, ArtifactStore, BackendError, ImageInput, Job, JobError, JobEvent,
    JobHandle, JobSnapshot, Materializer, MemoryArtifactStore, Phase, PollSettings, Status,
    StatusSlot, Submitter, VideoJobTracker,
};
use tokio_util::sync::CancellationToken;

use support::{init_logging, ScriptedBackend, VIDEO_BYTES, VIDEO_URI};

fn tracker(backend: Arc<ScriptedBackend>, store: Arc<MemoryArtifactStore>) -> VideoJobTracker {
    VideoJobTracker::new(backend, store, "veo-test", PollSettings::default())
}

async fn collect_events(
    backend: Arc<ScriptedBackend>,
    store: Arc<dyn ArtifactStore>,
) -> Vec<JobEvent> {
    let materializer = Materializer::new(backend.clone(), store);
    poll_job(
        backend,
        materializer,
        Job::new(JobHandle::new("operations/test-1")),
        PollSettings::default(),
        CancellationToken::new(),
    )
    .collect()
    .await
}

fn progress_values(events: &[JobEvent]) -> Vec<u8> {
    events
        .iter()
        .filter_map(|event| event.status().progress)
        .collect()
}

#[tokio::test(start_paused = true)]
async fn done_after_two_pending_checks_materializes_video() {
    init_logging();
    let backend = Arc::new(ScriptedBackend::finishing_after(2));
    let store = Arc::new(MemoryArtifactStore::new());
    let start = tokio::time::Instant::now();

    let events = collect_events(backend.clone(), store.clone()).await;

    assert_eq!(progress_values(&events), vec![0, 25, 35, 45, 55, 95, 100]);
    assert_eq!(backend.checks(), 3);
    assert_eq!(backend.downloads(), vec![VIDEO_URI.to_string()]);
    assert!(start.elapsed() >= Duration::from_secs(30));
    assert!(start.elapsed() < Duration::from_secs(31));

    let terminal: Vec<_> = events.iter().filter(|e| e.is_terminal()).collect();
    assert_eq!(terminal.len(), 1);
    let Some(JobEvent::Completed { status, artifact }) = events.last() else {
        panic!("expected completion, got {:?}", events.last());
    };
    assert_eq!(status.phase, Phase::Done);
    assert_eq!(status.message, status_text::SUCCESS);
    assert_eq!(status.artifact.as_ref(), Some(artifact));
    assert_eq!(&store.get(artifact).unwrap()[..], VIDEO_BYTES);
}

#[tokio::test(start_paused = true)]
async fn progress_never_decreases_and_ends_at_100() {
    init_logging();
    for pending in [0, 1, 5, 12] {
        let backend = Arc::new(ScriptedBackend::finishing_after(pending));
        let events = collect_events(backend.clone(), Arc::new(MemoryArtifactStore::new())).await;

        let values = progress_values(&events);
        assert!(
            values.windows(2).all(|pair| pair[0] <= pair[1]),
            "progress went backwards: {values:?}"
        );
        assert!(values.iter().all(|&p| p <= 100));
        assert_eq!(values.last(), Some(&100));
        assert!(values[..values.len() - 1].iter().all(|&p| p < 100));
        assert_eq!(backend.checks(), pending + 1);
    }
}

#[tokio::test(start_paused = true)]
async fn intermediate_progress_is_capped_at_ceiling() {
    init_logging();
    let backend = Arc::new(ScriptedBackend::finishing_after(10));
    let events = collect_events(backend, Arc::new(MemoryArtifactStore::new())).await;

    let generating: Vec<u8> = events
        .iter()
        .map(JobEvent::status)
        .filter(|s| s.message == status_text::GENERATING)
        .filter_map(|s| s.progress)
        .collect();
    assert_eq!(generating.len(), 11);
    assert_eq!(*generating.iter().max().unwrap(), 90);
}

#[tokio::test(start_paused = true)]
async fn run_publishes_terminal_status_and_returns_artifact() {
    init_logging();
    let backend = Arc::new(ScriptedBackend::finishing_after(2));
    let store = Arc::new(MemoryArtifactStore::new());
    let slot = StatusSlot::new();
    let mut observer = slot.subscribe();

    let artifact = tracker(backend.clone(), store.clone())
        .run("a cat", None, &slot, CancellationToken::new())
        .await
        .expect("video job succeeds");

    let latest = slot.latest().unwrap();
    assert_eq!(latest, Status::done(status_text::SUCCESS, artifact.clone()));
    assert!(observer.has_changed().unwrap());
    assert_eq!(observer.borrow_and_update().as_ref(), Some(&latest));
    assert!(artifact.as_str().starts_with("blob:"));

    let submitted = backend.submitted();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].model, "veo-test");
    assert_eq!(submitted[0].prompt, "a cat");
    assert_eq!(submitted[0].image, None);
    assert_eq!(submitted[0].video_count, 1);
}

#[tokio::test(start_paused = true)]
async fn started_job_reports_starting_before_accepted() {
    init_logging();
    let backend = Arc::new(ScriptedBackend::finishing_after(1));

    let events: Vec<JobEvent> = tracker(backend.clone(), Arc::new(MemoryArtifactStore::new()))
        .start("a cat", None, CancellationToken::new())
        .await
        .expect("submission accepted")
        .collect()
        .await;

    let statuses: Vec<(&str, Option<u8>)> = events
        .iter()
        .map(JobEvent::status)
        .map(|s| (s.message.as_str(), s.progress))
        .collect();
    assert_eq!(
        statuses,
        vec![
            (status_text::STARTING, Some(0)),
            (status_text::ACCEPTED, Some(25)),
            (status_text::GENERATING, Some(35)),
            (status_text::GENERATING, Some(45)),
            (status_text::FINISHING, Some(95)),
            (status_text::SUCCESS, Some(100)),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn failed_submission_yields_no_stream() {
    init_logging();
    let backend = Arc::new(
        ScriptedBackend::finishing_after(0).failing_submission(BackendError::Timeout(
            "deadline".to_string(),
        )),
    );

    let result = tracker(backend.clone(), Arc::new(MemoryArtifactStore::new()))
        .start("a cat", None, CancellationToken::new())
        .await;

    let Err(err) = result else {
        panic!("submission should fail");
    };
    assert!(matches!(err.cause(), JobError::SubmissionFailed(_)));
    assert_eq!(backend.checks(), 0);
}

#[tokio::test(start_paused = true)]
async fn submission_failure_emits_no_status() {
    init_logging();
    let backend = Arc::new(
        ScriptedBackend::finishing_after(0).failing_submission(BackendError::HttpStatus {
            status: 500,
            reason: "Internal Server Error".to_string(),
        }),
    );
    let slot = StatusSlot::new();

    let err = tracker(backend.clone(), Arc::new(MemoryArtifactStore::new()))
        .run("a cat", None, &slot, CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, JobError::GenerationFailed(_)));
    assert!(matches!(err.cause(), JobError::SubmissionFailed(_)));
    assert_eq!(slot.latest(), None);
    assert_eq!(backend.checks(), 0);
}

#[tokio::test(start_paused = true)]
async fn empty_request_is_rejected_before_any_call() {
    init_logging();
    let backend = Arc::new(ScriptedBackend::finishing_after(0));
    let slot = StatusSlot::new();

    let err = tracker(backend.clone(), Arc::new(MemoryArtifactStore::new()))
        .run("   ", None, &slot, CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err.cause(), JobError::InvalidRequest(_)));
    assert!(backend.submitted().is_empty());
    assert_eq!(slot.latest(), None);
}

#[tokio::test(start_paused = true)]
async fn image_only_request_is_submitted_with_mime_type() {
    init_logging();
    let backend = Arc::new(ScriptedBackend::finishing_after(0));
    let image = ImageInput {
        bytes: vec![1, 2, 3],
        mime_type: "image/jpeg".to_string(),
    };

    tracker(backend.clone(), Arc::new(MemoryArtifactStore::new()))
        .run("", Some(image.clone()), &StatusSlot::new(), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(backend.submitted()[0].image, Some(image));
}

#[tokio::test(start_paused = true)]
async fn poll_failure_ends_job_without_retry() {
    init_logging();
    let backend = Arc::new(ScriptedBackend::with_script(vec![
        Ok(JobSnapshot::pending()),
        Err(BackendError::Network("connection reset".to_string())),
        Ok(JobSnapshot::finished(VIDEO_URI)),
    ]));
    let slot = StatusSlot::new();

    let err = tracker(backend.clone(), Arc::new(MemoryArtifactStore::new()))
        .run("a cat", None, &slot, CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err.cause(), JobError::PollFailed(_)));
    assert_eq!(backend.checks(), 2);
    assert!(backend.downloads().is_empty());
    let latest = slot.latest().unwrap();
    assert_eq!(latest.phase, Phase::Error);
    assert!(latest.message.contains("connection reset"));
}

#[tokio::test(start_paused = true)]
async fn missing_artifact_link_fails_job() {
    init_logging();
    let backend = Arc::new(ScriptedBackend::with_script(vec![Ok(JobSnapshot {
        done: true,
        result: None,
    })]));
    let slot = StatusSlot::new();

    let err = tracker(backend.clone(), Arc::new(MemoryArtifactStore::new()))
        .run("a cat", None, &slot, CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err.cause(), &JobError::MissingArtifact);
    assert_eq!(slot.latest().unwrap().phase, Phase::Error);
}

#[tokio::test(start_paused = true)]
async fn download_failure_embeds_status_text() {
    init_logging();
    let backend = Arc::new(ScriptedBackend::finishing_after(1).failing_download(
        BackendError::HttpStatus {
            status: 403,
            reason: "Forbidden".to_string(),
        },
    ));
    let slot = StatusSlot::new();

    let err = tracker(backend.clone(), Arc::new(MemoryArtifactStore::new()))
        .run("a cat", None, &slot, CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err.cause(), &JobError::DownloadFailed("Forbidden".to_string()));
    let latest = slot.latest().unwrap();
    assert_eq!(latest.phase, Phase::Error);
    assert!(latest.message.contains("Forbidden"));
    assert_eq!(latest.progress, None);
}

#[tokio::test(start_paused = true)]
async fn cancellation_stops_status_checks() {
    init_logging();
    let backend = Arc::new(ScriptedBackend::with_script(Vec::new()));
    let slot = StatusSlot::new();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = tracker(backend.clone(), Arc::new(MemoryArtifactStore::new()))
        .run("a cat", None, &slot, cancel)
        .await
        .unwrap_err();

    assert_eq!(err.cause(), &JobError::Cancelled);
    assert_eq!(backend.checks(), 0);
    assert_eq!(slot.latest().unwrap().phase, Phase::Cancelled);
}

#[tokio::test(start_paused = true)]
async fn cancellation_mid_poll_settles_as_cancelled() {
    init_logging();
    let backend = Arc::new(ScriptedBackend::with_script(Vec::new()));
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(35)).await;
        trigger.cancel();
    });

    let events: Vec<JobEvent> = poll_job(
        backend.clone(),
        Materializer::new(backend.clone(), Arc::new(MemoryArtifactStore::new())),
        Job::new(JobHandle::new("operations/test-1")),
        PollSettings::default(),
        cancel,
    )
    .collect()
    .await;

    assert_eq!(backend.checks(), 3);
    let Some(JobEvent::Failed { status, error }) = events.last() else {
        panic!("expected failure, got {:?}", events.last());
    };
    assert_eq!(error, &JobError::Cancelled);
    assert_eq!(status.phase, Phase::Cancelled);
}

#[test]
fn submitter_rejects_empty_file() {
    let submitter = Submitter::new("veo-test");
    let err = submitter
        .build_request(
            "prompt",
            Some(ImageInput {
                bytes: Vec::new(),
                mime_type: "image/png".to_string(),
            }),
        )
        .unwrap_err();
    assert!(matches!(err, JobError::InvalidRequest(_)));
}
