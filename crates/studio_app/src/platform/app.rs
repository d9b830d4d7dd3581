use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;
use studio_core::{update, AppState, Effect, Msg};
use studio_engine::{
    ArtifactStore, DirectoryArtifactStore, EngineHandle, GeminiBackend, GenerationBackend,
    MemoryArtifactStore, VideoJobTracker,
};
use studio_logging::{studio_info, studio_warn};

use super::cli::Cli;
use super::config::{load_api_key, load_config};
use super::effects::EffectRunner;
use super::render::{changed_lines, render};
use super::upload::read_attachment;

const VIDEO_EXTENSION: &str = "mp4";

pub fn run_app() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    studio_logging::initialize(cli.log.into(), level, &studio_logging::default_log_path());

    let config = load_config(&cli.config);
    let api_key = load_api_key()?;
    let attachment = cli.file.as_deref().map(read_attachment).transpose()?;

    let backend: Arc<dyn GenerationBackend> = Arc::new(
        GeminiBackend::new(config.backend_settings(api_key)).context("building HTTP client")?,
    );
    let store: Arc<dyn ArtifactStore> = match cli.output.clone().or(config.output_dir.clone()) {
        Some(dir) => Arc::new(DirectoryArtifactStore::new(dir, VIDEO_EXTENSION)),
        None => Arc::new(MemoryArtifactStore::new()),
    };
    let tracker = VideoJobTracker::new(
        backend.clone(),
        store,
        config.video_model.clone(),
        config.poll_settings(),
    );
    let engine = EngineHandle::new(backend, tracker).context("starting engine runtime")?;

    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let runner = EffectRunner::new(engine, msg_tx);

    let mut state = AppState::with_routing(config.progress_routing.into());
    let mut pending: Vec<Effect> = Vec::new();
    for prompt in &cli.prompts {
        let (next, effects) = update(
            state,
            Msg::PromptSubmitted {
                prompt: prompt.clone(),
                attachment: attachment.clone(),
                mode: cli.mode.into(),
            },
        );
        state = next;
        pending.extend(effects);
    }
    if cli.prompts.is_empty() {
        if let Some(attachment) = attachment {
            let (next, effects) = update(
                state,
                Msg::PromptSubmitted {
                    prompt: String::new(),
                    attachment: Some(attachment),
                    mode: cli.mode.into(),
                },
            );
            state = next;
            pending.extend(effects);
        }
    }
    studio_info!("Submitting {} request(s)", pending.len());
    runner.enqueue(pending);

    let mut shown = Vec::new();
    let mut deadline = Deadline::new(Instant::now(), cli.max_wait.map(Duration::from_secs));
    state = present(state, &mut shown);
    while state.view().in_flight > 0 {
        if deadline.expired(Instant::now()) {
            studio_warn!("Max wait elapsed, cancelling running jobs");
            runner.cancel_all();
        }
        match msg_rx.recv_timeout(Duration::from_millis(200)) {
            Ok(msg) => {
                let (next, effects) = update(state, msg);
                if !effects.is_empty() {
                    runner.enqueue(effects);
                }
                state = present(next, &mut shown);
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }

    Ok(())
}

/// Fires once, the first time it is checked after `max_wait` has elapsed.
struct Deadline {
    at: Option<Instant>,
}

impl Deadline {
    fn new(started: Instant, max_wait: Option<Duration>) -> Self {
        Self {
            at: max_wait.map(|wait| started + wait),
        }
    }

    fn expired(&mut self, now: Instant) -> bool {
        match self.at {
            Some(at) if now >= at => {
                self.at = None;
                true
            }
            _ => false,
        }
    }
}

fn present(mut state: AppState, shown: &mut Vec<String>) -> AppState {
    if state.consume_dirty() {
        let lines = render(&state.view());
        for line in changed_lines(shown, &lines) {
            println!("{line}");
        }
        *shown = lines;
    }
    state
}
