use std::time::Duration;

/// User-visible status lines. Presentation only; free to localize.
pub mod status_text {
    pub const STARTING: &str = "Starting video generation...";
    pub const ACCEPTED: &str = "Request accepted, processing...";
    pub const GENERATING: &str = "Generating, this may take a while...";
    pub const FINISHING: &str = "Finishing up...";
    pub const SUCCESS: &str = "Video created!";
    pub const CANCELLED: &str = "Video generation cancelled.";
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSettings {
    /// Wait between status checks.
    pub interval: Duration,
    /// Reported once the backend acknowledges the submission.
    pub accepted_progress: u8,
    /// Added per status check.
    pub step: u8,
    /// Upper bound while the job is still running.
    pub ceiling: u8,
    /// Reported after the job is done, before the artifact is fetched.
    pub finishing_progress: u8,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            accepted_progress: 25,
            step: 10,
            ceiling: 90,
            finishing_progress: 95,
        }
    }
}

/// Maps poll iterations onto a bounded, non-decreasing progress value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEstimator {
    current: u8,
    step: u8,
    ceiling: u8,
    finishing: u8,
    iterations: u32,
}

impl ProgressEstimator {
    pub fn new(settings: &PollSettings) -> Self {
        let ceiling = settings.ceiling.min(99);
        Self {
            current: settings.accepted_progress.min(100),
            step: settings.step,
            ceiling,
            finishing: settings.finishing_progress.clamp(ceiling, 99),
            iterations: 0,
        }
    }

    /// Progress right after the submission was acknowledged.
    pub fn accepted(&self) -> u8 {
        self.current
    }

    /// Records one status check and returns the new estimate.
    pub fn advance(&mut self) -> u8 {
        self.iterations += 1;
        let next = self.current.saturating_add(self.step).min(self.ceiling);
        self.current = self.current.max(next);
        self.current
    }

    /// Progress once the job reports done.
    pub fn finishing(&mut self) -> u8 {
        self.current = self.current.max(self.finishing);
        self.current
    }

    pub fn current(&self) -> u8 {
        self.current
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }
}
