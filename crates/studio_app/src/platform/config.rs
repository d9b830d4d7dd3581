use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use studio_core::ProgressRouting;
use studio_engine::{
    BackendSettings, PollSettings, DEFAULT_BASE_URL, DEFAULT_TEXT_MODEL, DEFAULT_VIDEO_MODEL,
};
use studio_logging::{studio_info, studio_warn};
use thiserror::Error;

pub const API_KEY_VAR: &str = "API_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("API_KEY environment variable not set")]
    MissingApiKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Routing {
    #[default]
    ById,
    FirstLoading,
}

impl From<Routing> for ProgressRouting {
    fn from(routing: Routing) -> Self {
        match routing {
            Routing::ById => ProgressRouting::ById,
            Routing::FirstLoading => ProgressRouting::FirstLoading,
        }
    }
}

/// Settings read from the optional RON file. Every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    pub base_url: String,
    pub text_model: String,
    pub video_model: String,
    pub poll_interval_secs: u64,
    pub request_timeout_secs: u64,
    pub progress_routing: Routing,
    pub output_dir: Option<PathBuf>,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            video_model: DEFAULT_VIDEO_MODEL.to_string(),
            poll_interval_secs: 10,
            request_timeout_secs: 120,
            progress_routing: Routing::ById,
            output_dir: None,
        }
    }
}

impl StudioConfig {
    pub fn backend_settings(&self, api_key: String) -> BackendSettings {
        let mut settings = BackendSettings::new(api_key);
        settings.base_url = self.base_url.clone();
        settings.text_model = self.text_model.clone();
        settings.video_model = self.video_model.clone();
        settings.request_timeout = Duration::from_secs(self.request_timeout_secs.max(1));
        settings
    }

    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            interval: Duration::from_secs(self.poll_interval_secs),
            ..PollSettings::default()
        }
    }
}

/// Loads the config file; a missing or unreadable file falls back to defaults.
pub(crate) fn load_config(path: &Path) -> StudioConfig {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return StudioConfig::default();
        }
        Err(err) => {
            studio_warn!("Failed to read config from {:?}: {}", path, err);
            return StudioConfig::default();
        }
    };

    match ron::from_str(&content) {
        Ok(config) => {
            studio_info!("Loaded config from {:?}", path);
            config
        }
        Err(err) => {
            studio_warn!("Failed to parse config from {:?}: {}", path, err);
            StudioConfig::default()
        }
    }
}

/// Reads the API key from the environment, honouring a `.env` file.
pub(crate) fn load_api_key() -> Result<String, ConfigError> {
    let _ = dotenvy::dotenv();
    std::env::var(API_KEY_VAR)
        .ok()
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
        .ok_or(ConfigError::MissingApiKey)
}
