use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use studio_core::RequestMode;
use studio_logging::LogDestination;

#[derive(Debug, Parser)]
#[command(name = "studio", about = "Generate text, image descriptions and videos from prompts")]
pub struct Cli {
    /// Prompts to submit. Each one becomes its own request.
    pub prompts: Vec<String>,

    #[arg(short, long, value_enum, default_value_t = Mode::Text)]
    pub mode: Mode,

    /// Image to upload with every prompt.
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Write finished videos into this directory instead of keeping them in memory.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// RON configuration file.
    #[arg(short, long, default_value = "studio.ron")]
    pub config: PathBuf,

    /// Cancel video jobs still running after this many seconds.
    #[arg(long, value_name = "SECS")]
    pub max_wait: Option<u64>,

    #[arg(long, value_enum, default_value_t = LogTarget::File)]
    pub log: LogTarget,

    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    Text,
    DescribeImage,
    TextToVideo,
    ImageToVideo,
}

impl From<Mode> for RequestMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Text => RequestMode::Text,
            Mode::DescribeImage => RequestMode::DescribeImage,
            Mode::TextToVideo => RequestMode::TextToVideo,
            Mode::ImageToVideo => RequestMode::ImageToVideo,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogTarget {
    Terminal,
    File,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::File => LogDestination::File,
            LogTarget::Both => LogDestination::Both,
        }
    }
}
