//! Terminal front end: argument parsing, configuration, effect execution
//! and plain-text rendering around the pure core.
mod app;
mod cli;
mod config;
mod effects;
mod render;
mod upload;

pub use app::run_app;
