//! Scrawl Application
//!
//! Native command host for a stored sketch session.

mod app;

pub use app::{now_epoch_ms, App, AppConfig, AppError, AppResult, Cli, Command, CONFIG_ENV, DATA_DIR_ENV};
