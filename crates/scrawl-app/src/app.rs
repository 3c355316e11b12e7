//! Command host: opens the stored session and runs one command against it.

use clap::{Parser, Subcommand};
use kurbo::Size;
use scrawl_core::{FileStore, Session, SketchConfig, StorageError};
use scrawl_render::{export_drawing, Delivery, DirectoryDownload, ExportError, ExportOptions};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Environment variable naming a JSON [`SketchConfig`] file.
pub const CONFIG_ENV: &str = "SCRAWL_CONFIG";

/// Environment variable overriding the session directory.
pub const DATA_DIR_ENV: &str = "SCRAWL_DATA_DIR";

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("Config error: {0}")]
    Config(String),
}

pub type AppResult<T> = Result<T, AppError>;

/// Command line.
#[derive(Debug, Parser)]
#[command(name = "scrawl", version, about = "Inspect, export or clear the stored sketch")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// The requested command; `info` when none is given.
    pub fn command(self) -> Command {
        self.command.unwrap_or(Command::Info)
    }
}

/// Something to do with the stored session.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Summarize the session
    Info,
    /// Write the drawing as note.png into a directory
    Export {
        #[arg(default_value = ".")]
        dir: PathBuf,
    },
    /// Wipe the session and start a new one
    Clear,
}

/// Host configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Session directory; the platform data dir when unset.
    pub data_dir: Option<PathBuf>,
    /// Viewport used to size a brand new canvas.
    pub viewport: Size,
    pub sketch: SketchConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            viewport: Size::new(1280.0, 800.0),
            sketch: SketchConfig::lasso(),
        }
    }
}

impl AppConfig {
    /// Build from `SCRAWL_CONFIG` and `SCRAWL_DATA_DIR`.
    pub fn from_env() -> AppResult<Self> {
        let mut config = Self::default();
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            let path = PathBuf::from(path);
            let json = std::fs::read_to_string(&path)
                .map_err(|e| AppError::Config(format!("Failed to read {}: {}", path.display(), e)))?;
            config.sketch = SketchConfig::from_json(&json)
                .map_err(|e| AppError::Config(format!("Invalid {}: {}", path.display(), e)))?;
            log::info!("Loaded config from {}", path.display());
        }
        if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
            config.data_dir = Some(PathBuf::from(dir));
        }
        Ok(config)
    }
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}

/// Main application struct.
pub struct App {
    config: AppConfig,
    store: Arc<FileStore>,
}

impl App {
    /// Open the session store. Fails if no store location is usable.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let store = match &config.data_dir {
            Some(dir) => FileStore::new(dir.clone())?,
            None => FileStore::default_location()?,
        };
        log::debug!("Using session store at {}", store.base_path().display());
        Ok(Self {
            config,
            store: Arc::new(store),
        })
    }

    fn open_session(&self, now_epoch_ms: i64) -> AppResult<Session<Arc<FileStore>>> {
        let session = Session::load(self.store.clone(), self.config.sketch.clone(), self.config.viewport, now_epoch_ms)?;
        for key in session.recovered_keys() {
            log::warn!("Recovered corrupt stored value for {}", key);
        }
        Ok(session)
    }

    /// Run one command and describe the result.
    pub fn run(&self, command: Command, now_epoch_ms: i64) -> AppResult<String> {
        let session = self.open_session(now_epoch_ms)?;
        match command {
            Command::Info => Ok(describe(&session)),
            Command::Export { dir } => {
                let options = ExportOptions::from_config(session.config());
                let mut download = DirectoryDownload::new(dir);
                match export_drawing(session.drawing(), &options, None, &mut download)? {
                    Delivery::Downloaded(path) => Ok(format!("Exported to {}", path.display())),
                    Delivery::Shared => Ok("Shared export".to_string()),
                    Delivery::ShareRejected(reason) => Ok(format!("Share rejected: {}", reason)),
                }
            }
            Command::Clear => {
                let mut session = session;
                session.clear(now_epoch_ms)?;
                Ok(format!(
                    "Cleared session, new canvas {}x{}",
                    session.extent().width,
                    session.extent().height
                ))
            }
        }
    }
}

fn describe(session: &Session<Arc<FileStore>>) -> String {
    let extent = session.extent();
    let mut lines = vec![
        format!("store:   {}", session.store().base_path().display()),
        format!("mode:    {:?}", session.erase_mode()),
        format!("canvas:  {}x{}", extent.width, extent.height),
        format!("origin:  {}", session.origin()),
        format!(
            "strokes: {} ({} points)",
            session.drawing().len(),
            session.drawing().point_count()
        ),
    ];
    if !session.recovered_keys().is_empty() {
        lines.push(format!("recovered: {}", session.recovered_keys().join(", ")));
    }
    lines.join("\n")
}
