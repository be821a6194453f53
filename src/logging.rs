//! File logging.
//!
//! The terminal belongs to the TUI, so log lines go to a file. The level
//! comes from `STREAMSIC_LOG` when set, else from `[logging] level`.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::{LoggingSettings, default_log_path};

pub const LOG_ENV: &str = "STREAMSIC_LOG";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("no log file location (set logging.file or HOME)")]
    NoLogPath,
    #[error("cannot open log file {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("logger already installed: {0}")]
    Init(String),
}

fn log_path(settings: &LoggingSettings) -> Option<PathBuf> {
    settings.file.clone().or_else(default_log_path)
}

fn open_log_file(path: &Path) -> Result<File, LoggingError> {
    let io_err = |source| LoggingError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(io_err)?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(io_err)
}

fn filter_from(level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. Returns the file being written to.
pub fn init(settings: &LoggingSettings) -> Result<PathBuf, LoggingError> {
    let path = log_path(settings).ok_or(LoggingError::NoLogPath)?;
    let file = open_log_file(&path)?;

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .with_env_filter(filter_from(&settings.level))
        .try_init()
        .map_err(|e| LoggingError::Init(e.to_string()))?;

    Ok(path)
}
