//! Runtime configuration resolution.
//!
//! # Responsibility
//! - Resolve the database path from flag, environment, then temp dir.
//! - Start file logging when a log directory is given.

use anyhow::{Context, Result};
use birthday_core::{default_log_level, init_logging};
use std::path::{Path, PathBuf};

pub const DB_PATH_ENV: &str = "BIRTHDAY_TRACKER_DB_PATH";
const DB_FILE_NAME: &str = "birthday_tracker.sqlite3";

/// `--db`, else a non-blank `BIRTHDAY_TRACKER_DB_PATH`, else the temp dir.
pub fn resolve_db_path(flag: Option<PathBuf>) -> PathBuf {
    if let Some(path) = flag {
        return path;
    }
    if let Ok(raw) = std::env::var(DB_PATH_ENV) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    std::env::temp_dir().join(DB_FILE_NAME)
}

/// Starts file logging; without a directory the CLI stays silent.
pub fn start_logging(level: Option<&str>, log_dir: Option<&Path>) -> Result<()> {
    let Some(log_dir) = log_dir else {
        return Ok(());
    };
    let level = level.unwrap_or(default_log_level().as_str());
    let log_dir = log_dir
        .to_str()
        .context("log directory is not valid UTF-8")?;
    init_logging(level, log_dir).context("failed to start logging")?;
    Ok(())
}
