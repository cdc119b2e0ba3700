//! Logging init: console plus `scrape.log` under the data root.

use anyhow::Result;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use wellscrape_core::layout::PathLayout;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Open `scrape.log` under `data_root` for appending, creating the root if
/// needed.
pub fn open_log_file(data_root: &Path) -> Result<(File, PathBuf)> {
    fs::create_dir_all(data_root)?;
    let path = PathLayout::new(data_root).log_file();
    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    Ok((file, path))
}

/// Log to the console and to `<data_root>/scrape.log`. Returns Err when the
/// log file cannot be opened so the caller can fall back to the console.
pub fn init_logging(data_root: &Path) -> Result<()> {
    let (file, path) = open_log_file(data_root)?;

    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer())
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        .try_init()?;

    tracing::debug!("Logging to {}", path.display());
    Ok(())
}

/// Console only.
pub fn init_logging_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .try_init();
}
