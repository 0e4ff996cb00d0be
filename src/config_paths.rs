//! Where the entry keeps its settings and rolling logs.
//!
//! Everything sits in one per-user directory named after the crate: the
//! platform config root on Windows, the XDG config root elsewhere.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

const APP_DIR: &str = "destination-entry";
const CONFIG_FILE_NAME: &str = "config.yaml";
const LOGS_DIR_NAME: &str = "logs";

/// Prefix of the daily log files written by the file layer
pub const LOG_FILE_NAME: &str = "destination-entry.log";

/// Per-user settings directory. `XDG_CONFIG_HOME` wins over `~/.config`;
/// Windows uses `%APPDATA%`. None when no home can be found.
pub fn config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    let root = env::var_os("APPDATA").map(PathBuf::from);

    #[cfg(not(target_os = "windows"))]
    let root = env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")));

    root.map(|root| root.join(APP_DIR))
}

/// YAML settings read by `EntryConfig::load`
pub fn config_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}

pub fn logs_dir() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(LOGS_DIR_NAME))
}

fn create(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .with_context(|| format!("Failed to create directory {}", path.display()))
}

/// Create the log directory if missing
pub fn ensure_logs_dir() -> Result<PathBuf> {
    let logs = logs_dir().context("No config directory available")?;
    create(&logs)?;
    Ok(logs)
}
