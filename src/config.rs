//! Entry configuration persistence
//!
//! Stores preferences in `~/.config/destination-entry/config.yaml`

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Delay before the popup candidate list is refreshed after typing
pub const POPUP_REFRESH_DELAY_MS: u64 = 50;

/// Delay before type-ahead completion rewrites the range under the cursor
pub const TYPE_AHEAD_DELAY_MS: u64 = 333;

/// Delay before type-ahead runs once query results have started arriving
pub const RESULTS_DELAY_MS: u64 = 50;

/// Entry configuration that persists across sessions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryConfig {
    /// Characters a range needs before contacts are queried
    #[serde(default = "default_minimum_query_length")]
    pub minimum_query_length: usize,

    /// Always show the address next to a resolved contact's name
    #[serde(default)]
    pub show_address: bool,

    #[serde(default = "default_popup_refresh_delay_ms")]
    pub popup_refresh_delay_ms: u64,

    #[serde(default = "default_type_ahead_delay_ms")]
    pub type_ahead_delay_ms: u64,

    #[serde(default = "default_results_delay_ms")]
    pub results_delay_ms: u64,
}

fn default_minimum_query_length() -> usize {
    3
}

fn default_popup_refresh_delay_ms() -> u64 {
    POPUP_REFRESH_DELAY_MS
}

fn default_type_ahead_delay_ms() -> u64 {
    TYPE_AHEAD_DELAY_MS
}

fn default_results_delay_ms() -> u64 {
    RESULTS_DELAY_MS
}

impl Default for EntryConfig {
    fn default() -> Self {
        Self {
            minimum_query_length: default_minimum_query_length(),
            show_address: false,
            popup_refresh_delay_ms: default_popup_refresh_delay_ms(),
            type_ahead_delay_ms: default_type_ahead_delay_ms(),
            results_delay_ms: default_results_delay_ms(),
        }
    }
}

impl EntryConfig {
    /// Load config from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };

        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => {
                tracing::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!("{:#}", e);
                Self::default()
            }
        }
    }

    /// Read and parse a config file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config at {}", path.display()))?;
        Ok(config.normalized())
    }

    /// Save config to disk
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> Result<()> {
        let path = crate::config_paths::config_file().context("No config directory available")?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Minimum query length is at least one character
    pub fn normalized(mut self) -> Self {
        self.minimum_query_length = self.minimum_query_length.max(1);
        self
    }

    pub fn with_minimum_query_length(mut self, len: usize) -> Self {
        self.minimum_query_length = len.max(1);
        self
    }

    pub fn with_show_address(mut self, show: bool) -> Self {
        self.show_address = show;
        self
    }
}
