//! Feed configuration
//!
//! Stored as JSON in the user's config directory:
//! - Linux: ~/.config/picsum-feed/config.json
//! - macOS: ~/Library/Application Support/picsum-feed/config.json
//! - Windows: %APPDATA%\picsum-feed\config.json
//!
//! `PICSUM_FEED_CONFIG` points at a different file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

/// Environment variable overriding the config file location
pub const CONFIG_ENV_VAR: &str = "PICSUM_FEED_CONFIG";

/// All tunables for the feed
///
/// Missing fields fall back to their defaults, so a config file only has
/// to list what it changes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct FeedConfig {
    /// Root of the Picsum API (no trailing slash)
    pub base_url: String,

    /// Items requested per page
    pub page_size: u32,

    /// Page cursor must stay strictly below this (5 -> pages 1..=4)
    pub max_page_exclusive: u32,

    /// Bounding box for generated thumbnails, in pixels
    pub thumbnail_size: u32,

    /// Per-request timeout; `None` waits indefinitely
    pub request_timeout_secs: Option<u64>,

    /// Distance from the end, in viewport heights, that triggers "load more"
    pub scroll_threshold: f32,

    /// Fallback tracing filter when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: "https://picsum.photos".to_string(),
            page_size: 10,
            max_page_exclusive: 5,
            thumbnail_size: 256,
            request_timeout_secs: None,
            scroll_threshold: 1.0,
            log_filter: "info".to_string(),
        }
    }
}

impl FeedConfig {
    /// Parse from a JSON string and validate
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: FeedConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Convert to pretty JSON for writing back to disk
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the feed cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("base_url is empty".to_string()));
        }
        if self.page_size == 0 {
            return Err(ConfigError::Invalid("page_size must be at least 1".to_string()));
        }
        if self.max_page_exclusive < 2 {
            return Err(ConfigError::Invalid(
                "max_page_exclusive must be at least 2".to_string(),
            ));
        }
        if self.thumbnail_size == 0 {
            return Err(ConfigError::Invalid(
                "thumbnail_size must be at least 1".to_string(),
            ));
        }
        if self.scroll_threshold.is_nan() || self.scroll_threshold <= 0.0 {
            return Err(ConfigError::Invalid(
                "scroll_threshold must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Where the config file lives (env override, then the config dir)
    pub fn default_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
            return Some(PathBuf::from(path));
        }
        let mut path = dirs::config_dir().or_else(dirs::home_dir)?;
        path.push("picsum-feed");
        path.push("config.json");
        Some(path)
    }

    /// Load from `path`, returning defaults when the file does not exist
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Write to `path`, creating parent directories as needed
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
