//! Application configuration management.
//!
//! Configuration is stored at `~/.config/satseat/config.json`. Every field
//! is optional; a missing file means all defaults. `SATSEAT_CACHE_DIR` and
//! `SATSEAT_MAX_CONCURRENT` override the file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Duration;
use serde::Deserialize;
use tracing::warn;

use crate::api::client::{SESSIONS_URL, TEST_CENTERS_URL};
use crate::cache::DEFAULT_STALE_AFTER_HOURS;
use crate::fetcher::DEFAULT_MAX_CONCURRENT_REQUESTS;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "satseat";

/// Config file name
const CONFIG_FILE: &str = "config.json";

const ENV_CACHE_DIR: &str = "SATSEAT_CACHE_DIR";
const ENV_MAX_CONCURRENT: &str = "SATSEAT_MAX_CONCURRENT";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    pub cache_dir: Option<PathBuf>,
    pub max_concurrent_requests: Option<usize>,
    pub stale_after_hours: Option<i64>,
    pub sessions_url: Option<String>,
    pub test_centers_url: Option<String>,
}

impl Config {
    /// Load from disk, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let config = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            serde_json::from_str(&contents).context("Failed to parse config")?
        } else {
            Self::default()
        };
        Ok(config.with_env(|key| std::env::var(key).ok()))
    }

    fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(dir) = lookup(ENV_CACHE_DIR).filter(|d| !d.is_empty()) {
            self.cache_dir = Some(PathBuf::from(dir));
        }
        if let Some(raw) = lookup(ENV_MAX_CONCURRENT) {
            match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => self.max_concurrent_requests = Some(n),
                _ => warn!(value = %raw, "Ignoring invalid {}", ENV_MAX_CONCURRENT),
            }
        }
        self
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory backing the key-value store.
    pub fn cache_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.cache_dir {
            return Ok(dir.clone());
        }
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    pub fn log_dir(&self) -> Result<PathBuf> {
        Ok(self.cache_dir()?.join("logs"))
    }

    pub fn max_concurrent_requests(&self) -> usize {
        self.max_concurrent_requests
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_MAX_CONCURRENT_REQUESTS)
    }

    /// Out-of-range or non-positive values fall back to the default.
    pub fn stale_after(&self) -> Duration {
        let default = || Duration::hours(DEFAULT_STALE_AFTER_HOURS);
        match self.stale_after_hours.filter(|&h| h > 0) {
            Some(hours) => Duration::try_hours(hours).unwrap_or_else(|| {
                warn!(hours, "stale_after_hours out of range, using default");
                default()
            }),
            None => default(),
        }
    }

    pub fn sessions_url(&self) -> &str {
        self.sessions_url.as_deref().unwrap_or(SESSIONS_URL)
    }

    pub fn test_centers_url(&self) -> &str {
        self.test_centers_url.as_deref().unwrap_or(TEST_CENTERS_URL)
    }
}
