//! Application configuration management.
//!
//! This module handles loading and saving the application configuration:
//! the catalog URL, the image cache location, and network tuning.
//!
//! Configuration is stored at `~/.config/recipebox/config.json`. Environment
//! variables (`RECIPEBOX_CATALOG_URL`, `RECIPEBOX_CACHE_DIR`,
//! `RECIPEBOX_TIMEOUT_SECS`) override the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::transport::REQUEST_TIMEOUT_SECS;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "recipebox";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Subdirectory of the cache root holding image files
const IMAGES_DIR: &str = "images";

pub const DEFAULT_CATALOG_URL: &str = "https://d3jbb8n5wk0qxi.cloudfront.net/recipes.json";

/// Images fetched at once when warming the cache.
pub const DEFAULT_PREFETCH_CONCURRENCY: usize = 5;

const ENV_CATALOG_URL: &str = "RECIPEBOX_CATALOG_URL";
const ENV_CACHE_DIR: &str = "RECIPEBOX_CACHE_DIR";
const ENV_TIMEOUT_SECS: &str = "RECIPEBOX_TIMEOUT_SECS";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub catalog_url: String,
    pub cache_dir: Option<PathBuf>,
    pub request_timeout_secs: u64,
    pub prefetch_concurrency: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            cache_dir: None,
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
            prefetch_concurrency: DEFAULT_PREFETCH_CONCURRENCY,
        }
    }
}

impl Config {
    /// Load from the config file (if any), then apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_file()?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn load_file() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Read a config file. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Write the config as pretty JSON, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Apply overrides from a variable lookup. Unparsable values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_CATALOG_URL).filter(|v| !v.trim().is_empty()) {
            self.catalog_url = url.trim().to_string();
        }
        if let Some(dir) = lookup(ENV_CACHE_DIR).filter(|v| !v.trim().is_empty()) {
            self.cache_dir = Some(PathBuf::from(dir));
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => self.request_timeout_secs = secs,
                _ => warn!(value = %raw, "Ignoring invalid {}", ENV_TIMEOUT_SECS),
            }
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Directory for cached images; the explicit override wins.
    pub fn image_cache_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.cache_dir {
            return Ok(dir.clone());
        }
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME).join(IMAGES_DIR))
    }
}
