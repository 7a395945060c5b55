use crate::core::cache::{DEFAULT_TTL, MAX_TTL};
use crate::providers::taiwan_bank::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FeedConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

const MAX_TIMEOUT_SECS: u64 = 300;

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

fn default_cache_ttl_minutes() -> u64 {
    DEFAULT_TTL.as_secs() / 60
}

fn default_auto_refresh() -> bool {
    true
}

impl Default for FeedConfig {
    fn default() -> Self {
        FeedConfig {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default = "default_cache_ttl_minutes")]
    pub cache_ttl_minutes: u64,
    /// Fetch rates on first use when nothing has been stored yet.
    #[serde(default = "default_auto_refresh")]
    pub auto_refresh: bool,
    pub data_path: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            feed: FeedConfig::default(),
            cache_ttl_minutes: default_cache_ttl_minutes(),
            auto_refresh: default_auto_refresh(),
            data_path: None,
        }
    }
}

impl AppConfig {
    /// Loads the default config file, falling back to built-in defaults when
    /// it does not exist.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("tw", "twfx", "twfx").context("Could not determine project directories")
    }

    pub fn default_config_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        Ok(Self::project_dirs()?.data_dir().to_path_buf())
    }

    pub fn feed_timeout(&self) -> Duration {
        Duration::from_secs(self.feed.timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_minutes.saturating_mul(60))
    }

    /// Rejects values that parse as YAML but make no sense at runtime.
    pub fn validate(&self) -> Result<()> {
        let max_minutes = MAX_TTL.as_secs() / 60;
        if self.cache_ttl_minutes > max_minutes {
            anyhow::bail!(
                "cache_ttl_minutes must be at most {max_minutes}, got {}",
                self.cache_ttl_minutes
            );
        }
        if self.feed.timeout_secs == 0 || self.feed.timeout_secs > MAX_TIMEOUT_SECS {
            anyhow::bail!(
                "feed.timeout_secs must be between 1 and {MAX_TIMEOUT_SECS}, got {}",
                self.feed.timeout_secs
            );
        }
        Ok(())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}
