use crate::shell::{SidebarSize, ThemeMode};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

const APP_DIR: &str = "anikii";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub api: ApiConfig,

    pub shell: ShellConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            worker_threads: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base of the catalog backend, e.g. `http://localhost:3000/api`
    pub base_url: String,

    /// Client-wide upper bound for any request (default: 30)
    pub request_timeout_seconds: u64,

    /// Upper bound for `/details` calls (default: 10)
    pub detail_timeout_seconds: u64,

    /// Upper bound for `/recommendations` calls (default: 10)
    pub recommendations_timeout_seconds: u64,

    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/api".to_string(),
            request_timeout_seconds: 30,
            detail_timeout_seconds: 10,
            recommendations_timeout_seconds: 10,
            user_agent: "Anikii/1.0".to_string(),
        }
    }
}

impl ApiConfig {
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    #[must_use]
    pub const fn detail_timeout(&self) -> Duration {
        Duration::from_secs(self.detail_timeout_seconds)
    }

    #[must_use]
    pub const fn recommendations_timeout(&self) -> Duration {
        Duration::from_secs(self.recommendations_timeout_seconds)
    }
}

/// Initial application-shell state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    pub theme: ThemeMode,

    pub sidebar: SidebarSize,
}

impl Config {
    /// Reads the first config file on the search path, falling back to the
    /// built-in defaults when there is none.
    pub fn load() -> Result<Self> {
        let Some(path) = Self::search_paths().into_iter().find(|p| p.is_file()) else {
            return Ok(Self::default());
        };
        Self::load_from_path(&path)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read config {}", path.display()))?;

        toml::from_str(&raw).with_context(|| format!("Malformed config {}", path.display()))
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent()
            && !dir.as_os_str().is_empty()
        {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Cannot create {}", dir.display()))?;
        }

        std::fs::write(path, toml::to_string_pretty(self)?)
            .with_context(|| format!("Cannot write config {}", path.display()))?;
        info!(path = %path.display(), "Config written");
        Ok(())
    }

    /// `./config.toml`, then the per-user config dir, then `~/.anikii`.
    fn search_paths() -> Vec<PathBuf> {
        let user_dirs = [
            dirs::config_dir().map(|dir| dir.join(APP_DIR)),
            dirs::home_dir().map(|home| home.join(format!(".{APP_DIR}"))),
        ];

        std::iter::once(PathBuf::from(CONFIG_FILE))
            .chain(user_dirs.into_iter().flatten().map(|dir| dir.join(CONFIG_FILE)))
            .collect()
    }

    /// Writes the defaults to `./config.toml`. Returns `false` without
    /// touching anything when the file is already there.
    pub fn create_default_if_missing() -> Result<bool> {
        let path = Path::new(CONFIG_FILE);
        if path.exists() {
            return Ok(false);
        }
        Self::default().save_to_path(path)?;
        Ok(true)
    }

    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.api.base_url)
            .with_context(|| format!("Invalid API base URL: {}", self.api.base_url))?;

        if url.cannot_be_a_base() {
            anyhow::bail!("API base URL cannot be used as a base: {}", self.api.base_url);
        }

        if self.api.request_timeout_seconds == 0
            || self.api.detail_timeout_seconds == 0
            || self.api.recommendations_timeout_seconds == 0
        {
            anyhow::bail!("API timeouts must be > 0 seconds");
        }

        Ok(())
    }
}
