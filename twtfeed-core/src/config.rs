use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{FeedError, Result};

const FEEDS_DIR: &str = "feeds";

/// Pod configuration consumed by the feed engine: a data root and the
/// public base URL. Nothing else is needed here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PodConfig {
    /// Data root; feed files live under `<data>/feeds/`.
    pub data: PathBuf,
    /// Public base URL of this pod.
    pub base_url: String,
}

impl Default for PodConfig {
    fn default() -> Self {
        Self {
            data: dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".twtfeed"),
            base_url: "http://0.0.0.0:8000".to_string(),
        }
    }
}

impl PodConfig {
    pub fn new(data: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            base_url: base_url.into(),
        }
    }

    /// Default config file location: ~/.twtfeed/config.toml
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".twtfeed/config.toml")
    }

    /// Load config from a TOML file, then apply TWTFEED_* environment
    /// overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;

        let mut config: Self = toml::from_str(&content)
            .map_err(|err| FeedError::config(format!("invalid TOML in {}: {err}", path.display())))?;

        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from an explicit path, from the default location if the file
    /// exists there, or fall back to defaults. Environment overrides apply
    /// in every case.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => {
                let default_path = Self::config_path();
                if default_path.exists() {
                    Self::load(&default_path)
                } else {
                    let mut config = Self::default();
                    config.apply_env_overrides();
                    Ok(config)
                }
            }
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(data) = env::var("TWTFEED_DATA") {
            self.data = PathBuf::from(data);
        }
        if let Ok(base_url) = env::var("TWTFEED_BASE_URL") {
            self.base_url = base_url;
        }
    }

    /// Directory holding one feed file per normalized username.
    pub fn feeds_dir(&self) -> PathBuf {
        self.data.join(FEEDS_DIR)
    }

    /// Save config to a TOML file, creating parent directories as needed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let toml_str = toml::to_string_pretty(self)
            .map_err(|err| FeedError::config(format!("failed to serialize config: {err}")))?;

        fs::write(path, toml_str)?;
        Ok(())
    }
}
