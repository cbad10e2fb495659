use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";
pub const API_KEY_ENV: &str = "MOVIESCOUT_API_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub scroll: ScrollConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    /// `sort_by` value sent with discover queries
    #[serde(default = "default_discover_sort")]
    pub discover_sort: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default = "default_poster_base_url")]
    pub poster_base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Where in the viewport a "load more" fires.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScrollConfig {
    /// Fraction of the client height subtracted from the scroll height
    #[serde(default = "default_ratio")]
    pub scroll_threshold_ratio: f64,
    /// Visible fraction of the last item needed to count as intersecting
    #[serde(default = "default_ratio")]
    pub intersection_threshold: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Force JSON on or off; unset means JSON only when stdout is not a terminal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_poster_base_url() -> String {
    DEFAULT_POSTER_BASE_URL.to_string()
}

fn default_discover_sort() -> String {
    "vote_count.desc".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_ratio() -> f64 {
    0.8
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            discover_sort: default_discover_sort(),
            language: None,
            poster_base_url: default_poster_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            scroll_threshold_ratio: default_ratio(),
            intersection_threshold: default_ratio(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: None,
            file: None,
        }
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Loads `path` when it exists, otherwise starts from defaults.
    /// Environment overrides are applied in both cases.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            Self::load_from_file(path)?
        } else {
            debug!("No config file at {}, using defaults", path.display());
            Self::default()
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            debug!("Using catalog API key from {}", API_KEY_ENV);
            self.catalog.api_key = key.trim().to_string();
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.catalog.api_key.trim().is_empty() {
            return Err(anyhow::anyhow!(
                "catalog.api_key is not configured (set it in config.toml or {})",
                API_KEY_ENV
            ));
        }

        for (name, url) in [
            ("catalog.base_url", &self.catalog.base_url),
            ("catalog.poster_base_url", &self.catalog.poster_base_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(anyhow::anyhow!("{} must be an http(s) URL, got {:?}", name, url));
            }
        }

        if self.catalog.timeout_secs == 0 {
            return Err(anyhow::anyhow!("catalog.timeout_secs must be greater than zero"));
        }

        for (name, ratio) in [
            ("scroll.scroll_threshold_ratio", self.scroll.scroll_threshold_ratio),
            ("scroll.intersection_threshold", self.scroll.intersection_threshold),
        ] {
            if !(ratio > 0.0 && ratio <= 1.0) {
                return Err(anyhow::anyhow!("{} must be in (0, 1], got {}", name, ratio));
            }
        }

        Ok(())
    }

    pub fn is_catalog_configured(&self) -> bool {
        !self.catalog.api_key.trim().is_empty()
    }
}
