//! Layered application configuration and path helpers.
//!
//! Uses Figment to merge built-in defaults + `foodiesnap.toml` +
//! `foodiesnap.<env>.toml` + `FOODIESNAP_*` env vars (`__` separates nested
//! keys, e.g. `FOODIESNAP_BROWSE__MAX_PAGES=3`). Provides helpers to expand
//! `~` and `${VAR}` and to resolve relative paths against a base directory.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub api: ApiConfig,
    pub browse: BrowseConfig,
    pub theme: ThemeConfig,
    pub ratings: RatingsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self { Self { dir: "~/.foodiesnap".to_string() } }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { base_url: "https://www.themealdb.com/api/json/v1/1".to_string(), timeout_secs: 10 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowseConfig {
    /// Random recipes fetched on first load.
    pub initial_batch: usize,
    /// Random recipes fetched per "load more".
    pub page_batch: usize,
    /// Page cap for the random-batch view.
    pub max_pages: u32,
    pub debounce_ms: u64,
}

impl Default for BrowseConfig {
    fn default() -> Self { Self { initial_batch: 8, page_batch: 4, max_pages: 5, debounce_ms: 500 } }
}

impl BrowseConfig {
    pub fn debounce(&self) -> Duration { Duration::from_millis(self.debounce_ms) }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ThemeConfig {
    /// Used when no theme has been persisted yet.
    pub prefer_dark: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingsConfig {
    pub top_limit: usize,
}

impl Default for RatingsConfig {
    fn default() -> Self { Self { top_limit: 10 } }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Self::load_for_env(&env_name)
    }

    pub fn load_for_env(env_name: &str) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file("foodiesnap.toml"));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file("foodiesnap.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("foodiesnap.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("foodiesnap.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("FOODIESNAP_").split("__"));

        let config: AppConfig = figment.extract().map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.browse.initial_batch == 0 || self.browse.page_batch == 0 {
            return Err(Error::InvalidConfig("browse batches must be at least 1".to_string()));
        }
        if self.browse.max_pages == 0 {
            return Err(Error::InvalidConfig("browse.max_pages must be at least 1".to_string()));
        }
        if self.ratings.top_limit == 0 {
            return Err(Error::InvalidConfig("ratings.top_limit must be at least 1".to_string()));
        }
        if self.api.base_url.trim().is_empty() {
            return Err(Error::InvalidConfig("api.base_url is empty".to_string()));
        }
        Ok(())
    }

    /// Storage directory with `~`/env expansion, relative to the working directory.
    pub fn storage_dir(&self) -> Result<PathBuf> {
        let cwd = env::current_dir()?;
        Ok(resolve_with_base(&cwd, &self.storage.dir))
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
