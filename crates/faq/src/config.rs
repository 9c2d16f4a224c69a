//! Settings from defaults, `~/.faq/config.toml`, `FAQ_API_URL` and flags

use anyhow::{Context, Result};
use faq_search::SearchConfig;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const API_URL_ENV: &str = "FAQ_API_URL";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    api_url: Option<String>,
    debounce_ms: Option<u64>,
    max_attempts: Option<u32>,
    retry_delay_ms: Option<u64>,
    show_diagnostics: Option<bool>,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("api_url must not be empty")]
    EmptyApiUrl,

    #[error("max_attempts must be at least 1")]
    NoAttempts,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: String,
    pub search: SearchConfig,
    /// Show underlying error details in the UI
    pub show_diagnostics: bool,
}

fn default_api_url() -> String {
    #[cfg(debug_assertions)]
    return "http://localhost:8000".to_string();
    #[cfg(not(debug_assertions))]
    return "https://faq.example.com".to_string();
}

fn config_file_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".faq").join("config.toml"))
}

impl Config {
    /// Resolve the full configuration. `api_url` comes from the command line.
    pub fn load(api_url: Option<&str>) -> Result<Self> {
        let file = match config_file_path() {
            Some(path) => read_config_file(&path)?,
            None => None,
        };
        let env_url = std::env::var(API_URL_ENV).ok();

        Ok(Self::resolve(file, env_url.as_deref(), api_url)?)
    }

    fn resolve(
        file: Option<ConfigFile>,
        env_url: Option<&str>,
        cli_url: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let file = file.unwrap_or_default();
        let defaults = SearchConfig::default();

        let api_url = cli_url
            .map(str::to_string)
            .or_else(|| env_url.map(str::to_string))
            .or(file.api_url)
            .unwrap_or_else(default_api_url);
        let api_url = api_url.trim().trim_end_matches('/').to_string();
        if api_url.is_empty() {
            return Err(ConfigError::EmptyApiUrl);
        }

        let max_attempts = file.max_attempts.unwrap_or(defaults.max_attempts);
        if max_attempts == 0 {
            return Err(ConfigError::NoAttempts);
        }

        Ok(Self {
            api_url,
            search: SearchConfig {
                debounce: file
                    .debounce_ms
                    .map_or(defaults.debounce, Duration::from_millis),
                max_attempts,
                retry_delay: file
                    .retry_delay_ms
                    .map_or(defaults.retry_delay, Duration::from_millis),
            },
            show_diagnostics: file.show_diagnostics.unwrap_or(cfg!(debug_assertions)),
        })
    }
}

fn read_config_file(path: &Path) -> Result<Option<ConfigFile>> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let file = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(Some(file))
}
