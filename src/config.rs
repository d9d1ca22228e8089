// Service configuration, loaded once at startup from the deployed env.json
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_LOTS_LIFETIME_MS: u64 = 60_000;
pub const DEFAULT_META_LIFETIME_MS: u64 = 24 * 60 * 60 * 1000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedConfig {
    pub api_key: String,
    // The single-feed deployment calls this one apiUrl
    #[serde(alias = "apiUrl")]
    pub api_lots_url: String,
    // Without a meta endpoint records carry no district names
    #[serde(default)]
    pub api_meta_url: Option<String>,
    #[serde(rename = "cacheLotsLifetime", alias = "cacheLifetime", default = "default_lots_lifetime")]
    pub cache_lots_lifetime_ms: u64,
    #[serde(rename = "cacheMetaLifetime", default = "default_meta_lifetime")]
    pub cache_meta_lifetime_ms: u64,
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,
}

fn default_lots_lifetime() -> u64 {
    DEFAULT_LOTS_LIFETIME_MS
}

fn default_meta_lifetime() -> u64 {
    DEFAULT_META_LIFETIME_MS
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_lots_url: String::new(),
            api_meta_url: None,
            cache_lots_lifetime_ms: DEFAULT_LOTS_LIFETIME_MS,
            cache_meta_lifetime_ms: DEFAULT_META_LIFETIME_MS,
            request_timeout_ms: None,
        }
    }
}

impl FeedConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: FeedConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::Invalid("apiKey must not be empty".to_string()));
        }

        check_url("apiLotsUrl", &self.api_lots_url)?;
        if let Some(meta_url) = &self.api_meta_url {
            check_url("apiMetaUrl", meta_url)?;
        }

        Ok(())
    }

    pub fn lots_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_lots_lifetime_ms)
    }

    pub fn meta_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_meta_lifetime_ms)
    }

    pub fn has_meta_feed(&self) -> bool {
        self.api_meta_url.is_some()
    }
}

fn check_url(field: &str, value: &str) -> Result<(), ConfigError> {
    reqwest::Url::parse(value)
        .map(|_| ())
        .map_err(|e| ConfigError::Invalid(format!("{} is not a valid URL ({}): {}", field, value, e)))
}
