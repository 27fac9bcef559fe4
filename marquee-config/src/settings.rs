use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::ConfigError;
use crate::token::{ApiToken, TokenProvider};

pub const DEFAULT_CONFIG_FILE: &str = "marquee.toml";

/// Longest accepted periodic sync interval (one year).
pub const MAX_SYNC_INTERVAL: Duration =
    Duration::from_secs(365 * 24 * 60 * 60);

/// Top-level configuration for the sync pipeline.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub tmdb: TmdbSettings,
    pub sync: SyncSettings,
    pub database: DatabaseSettings,
}

#[derive(Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TmdbSettings {
    pub api_token: Option<String>,
    pub language: String,
    pub api_base_url: String,
    pub image_base_url: String,
}

impl Default for TmdbSettings {
    fn default() -> Self {
        Self {
            api_token: None,
            language: "zh-CN".to_string(),
            api_base_url: "https://api.themoviedb.org/3".to_string(),
            image_base_url: "https://image.tmdb.org/t/p/original".to_string(),
        }
    }
}

impl std::fmt::Debug for TmdbSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TmdbSettings")
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .field("language", &self.language)
            .field("api_base_url", &self.api_base_url)
            .field("image_base_url", &self.image_base_url)
            .finish()
    }
}

impl TokenProvider for TmdbSettings {
    fn api_token(&self) -> Result<ApiToken, ConfigError> {
        match self.api_token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => Ok(ApiToken::new(token)),
            _ => Err(ConfigError::MissingToken),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncSettings {
    pub sort_by: String,
    pub page_cap: u32,
    #[serde(deserialize_with = "humantime_serde::deserialize")]
    pub page_delay: Duration,
    #[serde(deserialize_with = "humantime_serde::deserialize")]
    pub request_timeout: Duration,
    pub max_retries: u32,
    #[serde(deserialize_with = "humantime_serde::deserialize")]
    pub retry_base_delay: Duration,
    pub download_concurrency: usize,
    pub images_per_kind: usize,
    pub image_dir: PathBuf,
    #[serde(deserialize_with = "humantime_serde::deserialize")]
    pub interval: Duration,
    pub run_on_start: bool,
    pub download_images: bool,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            sort_by: "popularity.desc".to_string(),
            page_cap: 10,
            page_delay: Duration::from_millis(500),
            request_timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_base_delay: Duration::from_secs(1),
            download_concurrency: 10,
            images_per_kind: 5,
            image_dir: PathBuf::from("images"),
            interval: Duration::from_secs(60 * 60),
            run_on_start: false,
            download_images: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseSettings {
    pub url: Option<String>,
    pub max_connections: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 5,
        }
    }
}

impl AppConfig {
    /// Load configuration the way the command-line tools expect it.
    ///
    /// `.env` is read first, then the TOML file (explicit path, or
    /// `marquee.toml` in the working directory when present), then the
    /// process environment overrides individual keys.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Ok(env_file) = dotenvy::dotenv() {
            debug!(path = %env_file.display(), "loaded .env file");
        }

        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw =
            std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        info!(path = %path.display(), "loading configuration file");
        Self::from_toml_str(&raw, &path.display().to_string())
    }

    pub fn from_toml_str(raw: &str, origin: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|source| ConfigError::Parse {
            origin: origin.to_string(),
            source,
        })
    }

    /// Overlay environment values using `lookup` (injected for testability).
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("TMDB_API_TOKEN") {
            self.tmdb.api_token = Some(token);
        }
        if let Some(language) = lookup("TMDB_LANGUAGE") {
            self.tmdb.language = language;
        }
        if let Some(url) = lookup("DATABASE_URL") {
            self.database.url = Some(url);
        }
        if let Some(dir) = lookup("MARQUEE_IMAGE_DIR") {
            self.sync.image_dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup("MARQUEE_SYNC_INTERVAL") {
            self.sync.interval = humantime::parse_duration(&raw).map_err(
                |_| ConfigError::InvalidDuration {
                    field: "MARQUEE_SYNC_INTERVAL",
                    value: raw.clone(),
                },
            )?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sync.page_cap == 0 {
            return Err(ConfigError::InvalidValue {
                field: "sync.page_cap",
                message: "must be at least 1".into(),
            });
        }
        if self.sync.download_concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                field: "sync.download_concurrency",
                message: "must be at least 1".into(),
            });
        }
        if self.sync.interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "sync.interval",
                message: "must be greater than zero".into(),
            });
        }
        if self.sync.interval > MAX_SYNC_INTERVAL {
            return Err(ConfigError::InvalidValue {
                field: "sync.interval",
                message: "must be at most one year".into(),
            });
        }
        Ok(())
    }
}

mod humantime_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, de::Error};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(raw.trim()).map_err(|err| {
            D::Error::custom(format!("invalid duration '{raw}': {err}"))
        })
    }
}
