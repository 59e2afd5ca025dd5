//! Client configuration parsed from environment variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_API_URL: &str = "http://localhost:5001/api";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
/// Well-known key (file name) the fallback bearer token is stored under.
pub const TOKEN_KEY: &str = "token";

const STATE_DIR: &str = ".chatworld";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl ClientTimeouts {
    #[must_use]
    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_secs)
    }

    #[must_use]
    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }
}

impl Default for ClientTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API root the auth paths are appended to, without a trailing slash.
    pub base_url: String,
    /// File holding the persisted fallback token.
    pub token_path: PathBuf,
    pub timeouts: ClientTimeouts,
}

impl ClientConfig {
    /// Build a config for `base_url` with default timeouts and token location.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is empty or not an http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            token_path: default_token_path(std::env::var("HOME").ok().as_deref()),
            timeouts: ClientTimeouts::default(),
        })
    }

    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `CHATWORLD_API_URL`: default `http://localhost:5001/api`
    /// - `CHATWORLD_TOKEN_FILE`: default `$HOME/.chatworld/token`
    /// - `CHATWORLD_REQUEST_TIMEOUT_SECS`: default 30
    /// - `CHATWORLD_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns an error if `CHATWORLD_API_URL` is set to an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = std::env::var("CHATWORLD_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_owned());
        let token_path = std::env::var("CHATWORLD_TOKEN_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_token_path(std::env::var("HOME").ok().as_deref()));
        let timeouts = ClientTimeouts {
            request_secs: env_parse_u64("CHATWORLD_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("CHATWORLD_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self { base_url: normalize_base_url(&base_url)?, token_path, timeouts })
    }

    /// Replace the base URL, keeping the other settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is empty or not an http(s) URL.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, ConfigError> {
        self.base_url = normalize_base_url(base_url)?;
        Ok(self)
    }

    /// Join an operation path onto the base URL.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

pub(crate) fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ConfigError::EmptyBaseUrl);
    }
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::InvalidBaseUrl(raw.to_owned()));
    }
    Ok(trimmed.to_owned())
}

pub(crate) fn default_token_path(home: Option<&str>) -> PathBuf {
    let root = home.filter(|h| !h.is_empty()).map_or_else(|| Path::new(".").to_path_buf(), PathBuf::from);
    root.join(STATE_DIR).join(TOKEN_KEY)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
