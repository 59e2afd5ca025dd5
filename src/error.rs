//! Error types.
//!
//! ERROR HANDLING
//! ==============
//! Auth operations never surface these to callers: [`ClientError`] is logged
//! and folded into a failed `Outcome` at the client boundary. They escape only
//! from constructors (`AuthClient::new`, `ClientConfig::from_env`) and from the
//! credential store, whose failures are logged and swallowed by the client.

use std::path::PathBuf;

/// Invalid or missing client configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("API base URL is empty")]
    EmptyBaseUrl,

    #[error("invalid API base URL: {0}")]
    InvalidBaseUrl(String),
}

/// I/O failure on the persisted token file.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to write token file {path}: {source}")]
    Write { path: PathBuf, source: std::io::Error },

    #[error("failed to remove token file {path}: {source}")]
    Remove { path: PathBuf, source: std::io::Error },
}

/// Failures inside the auth client before a server outcome exists.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// Timeout, DNS, refused connection, or a body that could not be read.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body was not a recognizable outcome envelope.
    #[error("response parse failed: {0}")]
    Decode(#[from] serde_json::Error),
}
