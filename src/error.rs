//! Error types for the feed
//!
//! Every error here is `Clone` so it can travel inside an iced `Message`.
//! Underlying library errors are flattened to their display strings.

use thiserror::Error;

/// Failure while fetching a page of items (or raw image bytes)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request never produced a response (DNS, connect, timeout, ...)
    #[error("request failed: {0}")]
    Request(String),

    /// The server answered with a non-success status
    #[error("server returned HTTP {0}")]
    Status(u16),

    /// The body was not the expected JSON shape
    #[error("malformed response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => FetchError::Status(status.as_u16()),
            None => FetchError::Request(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Decode(err.to_string())
    }
}

/// Failure while loading or saving the config file
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(String),

    #[error("config parse error: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

/// Failure while producing a thumbnail or saving a download
#[derive(Debug, Clone, Error)]
pub enum MediaError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("image decode failed: {0}")]
    Image(String),

    #[error("file I/O failed: {0}")]
    Io(String),

    #[error("background task failed: {0}")]
    Join(String),

    #[error("no {0} directory available")]
    NoDirectory(&'static str),
}

impl From<image::ImageError> for MediaError {
    fn from(err: image::ImageError) -> Self {
        MediaError::Image(err.to_string())
    }
}

impl From<std::io::Error> for MediaError {
    fn from(err: std::io::Error) -> Self {
        MediaError::Io(err.to_string())
    }
}

impl From<tokio::task::JoinError> for MediaError {
    fn from(err: tokio::task::JoinError) -> Self {
        MediaError::Join(err.to_string())
    }
}
