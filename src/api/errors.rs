//! Error types for the chat backend client

use thiserror::Error;

/// Failures raised while talking to the chat backend.
///
/// The conversation controller treats every variant the same way: as an
/// opaque "request failed" that is logged and otherwise dropped.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

pub type ApiResult<T> = Result<T, ApiError>;
