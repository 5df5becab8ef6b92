//! Error types for proverbs-core

use std::path::PathBuf;
use thiserror::Error;

/// A required field could not be resolved to a valid value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// No tier produced a candidate for the field
    #[error("{field} could not be resolved from the batch entry, action inputs, or event context")]
    Unresolved { field: &'static str },

    /// A candidate was found but is not a positive base-10 integer
    #[error("{field} must be a positive integer, got {value}")]
    NotPositiveInteger { field: &'static str, value: String },
}

/// Invalid configuration detected before any pipeline starts.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Batch file exists but could not be read
    #[error("failed to read batch file {path}: {source}")]
    ReadBatch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Batch file is not a JSON array of partial configs
    #[error("invalid batch file {path}: {source}")]
    ParseBatch {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Render endpoint is not an absolute URL
    #[error("invalid render endpoint {endpoint}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    /// Required environment variable missing or malformed
    #[error("invalid environment variable {name}: {reason}")]
    Environment { name: &'static str, reason: String },
}

/// Opaque failure from the host issue-tracking API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostApiError {
    /// The API answered with a non-success status
    #[error("host API returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The request never produced a response
    #[error("host API request failed: {0}")]
    Transport(String),

    /// The response body did not have the expected shape
    #[error("failed to decode host API response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for HostApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            HostApiError::Decode(err.to_string())
        } else {
            HostApiError::Transport(err.to_string())
        }
    }
}

/// Top-level error surfaced by a batch run.
#[derive(Error, Debug)]
pub enum ActionError {
    #[error(transparent)]
    Value(#[from] ValueError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    HostApi(#[from] HostApiError),

    /// A pipeline task panicked or was cancelled
    #[error("pipeline task aborted: {0}")]
    Task(String),
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, ActionError>;

/// Result alias for host API calls
pub type HostResult<T> = std::result::Result<T, HostApiError>;
