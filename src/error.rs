//! Error types for the collaborator seams and startup configuration.
//!
//! Fetch failures are normalised into [`crate::models::FetchStatus`] values by
//! the article fetcher; the enums here describe what the collaborators report
//! before that happens, and what aborts a run at startup.

use thiserror::Error;

/// Failure reported by an article extraction collaborator.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The page could not be downloaded (network error, timeout, non-2xx status).
    #[error("download error: {0}")]
    Download(String),

    /// The page was downloaded but no article text could be extracted.
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for ExtractError {
    fn from(err: reqwest::Error) -> Self {
        ExtractError::Download(err.to_string())
    }
}

/// Failure reported by a search collaborator.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("search API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("malformed search response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        SearchError::Network(err.to_string())
    }
}

/// Failure while writing a segment of result rows.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialise rows: {0}")]
    Serialise(#[from] serde_json::Error),

    #[error("label {label:?} does not map to its own output path")]
    InvalidTarget { label: String },
}

/// Fatal configuration problems detected at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("unknown component '{0}' (known components: {1})")]
    UnknownComponent(String, String),

    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}
