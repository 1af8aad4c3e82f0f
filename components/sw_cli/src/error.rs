//! Error types for the CLI

use offline_cache::{CacheError, OriginError};
use thiserror::Error;

/// CLI-specific errors
#[derive(Debug, Error)]
pub enum CliError {
    /// The configured origin is not a valid tuple origin
    #[error("invalid origin: {0}")]
    Origin(#[from] OriginError),

    /// A request URL could not be parsed
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Unknown HTTP method
    #[error("{0}")]
    Method(String),

    /// Snapshot file could not be read
    #[error("file error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot contents are invalid
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    /// JSON output failed
    #[error("output error: {0}")]
    Json(#[from] serde_json::Error),

    /// Text output failed
    #[error("output error: {0}")]
    Format(#[from] std::fmt::Error),
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
