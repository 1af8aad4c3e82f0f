//! Error types for the offline cache controller.
//!
//! Network failures raised while routing a claimed request never reach the
//! page as errors; they are converted into fallback responses by the
//! controller. The types here surface only from lifecycle handlers, cache
//! maintenance and contract decoding.

use thiserror::Error;

use crate::controller::ControllerState;
use crate::http::Method;

/// Transport-level failure reported by a [`Network`](crate::Network).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    /// The host has no connectivity.
    #[error("network unavailable")]
    Offline,

    /// Any other transport failure (DNS, TLS, reset connection, timeout).
    #[error("transport error: {0}")]
    Transport(String),
}

/// Errors raised by cache buckets and cache storage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// Storing the entry would exceed the storage quota.
    #[error("cache quota exceeded: need {needed} bytes, {available} available")]
    QuotaExceeded { needed: usize, available: usize },

    /// Partial content (206) can never be cached.
    #[error("cannot cache partial responses (206)")]
    PartialResponse,

    /// Only GET requests can be stored.
    #[error("cannot cache {0} requests")]
    UnsupportedMethod(Method),

    /// A persisted snapshot could not be written or read back.
    #[error("cache snapshot error: {0}")]
    Snapshot(String),
}

impl From<bincode::Error> for CacheError {
    fn from(err: bincode::Error) -> Self {
        CacheError::Snapshot(err.to_string())
    }
}

/// Failure of a single install attempt. Nothing is stored when this is
/// returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstallError {
    /// A precache URL could not be fetched at all.
    #[error("failed to fetch precache entry {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: NetworkError,
    },

    /// A precache URL answered with a non-2xx status.
    #[error("precache entry {url} answered with status {status}")]
    BadStatus { url: String, status: u16 },

    /// A manifest path does not resolve against the controller origin.
    #[error("invalid precache URL: {0}")]
    InvalidUrl(String),

    /// Storing the fetched entries failed.
    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Errors returned by controller lifecycle operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControllerError {
    /// The operation is not valid in the current lifecycle state.
    #[error("invalid controller state: expected {expected}, got {actual}")]
    InvalidState {
        expected: &'static str,
        actual: ControllerState,
    },

    /// The install attempt failed.
    #[error("install failed: {0}")]
    Install(#[from] InstallError),

    /// A controller was already registered for this process.
    #[error("an offline cache controller is already registered")]
    AlreadyRegistered,
}

/// Errors raised while decoding backend responses.
#[derive(Debug, Error)]
pub enum ContractError {
    /// The response body was not the expected JSON document.
    #[error("invalid response body: {0}")]
    Json(#[from] serde_json::Error),

    /// The embedded PDF was not valid base64.
    #[error("invalid pdf payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The backend rejected the upload with a textual error body.
    #[error("upload rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },
}
