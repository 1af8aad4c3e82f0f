//! Origin comparison for request routing.
//!
//! An origin is the (scheme, host, port) tuple of a URL per the HTML
//! standard. Only same-origin responses are ever cached,
//! and only same-origin paths can be API routes.

use std::fmt;

use thiserror::Error;
use url::Url;

/// Represents an origin tuple (scheme, host, port)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Origin {
    /// URL scheme (e.g., "https", "http")
    pub scheme: String,
    /// Host (e.g., "gridprint.app", "localhost")
    pub host: String,
    /// Port number, with the scheme default already applied
    pub port: u16,
}

impl Origin {
    /// Create a new origin. A `None` port resolves to the scheme default.
    pub fn new(scheme: impl Into<String>, host: impl Into<String>, port: Option<u16>) -> Self {
        let scheme = scheme.into().to_lowercase();
        let port = port.unwrap_or_else(|| default_port(&scheme));
        Self {
            scheme,
            host: host.into().to_lowercase(),
            port,
        }
    }

    /// Parse an origin from a URL string
    pub fn parse(url: &str) -> Result<Self, OriginError> {
        let url = Url::parse(url.trim())?;
        Self::of(&url)
    }

    /// Origin of an already parsed URL
    pub fn of(url: &Url) -> Result<Self, OriginError> {
        match url.origin() {
            url::Origin::Tuple(scheme, host, port) => Ok(Self {
                scheme,
                host: host.to_string(),
                port,
            }),
            url::Origin::Opaque(_) => Err(OriginError::OpaqueOrigin),
        }
    }

    /// Two origins are same-origin when scheme, host and effective port
    /// are all identical.
    pub fn is_same_origin(&self, other: &Origin) -> bool {
        self.scheme == other.scheme && self.host == other.host && self.port == other.port
    }

    /// Check whether `url` belongs to this origin. Opaque URLs never do.
    pub fn contains(&self, url: &Url) -> bool {
        Origin::of(url)
            .map(|o| self.is_same_origin(&o))
            .unwrap_or(false)
    }

    /// Resolve a path such as `/index.html` against this origin.
    pub fn join(&self, path: &str) -> Result<Url, OriginError> {
        let base = Url::parse(&self.serialize())?;
        Ok(base.join(path)?)
    }

    /// Serialize origin to string, omitting the default port
    pub fn serialize(&self) -> String {
        if self.port == default_port(&self.scheme) {
            format!("{}://{}", self.scheme, self.host)
        } else {
            format!("{}://{}:{}", self.scheme, self.host, self.port)
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.serialize())
    }
}

/// Default ports for common schemes
fn default_port(scheme: &str) -> u16 {
    match scheme {
        "http" => 80,
        "https" => 443,
        "ws" => 80,
        "wss" => 443,
        _ => 0,
    }
}

/// Errors that can occur during origin operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OriginError {
    /// The URL is invalid
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    /// The origin is opaque (data:, blob: without tuple origin, ...)
    #[error("opaque origin")]
    OpaqueOrigin,
}

impl From<url::ParseError> for OriginError {
    fn from(err: url::ParseError) -> Self {
        OriginError::InvalidUrl(err.to_string())
    }
}
