//! Request and response snapshots seen by the controller.
//!
//! These mirror the Fetch standard objects closely enough for routing:
//! a request carries its method, URL, headers and mode; a response carries
//! status, headers, body and the response type that decides whether it may
//! be cached.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use url::Url;

/// Body and status text of the synthetic offline response
pub const OFFLINE_BODY: &str = "Offline";

/// HTTP methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Options,
    Patch,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Options => "OPTIONS",
            Method::Patch => "PATCH",
        };
        f.write_str(name)
    }
}

impl FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "HEAD" => Ok(Method::Head),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            "OPTIONS" => Ok(Method::Options),
            "PATCH" => Ok(Method::Patch),
            other => Err(format!("unsupported method: {}", other)),
        }
    }
}

/// Request mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestMode {
    Navigate,
    SameOrigin,
    NoCors,
    Cors,
}

/// Response types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseType {
    Basic,
    Cors,
    Default,
    Error,
    Opaque,
    OpaqueRedirect,
}

/// A request intercepted by the controller
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// Absolute request URL
    pub url: Url,
    /// HTTP method
    pub method: Method,
    /// Request headers, names lowercased
    pub headers: BTreeMap<String, String>,
    /// Request mode
    pub mode: RequestMode,
}

impl Request {
    /// Create a new request
    pub fn new(url: Url, method: Method) -> Self {
        Self {
            url,
            method,
            headers: BTreeMap::new(),
            mode: RequestMode::Cors,
        }
    }

    /// Create a plain GET request
    pub fn get(url: Url) -> Self {
        Self::new(url, Method::Get)
    }

    /// Create a navigation request
    pub fn navigate(url: Url) -> Self {
        Self {
            mode: RequestMode::Navigate,
            ..Self::get(url)
        }
        .with_header("accept", "text/html")
    }

    /// Parse `url` and build a request for it
    pub fn parse(url: &str, method: Method) -> Result<Self, url::ParseError> {
        Ok(Self::new(Url::parse(url)?, method))
    }

    /// Set a header, replacing any previous value
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Set the request mode
    pub fn with_mode(mut self, mode: RequestMode) -> Self {
        self.mode = mode;
        self
    }

    /// Header lookup, case-insensitive
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// The `Accept` header, empty when absent
    pub fn accept(&self) -> &str {
        self.header("accept").unwrap_or("")
    }

    /// Whether this is a full-page navigation
    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate
    }

    /// Key under which this request is stored in a cache bucket
    pub fn cache_key(&self) -> CacheKey {
        CacheKey::new(self.method, &self.url)
    }
}

/// Cache entries are keyed by (method, absolute URL without fragment)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheKey {
    pub method: Method,
    pub url: String,
}

impl CacheKey {
    /// Key for `method` on `url`; the fragment never takes part in matching
    pub fn new(method: Method, url: &Url) -> Self {
        let mut url = url.clone();
        url.set_fragment(None);
        Self {
            method,
            url: url.into(),
        }
    }

    /// Key for a GET of `url`
    pub fn get(url: &Url) -> Self {
        Self::new(Method::Get, url)
    }
}

/// A full response snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Response status code
    pub status: u16,
    /// Status text
    pub status_text: String,
    /// Response headers, names lowercased
    pub headers: BTreeMap<String, String>,
    /// Response body
    pub body: Bytes,
    /// Response type
    pub response_type: ResponseType,
    /// Final response URL, if known
    pub url: Option<String>,
}

impl Response {
    /// Create a new response
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            status_text: status_text(status).to_string(),
            headers: BTreeMap::new(),
            body: body.into(),
            response_type: ResponseType::Default,
            url: None,
        }
    }

    /// The synthetic 503 answered when neither network nor cache can help
    pub fn offline() -> Self {
        Self {
            status_text: OFFLINE_BODY.to_string(),
            ..Self::new(503, OFFLINE_BODY)
        }
        .with_header("content-type", "text/plain; charset=utf-8")
    }

    /// A network error, as seen by the page when a claimed request fails
    pub fn network_error() -> Self {
        Self {
            status: 0,
            status_text: String::new(),
            headers: BTreeMap::new(),
            body: Bytes::new(),
            response_type: ResponseType::Error,
            url: None,
        }
    }

    /// Set a header, replacing any previous value
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Set the response type
    pub fn with_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = response_type;
        self
    }

    /// Check if the response is OK (status 200-299)
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Whether this is a network error
    pub fn is_network_error(&self) -> bool {
        self.response_type == ResponseType::Error
    }

    /// Approximate stored size, used for quota accounting
    pub fn byte_len(&self) -> usize {
        let headers: usize = self.headers.iter().map(|(k, v)| k.len() + v.len()).sum();
        self.body.len() + headers + self.status_text.len()
    }
}

/// Get status text for common status codes
fn status_text(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        206 => "Partial Content",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        413 => "Payload Too Large",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "",
    }
}
